// src/coach/service.rs - Runs event transitions and performs their effects

use std::collections::VecDeque;

use super::events::{self, Effect, Notice, SessionEvent};
use super::session::Session;
use crate::persistence::{PersistenceAdapter, SaveOutcome};
use crate::provider::fallback::ResponseGenerator;

/// What one user action produced.
#[derive(Debug, Clone, Default)]
pub struct Turn {
    pub reply: Option<String>,
    pub saved: Option<SaveOutcome>,
    pub notices: Vec<Notice>,
}

/// Shared by every session: the model and the blob store are read-only here.
pub struct CoachService {
    generator: ResponseGenerator,
    persistence: PersistenceAdapter,
}

impl CoachService {
    pub fn new(generator: ResponseGenerator, persistence: PersistenceAdapter) -> Self {
        Self {
            generator,
            persistence,
        }
    }

    pub fn generator(&self) -> &ResponseGenerator {
        &self.generator
    }

    pub fn store_name(&self) -> &str {
        self.persistence.store_name()
    }

    /// Handle one event to completion, including any reply and save it causes.
    pub async fn dispatch(&self, session: &mut Session, event: SessionEvent) -> Turn {
        let mut turn = Turn::default();
        let first = events::handle(session, event);
        turn.notices.extend(first.notices);
        let mut pending: VecDeque<Effect> = first.effects.into();

        while let Some(effect) = pending.pop_front() {
            match effect {
                Effect::GenerateReply {
                    transcript,
                    system_prompt,
                } => match self.generator.generate(&transcript, &system_prompt).await {
                    Ok(generated) => {
                        turn.reply = Some(generated.text.clone());
                        let next = events::on_reply(session, generated);
                        turn.notices.extend(next.notices);
                        pending.extend(next.effects);
                    }
                    Err(e) => {
                        tracing::warn!(session = %session.id(), "Reply failed: {}", e);
                        turn.notices.extend(events::on_reply_failed(&e).notices);
                    }
                },
                Effect::Save(trigger) => {
                    let outcome = self.persistence.save(session).await;
                    turn.notices
                        .push(events::on_saved(trigger, &outcome, self.store_name()));
                    turn.saved = Some(outcome);
                }
            }
        }
        turn
    }
}
