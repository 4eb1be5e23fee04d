// src/coach/events.rs - User actions as events, handled without side effects
//
// Each handler mutates the session and returns the effects the caller must
// perform (model call, storage write) plus notices to show the student.
// Results of effects come back through `on_reply`, `on_reply_failed` and
// `on_saved`.

use serde::{Deserialize, Serialize};

use super::prompts;
use super::session::Session;
use crate::infra::errors::CoachError;
use crate::persistence::SaveOutcome;
use crate::provider::fallback::Generated;
use crate::provider::Message;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    SelectSection { section: String },
    EnterParticipant { participant_id: String },
    SelectRole { role: String },
    SetAutosave { enabled: bool },
    SubmitMessage { text: String },
    EndConversation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveTrigger {
    Autosave,
    Manual,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    GenerateReply {
        transcript: Vec<Message>,
        system_prompt: String,
    },
    Save(SaveTrigger),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            text: text.into(),
        }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transition {
    pub effects: Vec<Effect>,
    pub notices: Vec<Notice>,
}

impl Transition {
    fn effect(effect: Effect) -> Self {
        Self {
            effects: vec![effect],
            notices: Vec::new(),
        }
    }

    fn notice(notice: Notice) -> Self {
        Self {
            effects: Vec::new(),
            notices: vec![notice],
        }
    }

    fn rejected(err: CoachError) -> Self {
        Self::notice(Notice::warning(err.to_string()))
    }
}

pub fn handle(session: &mut Session, event: SessionEvent) -> Transition {
    match event {
        SessionEvent::SelectSection { section } => match session.select_section(&section) {
            Ok(()) => Transition::default(),
            Err(e) => Transition::rejected(e),
        },
        SessionEvent::EnterParticipant { participant_id } => {
            session.set_participant(&participant_id);
            Transition::default()
        }
        SessionEvent::SelectRole { role } => match session.select_role(&role) {
            Ok(_) => Transition::default(),
            Err(e) => Transition::rejected(e),
        },
        SessionEvent::SetAutosave { enabled } => {
            session.set_autosave(enabled);
            Transition::default()
        }
        SessionEvent::SubmitMessage { text } => submit_message(session, text),
        SessionEvent::EndConversation => Transition::effect(Effect::Save(SaveTrigger::Manual)),
    }
}

fn submit_message(session: &mut Session, text: String) -> Transition {
    if !session.chat_enabled() {
        return Transition::notice(Notice::info(start_chatting_hint(session)));
    }
    if text.trim().is_empty() {
        return Transition::default();
    }

    session.append(Message::user(text));
    // The role is pinned as soon as the student starts chatting.
    session.lock();

    let system_prompt = prompts::build_system_prompt(session.mode().prompt(), session.role());
    Transition::effect(Effect::GenerateReply {
        transcript: session.messages().to_vec(),
        system_prompt,
    })
}

/// Record a generated reply and decide whether it triggers an autosave.
pub fn on_reply(session: &mut Session, reply: Generated) -> Transition {
    let mut transition = Transition::default();
    if let Some(warning) = reply.fallback_warning {
        transition.notices.push(Notice::warning(warning));
    }
    session.append(Message::assistant(reply.text));
    if session.autosave_enabled() {
        transition.effects.push(Effect::Save(SaveTrigger::Autosave));
    }
    transition
}

/// The turn ends without an assistant message; the user's message stays.
pub fn on_reply_failed(err: &CoachError) -> Transition {
    Transition::notice(Notice::error(err.to_string()))
}

pub fn on_saved(trigger: SaveTrigger, outcome: &SaveOutcome, store_name: &str) -> Notice {
    match (trigger, outcome) {
        (SaveTrigger::Manual, SaveOutcome::Saved { file_name }) => {
            Notice::success(format!("Saved to {store_name} as {file_name}"))
        }
        (SaveTrigger::Autosave, SaveOutcome::Saved { file_name }) => {
            Notice::info(format!("Autosaved: {file_name}"))
        }
        (SaveTrigger::Manual, SaveOutcome::MissingRequiredFields) => {
            Notice::error(missing_fields_text("first."))
        }
        (SaveTrigger::Autosave, SaveOutcome::MissingRequiredFields) => {
            Notice::warning(missing_fields_text("to enable uploads."))
        }
        (SaveTrigger::Manual, SaveOutcome::Failed(msg)) => Notice::error(format!("Save failed: {msg}")),
        (SaveTrigger::Autosave, SaveOutcome::Failed(msg)) => {
            Notice::error(format!("Autosave failed: {msg}"))
        }
    }
}

fn missing_fields_text(tail: &str) -> String {
    format!("Select Section, enter Canvas Group Number, and select a Role {tail}")
}

fn start_chatting_hint(session: &Session) -> &'static str {
    if session.mode().requires_section() {
        "Select a Section, enter Canvas Group Number, and select a Role in the sidebar to start chatting."
    } else {
        "Enter Canvas Group Number and a Role in the sidebar to start chatting."
    }
}
