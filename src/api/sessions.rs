// src/api/sessions.rs - In-memory session table for the HTTP API
//
// A turn takes its session out of the table and holds it until the turn ends.
// The checkout puts it back on drop, so a request cancelled mid-turn (client
// gone, model call still pending) never strands the session.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::coach::Session;

/// One table entry. `session` is `None` while a turn has it checked out.
pub struct SessionSlot {
    session: Option<Session>,
    last_active: Instant,
}

impl SessionSlot {
    pub fn new(session: Session) -> Self {
        Self {
            session: Some(session),
            last_active: Instant::now(),
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_checked_out(&self) -> bool {
        self.session.is_none()
    }

    fn touch(&mut self) {
        self.last_active = Instant::now();
    }
}

pub type SessionTable = Arc<Mutex<HashMap<String, SessionSlot>>>;

#[derive(Debug, PartialEq, Eq)]
pub enum CheckoutError {
    NotFound,
    Busy,
    Poisoned,
}

/// Exclusive hold on one session for the duration of a turn.
pub struct SessionCheckout {
    table: SessionTable,
    id: String,
    session: Option<Session>,
}

impl SessionCheckout {
    pub fn take(table: &SessionTable, id: &str) -> Result<Self, CheckoutError> {
        let mut sessions = table.lock().map_err(|_| CheckoutError::Poisoned)?;
        let slot = sessions.get_mut(id).ok_or(CheckoutError::NotFound)?;
        let session = slot.session.take().ok_or(CheckoutError::Busy)?;
        slot.touch();
        Ok(Self {
            table: Arc::clone(table),
            id: id.to_string(),
            session: Some(session),
        })
    }

    pub fn session(&self) -> &Session {
        self.session.as_ref().expect("session present until drop")
    }

    pub fn session_mut(&mut self) -> &mut Session {
        self.session.as_mut().expect("session present until drop")
    }
}

impl Drop for SessionCheckout {
    fn drop(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        match self.table.lock() {
            // A delete during the turn wins; the session is dropped.
            Ok(mut sessions) => {
                if let Some(slot) = sessions.get_mut(&self.id) {
                    slot.session = Some(session);
                    slot.touch();
                }
            }
            Err(_) => tracing::warn!(session = %self.id, "Session table poisoned; session dropped"),
        }
    }
}

/// Remove sessions idle for longer than `max_idle` as of `now`. Checked-out
/// sessions are kept. Returns the number removed.
pub fn evict_idle(table: &SessionTable, now: Instant, max_idle: Duration) -> usize {
    let Ok(mut sessions) = table.lock() else {
        return 0;
    };
    let before = sessions.len();
    sessions.retain(|id, slot| {
        let idle = now.saturating_duration_since(slot.last_active);
        let keep = slot.is_checked_out() || idle <= max_idle;
        if !keep {
            tracing::info!(session = %id, idle_secs = idle.as_secs(), "Session evicted after idle timeout");
        }
        keep
    });
    before - sessions.len()
}

/// Sweep the table once a minute until the task is aborted.
pub async fn run_idle_sweeper(table: SessionTable, max_idle: Duration) {
    let mut ticker = tokio::time::interval(Duration::from_secs(60));
    loop {
        ticker.tick().await;
        evict_idle(&table, Instant::now(), max_idle);
    }
}
