// src/api/types.rs

use serde::{Deserialize, Serialize};

use crate::coach::prompts::CoachingMode;
use crate::coach::{Notice, Session, Turn};
use crate::provider::Message;

/// Request body for creating a session. Omitted fields use the server config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub mode: Option<CoachingMode>,
    #[serde(default)]
    pub autosave: Option<bool>,
}

/// Snapshot of a session as the client renders it.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub id: String,
    pub mode: CoachingMode,
    pub start_time: String,
    pub messages: Vec<Message>,
    pub sections: Vec<String>,
    pub section: String,
    pub participant_id: String,
    pub role: String,
    pub role_locked: bool,
    pub autosave: bool,
    pub chat_enabled: bool,
}

impl From<&Session> for SessionView {
    fn from(s: &Session) -> Self {
        Self {
            id: s.id().to_string(),
            mode: s.mode(),
            start_time: s.start_time().to_rfc3339(),
            messages: s.messages().to_vec(),
            sections: s.sections().to_vec(),
            section: s.section().to_string(),
            participant_id: s.participant_id().to_string(),
            role: s.role().to_string(),
            role_locked: s.role_locked(),
            autosave: s.autosave_enabled(),
            chat_enabled: s.chat_enabled(),
        }
    }
}

/// Response for an event: what happened plus the updated session.
#[derive(Debug, Serialize)]
pub struct TurnResponse {
    pub reply: Option<String>,
    pub saved_file: Option<String>,
    pub save_error: Option<String>,
    pub notices: Vec<Notice>,
    pub session: SessionView,
}

impl TurnResponse {
    pub fn new(turn: Turn, session: &Session) -> Self {
        let saved_file = turn
            .saved
            .as_ref()
            .and_then(|o| o.file_name())
            .map(str::to_string);
        let save_error = turn
            .saved
            .as_ref()
            .and_then(|o| o.error())
            .map(str::to_string);
        Self {
            reply: turn.reply,
            saved_file,
            save_error,
            notices: turn.notices,
            session: SessionView::from(session),
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
