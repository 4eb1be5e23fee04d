// src/coach/session.rs - Per-student session and transcript store
//
// One `Session` exists per connected client. It owns the message log and the
// sidebar selections, and enforces the role rules: a role change before the
// first user message replaces the log with a fresh welcome, after it the role
// is pinned (quantitative mode).

use chrono::{DateTime, Local};
use serde::Serialize;
use uuid::Uuid;

use super::prompts::{self, CoachingMode, GREETING};
use crate::infra::errors::CoachError;
use crate::provider::{Message, Role};

/// Result of a role selection that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleChange {
    /// Same role as before (or blank input); nothing happened.
    Unchanged,
    /// Transcript replaced with a welcome message for the new role.
    Reset,
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    id: String,
    mode: CoachingMode,
    start_time: DateTime<Local>,
    messages: Vec<Message>,
    sections: Vec<String>,
    section: String,
    participant_id: String,
    role: String,
    role_locked: bool,
    welcome_role: String,
    autosave: bool,
}

impl Session {
    pub fn new(mode: CoachingMode, sections: &[String]) -> Self {
        let section = if mode.requires_section() {
            sections.first().cloned().unwrap_or_default()
        } else {
            String::new()
        };
        Self {
            id: Uuid::new_v4().to_string(),
            mode,
            start_time: Local::now(),
            messages: vec![Message::assistant(GREETING)],
            sections: sections.to_vec(),
            section,
            participant_id: String::new(),
            role: String::new(),
            role_locked: false,
            welcome_role: String::new(),
            autosave: false,
        }
    }

    pub fn with_autosave(mut self, autosave: bool) -> Self {
        self.autosave = autosave;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn mode(&self) -> CoachingMode {
        self.mode
    }

    pub fn start_time(&self) -> DateTime<Local> {
        self.start_time
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn sections(&self) -> &[String] {
        &self.sections
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn participant_id(&self) -> &str {
        &self.participant_id
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn role_locked(&self) -> bool {
        self.role_locked
    }

    pub fn welcome_role(&self) -> &str {
        &self.welcome_role
    }

    /// Whether an assistant reply triggers a save on its own.
    pub fn autosave_enabled(&self) -> bool {
        self.mode.always_autosaves() || self.autosave
    }

    pub fn select_section(&mut self, section: &str) -> Result<(), CoachError> {
        if !self.mode.requires_section() {
            return Err(CoachError::SectionNotApplicable);
        }
        let section = section.trim();
        match self.sections.iter().find(|s| s.as_str() == section) {
            Some(known) => {
                self.section = known.clone();
                Ok(())
            }
            None => Err(CoachError::UnknownSection(section.to_string())),
        }
    }

    pub fn set_participant(&mut self, participant_id: &str) {
        self.participant_id = participant_id.trim().to_string();
    }

    pub fn set_autosave(&mut self, autosave: bool) {
        self.autosave = autosave;
    }

    /// Apply a role picked in the sidebar.
    pub fn select_role(&mut self, role: &str) -> Result<RoleChange, CoachError> {
        let requested = role.trim();
        if requested.is_empty() {
            return Ok(RoleChange::Unchanged);
        }

        let requested = if self.mode.locks_role() {
            prompts::canonical_role(requested)
                .ok_or_else(|| CoachError::UnknownRole(requested.to_string()))?
        } else {
            requested
        };

        if requested == self.role {
            return Ok(RoleChange::Unchanged);
        }
        if self.role_locked {
            return Err(CoachError::RoleLocked {
                role: self.role.clone(),
            });
        }
        if self.mode.locks_role() && self.participant_id.is_empty() {
            return Err(CoachError::ParticipantRequired);
        }

        self.reset(requested);
        Ok(RoleChange::Reset)
    }

    /// Replace the transcript with a single welcome message for `role`.
    pub fn reset(&mut self, role: &str) {
        let role = role.trim();
        self.messages = vec![Message::assistant(prompts::build_welcome_message(role))];
        self.role = role.to_string();
        self.welcome_role = role.to_string();
        self.start_time = Local::now();
        tracing::debug!(session = %self.id, role, "Transcript reset with welcome message");
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Pin the current role. Only quantitative sessions lock.
    pub fn lock(&mut self) {
        if self.mode.locks_role() {
            self.role_locked = true;
        }
    }

    /// Labels of the identifiers still needed before chatting or saving.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.mode.requires_section() && self.section.trim().is_empty() {
            missing.push("section");
        }
        if self.participant_id.trim().is_empty() {
            missing.push("participant_id");
        }
        if self.role.trim().is_empty() {
            missing.push("role");
        }
        missing
    }

    pub fn chat_enabled(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Number of user turns in the current transcript.
    pub fn exchange_count(&self) -> usize {
        self.messages.iter().filter(|m| m.role == Role::User).count()
    }
}
