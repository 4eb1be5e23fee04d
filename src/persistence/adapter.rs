// src/persistence/adapter.rs - Save a session transcript to the blob store
//
// The CSV is staged in a scratch directory of its own for every save, uploaded,
// and the directory is removed whether or not the upload succeeded. Failures are
// returned as outcomes; a broken store never ends the session.

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use super::record::{self, RecordMeta, TranscriptRecord};
use crate::coach::session::Session;
use crate::infra::errors::CoachError;
use crate::storage::BlobStore;

/// Error code reported when identifiers are missing.
pub const MISSING_REQUIRED_FIELDS: &str = "missing_required_fields";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved { file_name: String },
    /// Participant id, role, or section was empty. No I/O was attempted.
    MissingRequiredFields,
    Failed(String),
}

impl SaveOutcome {
    pub fn file_name(&self) -> Option<&str> {
        match self {
            SaveOutcome::Saved { file_name } => Some(file_name),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SaveOutcome::Saved { .. } => None,
            SaveOutcome::MissingRequiredFields => Some(MISSING_REQUIRED_FIELDS),
            SaveOutcome::Failed(message) => Some(message),
        }
    }
}

/// Removes the staged directory when dropped.
struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    fn create(path: PathBuf) -> Result<Self, CoachError> {
        std::fs::create_dir_all(&path)?;
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            tracing::debug!(path = %self.path.display(), "Scratch cleanup skipped: {}", e);
        }
    }
}

pub struct PersistenceAdapter {
    store: Arc<dyn BlobStore>,
    scratch_root: PathBuf,
}

impl PersistenceAdapter {
    pub fn new(store: Arc<dyn BlobStore>, scratch_root: PathBuf) -> Self {
        Self {
            store,
            scratch_root,
        }
    }

    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    pub async fn save(&self, session: &Session) -> SaveOutcome {
        self.save_at(session, Local::now()).await
    }

    pub async fn save_at(&self, session: &Session, end: DateTime<Local>) -> SaveOutcome {
        let pid = session.participant_id().trim();
        let role = session.role().trim();
        let section = session.section().trim();
        if pid.is_empty() || role.is_empty() || (session.mode().requires_section() && section.is_empty()) {
            return SaveOutcome::MissingRequiredFields;
        }

        match self.write_and_upload(session, pid, role, section, end).await {
            Ok(file_name) => {
                tracing::info!(session = %session.id(), file = %file_name, "Transcript saved");
                SaveOutcome::Saved { file_name }
            }
            Err(e) => {
                tracing::warn!(session = %session.id(), "Transcript save failed: {}", e);
                SaveOutcome::Failed(e.to_string())
            }
        }
    }

    async fn write_and_upload(
        &self,
        session: &Session,
        pid: &str,
        role: &str,
        section: &str,
        end: DateTime<Local>,
    ) -> Result<String, CoachError> {
        let meta = RecordMeta {
            mode: session.mode(),
            section,
            role,
            start: session.start_time(),
            end,
        };
        let csv = TranscriptRecord::build(session.messages(), &meta).to_csv()?;

        let file_name = record::blob_file_name(session.mode(), section, pid, role);
        // Same group, different roles: concurrent saves must not share a directory.
        let scratch = ScratchDir::create(self.scratch_root.join(format!(
            "conv_history_P{}_{}",
            record::sanitize_for_filename(pid),
            Uuid::new_v4().simple()
        )))?;
        let local_path = scratch.path().join(&file_name);
        tokio::fs::write(&local_path, &csv).await?;

        self.store.upload_file(&file_name, &local_path).await?;
        Ok(file_name)
    }
}
