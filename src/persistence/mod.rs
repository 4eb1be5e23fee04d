// src/persistence/mod.rs - Transcript records and the save workflow

pub mod adapter;
pub mod record;

pub use adapter::{PersistenceAdapter, SaveOutcome, MISSING_REQUIRED_FIELDS};
pub use record::{blob_file_name, sanitize_for_filename, TranscriptRecord};
