// src/persistence/record.rs - Tabular transcript record and blob naming
//
// A record is a single two-column table (`role`, `content`). Chat messages
// come first in transcript order, followed by metadata rows whose `role`
// column holds a label (`Mode`, `Section`, ...) instead of a chat role.
// Downstream grading scripts read this exact shape.

use chrono::{DateTime, Local, TimeDelta};
use serde::Serialize;

use crate::coach::prompts::CoachingMode;
use crate::infra::errors::CoachError;
use crate::provider::Message;

pub const LABEL_MODE: &str = "Mode";
pub const LABEL_SECTION: &str = "Section";
pub const LABEL_ROLE: &str = "Participant Role";
pub const LABEL_START: &str = "Start Time";
pub const LABEL_END: &str = "End Time";
pub const LABEL_DURATION: &str = "Duration";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordRow {
    pub role: String,
    pub content: String,
}

impl RecordRow {
    fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

impl From<&Message> for RecordRow {
    fn from(m: &Message) -> Self {
        RecordRow::new(m.role.as_str(), m.content.clone())
    }
}

#[derive(Debug, Clone)]
pub struct TranscriptRecord {
    rows: Vec<RecordRow>,
    message_count: usize,
}

/// Identifiers and timing written after the messages.
#[derive(Debug, Clone)]
pub struct RecordMeta<'a> {
    pub mode: CoachingMode,
    pub section: &'a str,
    pub role: &'a str,
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
}

impl TranscriptRecord {
    pub fn build(messages: &[Message], meta: &RecordMeta<'_>) -> Self {
        let mut rows: Vec<RecordRow> = messages.iter().map(RecordRow::from).collect();

        rows.push(RecordRow::new(LABEL_MODE, meta.mode.key()));
        if meta.mode.requires_section() {
            rows.push(RecordRow::new(LABEL_SECTION, meta.section));
        }
        rows.push(RecordRow::new(LABEL_ROLE, meta.role));
        rows.push(RecordRow::new(LABEL_START, format_timestamp(meta.start)));
        rows.push(RecordRow::new(LABEL_END, format_timestamp(meta.end)));
        rows.push(RecordRow::new(
            LABEL_DURATION,
            format_duration(meta.end - meta.start),
        ));

        Self {
            rows,
            message_count: messages.len(),
        }
    }

    pub fn rows(&self) -> &[RecordRow] {
        &self.rows
    }

    pub fn message_rows(&self) -> &[RecordRow] {
        &self.rows[..self.message_count]
    }

    pub fn metadata_rows(&self) -> &[RecordRow] {
        &self.rows[self.message_count..]
    }

    /// CSV with a `role,content` header row.
    pub fn to_csv(&self) -> Result<Vec<u8>, CoachError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer
            .into_inner()
            .map_err(|e| CoachError::Io(e.into_error()))
    }
}

/// `2026-10-16 14:03:07.123456`; whole seconds drop the fraction.
pub fn format_timestamp(ts: DateTime<Local>) -> String {
    if ts.timestamp_subsec_micros() == 0 {
        ts.format("%Y-%m-%d %H:%M:%S").to_string()
    } else {
        ts.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
    }
}

/// `0 days 00:12:03.250000`; whole seconds drop the fraction. Negative spans clamp to zero.
pub fn format_duration(span: TimeDelta) -> String {
    let micros = span.num_microseconds().unwrap_or(i64::MAX).max(0);
    let total_secs = micros / 1_000_000;
    let frac = micros % 1_000_000;
    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let seconds = total_secs % 60;
    if frac == 0 {
        format!("{days} days {hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{days} days {hours:02}:{minutes:02}:{seconds:02}.{frac:06}")
    }
}

/// Keep alphanumerics, `-` and `_`; everything else becomes `_`.
pub fn sanitize_for_filename(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|ch| {
            if ch.is_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect()
}

/// `beergame_<mode>[_<section>]_P<participant>_<role>.csv`
pub fn blob_file_name(mode: CoachingMode, section: &str, participant: &str, role: &str) -> String {
    let safe_pid = sanitize_for_filename(participant);
    let safe_role = sanitize_for_filename(role);
    if mode.requires_section() {
        format!(
            "beergame_{}_{}_P{}_{}.csv",
            mode.slug(),
            sanitize_for_filename(section),
            safe_pid,
            safe_role
        )
    } else {
        format!("beergame_{}_P{}_{}.csv", mode.slug(), safe_pid, safe_role)
    }
}
