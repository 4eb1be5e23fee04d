// src/infra/errors.rs - Error types for the Beer Game coach

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoachError {
    // Provider errors
    #[error("Model '{model}' rejected the request: {message}")]
    Rejected { model: String, message: String },

    #[error("Provider '{provider}' error: {message}")]
    Provider { provider: String, message: String },

    #[error("Assistant request failed: {0}")]
    AssistantFailed(String),

    // Session rule violations (state is left untouched)
    #[error("Role is locked to '{role}' after the first message")]
    RoleLocked { role: String },

    #[error("Role '{0}' is not one of Retailer, Wholesaler, Distributor, Factory")]
    UnknownRole(String),

    #[error("Section '{0}' is not offered")]
    UnknownSection(String),

    #[error("This coaching mode does not use a section")]
    SectionNotApplicable,

    #[error("Enter a Canvas Group Number before selecting a role")]
    ParticipantRequired,

    // Infra
    #[error("Storage '{store}' error: {message}")]
    Storage { store: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoachError {
    /// True for the request-rejection class that warrants a fallback model.
    pub fn is_rejection(&self) -> bool {
        matches!(self, CoachError::Rejected { .. })
    }

    pub fn storage(store: &str, message: impl Into<String>) -> Self {
        CoachError::Storage {
            store: store.to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_classification() {
        let rejected = CoachError::Rejected {
            model: "gpt-5-mini".into(),
            message: "HTTP 400".into(),
        };
        assert!(rejected.is_rejection());

        let other = CoachError::Provider {
            provider: "openai".into(),
            message: "HTTP 500".into(),
        };
        assert!(!other.is_rejection());
        assert!(!CoachError::AssistantFailed("boom".into()).is_rejection());
    }

    #[test]
    fn test_display_messages() {
        let e = CoachError::RoleLocked {
            role: "Retailer".into(),
        };
        assert_eq!(
            e.to_string(),
            "Role is locked to 'Retailer' after the first message"
        );

        let e = CoachError::storage("gcs", "bucket missing");
        assert_eq!(e.to_string(), "Storage 'gcs' error: bucket missing");
    }
}
