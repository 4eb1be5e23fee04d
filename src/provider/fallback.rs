// src/provider/fallback.rs - Primary model with a one-shot fallback on rejection

use std::sync::Arc;

use super::{build_input, ChatRequest, Message, ModelProvider};
use crate::infra::errors::CoachError;

/// A generated reply plus the warning to surface when the fallback model answered.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated {
    pub text: String,
    pub model: String,
    pub fallback_warning: Option<String>,
}

/// Stateless wrapper around one provider and two model identifiers.
///
/// The primary model is tried first. Only a request rejection (HTTP 400) moves
/// on to the fallback model, exactly once, with identical input. Any other
/// failure ends the call.
pub struct ResponseGenerator {
    provider: Arc<dyn ModelProvider>,
    primary: String,
    fallback: String,
}

impl ResponseGenerator {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        primary: impl Into<String>,
        fallback: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            primary: primary.into(),
            fallback: fallback.into(),
        }
    }

    pub fn primary(&self) -> &str {
        &self.primary
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    pub async fn generate(
        &self,
        transcript: &[Message],
        system_prompt: &str,
    ) -> Result<Generated, CoachError> {
        let input = build_input(transcript, system_prompt);
        let request = ChatRequest {
            model: self.primary.clone(),
            input,
        };

        match self.provider.chat(request.clone()).await {
            Ok(response) => {
                tracing::debug!(model = %self.primary, tokens = response.usage.total(), "Reply generated");
                Ok(Generated {
                    text: response.content,
                    model: self.primary.clone(),
                    fallback_warning: None,
                })
            }
            Err(e) if e.is_rejection() => {
                tracing::warn!(
                    provider = %self.provider.id(),
                    primary = %self.primary,
                    fallback = %self.fallback,
                    "Primary model rejected the request, retrying with fallback: {}",
                    e
                );
                let warning = format!(
                    "Model '{}' failed for this request. Retrying with '{}'.",
                    self.primary, self.fallback
                );
                let retry = ChatRequest {
                    model: self.fallback.clone(),
                    input: request.input,
                };
                let response = self
                    .provider
                    .chat(retry)
                    .await
                    .map_err(|e| CoachError::AssistantFailed(e.to_string()))?;
                Ok(Generated {
                    text: response.content,
                    model: self.fallback.clone(),
                    fallback_warning: Some(warning),
                })
            }
            Err(e) => Err(CoachError::AssistantFailed(e.to_string())),
        }
    }
}
