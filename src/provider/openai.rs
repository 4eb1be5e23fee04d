// src/provider/openai.rs - OpenAI Responses API provider

use async_trait::async_trait;

use super::{ChatRequest, ChatResponse, ModelProvider, TokenUsage};
use crate::infra::errors::CoachError;

pub struct OpenAIProvider {
    api_key: String,
    client: reqwest::Client,
    base_url: String,
}

impl OpenAIProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, "https://api.openai.com/v1".into())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Read `OPENAI_API_KEY` from the environment.
    pub fn from_env(base_url: &str) -> Result<Self, CoachError> {
        let key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| CoachError::Config("OPENAI_API_KEY is not set".into()))?;
        Ok(Self::with_base_url(key, base_url.to_string()))
    }
}

/// Request body for `POST /responses`.
pub(crate) fn request_body(request: &ChatRequest) -> serde_json::Value {
    let input: Vec<serde_json::Value> = request
        .input
        .iter()
        .map(|m| {
            serde_json::json!({
                "role": m.role.as_str(),
                "content": m.content,
            })
        })
        .collect();

    serde_json::json!({
        "model": request.model,
        "input": input,
    })
}

/// Reply text: the aggregated `output_text` when the server supplies it,
/// otherwise every `output_text` part of every output item, in order.
pub(crate) fn extract_output_text(resp: &serde_json::Value) -> String {
    if let Some(text) = resp["output_text"].as_str() {
        return text.to_string();
    }

    let mut text = String::new();
    for item in resp["output"].as_array().into_iter().flatten() {
        for part in item["content"].as_array().into_iter().flatten() {
            if part["type"].as_str() == Some("output_text") {
                text.push_str(part["text"].as_str().unwrap_or(""));
            }
        }
    }
    text
}

#[async_trait]
impl ModelProvider for OpenAIProvider {
    fn id(&self) -> &str {
        "openai"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, CoachError> {
        let body = request_body(&request);
        tracing::debug!(model = %request.model, turns = request.input.len(), "Sending responses request");

        let response = self
            .client
            .post(format!("{}/responses", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CoachError::Provider {
                provider: "openai".into(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::BAD_REQUEST {
            let error_body = response.text().await.unwrap_or_default();
            return Err(CoachError::Rejected {
                model: request.model,
                message: format!("HTTP {}: {}", status, error_body),
            });
        }

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(CoachError::Provider {
                provider: "openai".into(),
                message: format!("HTTP {}: {}", status, error_body),
            });
        }

        let resp: serde_json::Value = response.json().await.map_err(|e| CoachError::Provider {
            provider: "openai".into(),
            message: format!("Failed to parse response: {}", e),
        })?;

        let usage = TokenUsage {
            input_tokens: resp["usage"]["input_tokens"].as_u64().unwrap_or(0) as u32,
            output_tokens: resp["usage"]["output_tokens"].as_u64().unwrap_or(0) as u32,
        };

        Ok(ChatResponse {
            content: extract_output_text(&resp),
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Message;

    #[test]
    fn test_request_body_shape() {
        let request = ChatRequest {
            model: "gpt-5-mini".into(),
            input: vec![Message::system("PROMPT"), Message::user("demand was 4")],
        };
        let body = request_body(&request);
        assert_eq!(body["model"], "gpt-5-mini");
        assert_eq!(body["input"][0]["role"], "system");
        assert_eq!(body["input"][0]["content"], "PROMPT");
        assert_eq!(body["input"][1]["role"], "user");
        assert_eq!(body["input"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_extract_top_level_output_text() {
        let resp = serde_json::json!({ "output_text": "Order 8 cases." });
        assert_eq!(extract_output_text(&resp), "Order 8 cases.");
    }

    #[test]
    fn test_extract_from_output_items() {
        let resp = serde_json::json!({
            "output": [
                { "type": "reasoning", "summary": [] },
                {
                    "type": "message",
                    "role": "assistant",
                    "content": [
                        { "type": "output_text", "text": "Order " },
                        { "type": "refusal", "refusal": "n/a" },
                        { "type": "output_text", "text": "8 cases." }
                    ]
                }
            ]
        });
        assert_eq!(extract_output_text(&resp), "Order 8 cases.");
    }

    #[test]
    fn test_extract_empty_response() {
        assert_eq!(extract_output_text(&serde_json::json!({})), "");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let p = OpenAIProvider::with_base_url("k".into(), "http://localhost:1/v1/".into());
        assert_eq!(p.base_url, "http://localhost:1/v1");
        assert_eq!(p.id(), "openai");
    }
}
