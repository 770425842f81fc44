//! OpenAI adapter: Implementation of InferenceProvider.
//!
//! Calls the Responses endpoint with a strict `json_schema` text format and
//! returns the first `output_text` part of the reply.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use zeroize::Zeroizing;

use crate::config::AppConfig;
use crate::ports::{InferenceProvider, ProviderError, ProviderRequest};

/// Error bodies are echoed into failure details; keep them short.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// HTTP client for the provider.
pub struct OpenAiProvider {
    client: Client,
    base_url: String,
    model: String,
    api_key: Zeroizing<String>,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl OpenAiProvider {
    /// Create a provider client.
    ///
    /// # Errors
    /// Returns `ProviderError::Transport` if the HTTP client cannot be built.
    pub fn new(
        api_key: Zeroizing<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
        })
    }

    /// Build a provider from configuration, or `None` when no credential is set.
    ///
    /// # Errors
    /// Returns `ProviderError::Transport` if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Option<Self>, ProviderError> {
        config
            .openai_api_key
            .as_ref()
            .map(|key| {
                Self::new(
                    key.clone(),
                    config.openai_model.clone(),
                    config.openai_base_url.clone(),
                    config.provider_timeout,
                )
            })
            .transpose()
    }

    fn endpoint(&self) -> String {
        format!("{}/responses", self.base_url)
    }

    fn request_body(&self, request: &ProviderRequest) -> Value {
        json!({
            "model": self.model,
            "instructions": request.instructions,
            "input": request.input,
            "text": {
                "format": {
                    "type": "json_schema",
                    "name": request.schema_name,
                    "strict": true,
                    "schema": request.schema,
                }
            }
        })
    }
}

#[async_trait]
impl InferenceProvider for OpenAiProvider {
    async fn complete(&self, request: &ProviderRequest) -> Result<String, ProviderError> {
        tracing::debug!(model = %self.model, "Sending request to inference provider");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.api_key.as_str())
            .json(&self.request_body(request))
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Transport(e.without_url().to_string()))?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Inference provider returned an error");
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        extract_output_text(&body)
    }
}

#[derive(Debug, Deserialize)]
struct ResponsesReply {
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
    refusal: Option<String>,
}

/// Pull the structured output text out of a Responses API reply body.
fn extract_output_text(body: &str) -> Result<String, ProviderError> {
    let reply: ResponsesReply =
        serde_json::from_str(body).map_err(|e| ProviderError::InvalidJson(e.to_string()))?;

    let parts = reply
        .output
        .iter()
        .filter(|item| item.kind == "message")
        .flat_map(|item| item.content.iter());

    for part in parts {
        match part.kind.as_str() {
            "output_text" => {
                if let Some(text) = part.text.as_ref().filter(|t| !t.trim().is_empty()) {
                    return Ok(text.clone());
                }
            }
            "refusal" => {
                return Err(ProviderError::Refusal(
                    part.refusal.clone().unwrap_or_default(),
                ));
            }
            _ => {}
        }
    }

    Err(ProviderError::EmptyReply)
}
