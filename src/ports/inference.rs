//! Inference provider port: Trait for the external structured-output model.
//!
//! This trait abstracts the provider's HTTP API from the application logic.
//! Implementations return the raw reply text; parsing and schema validation
//! happen in the application layer.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

/// Errors that can occur while obtaining a provider-assisted result.
///
/// Every variant surfaces to the caller as a prediction failure. None are
/// retried.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("no inference provider credential configured")]
    MissingCredential,

    #[error("provider request failed: {0}")]
    Transport(String),

    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("provider call timed out after {0:?}")]
    Timeout(Duration),

    #[error("provider refused the request: {0}")]
    Refusal(String),

    #[error("provider reply contained no output text")]
    EmptyReply,

    #[error("provider reply is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("provider reply violates the output schema: {}", .0.join("; "))]
    SchemaViolation(Vec<String>),

    #[error("could not encode provider request: {0}")]
    Encoding(String),
}

/// A structured-output request for the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderRequest {
    /// System instruction
    pub instructions: String,

    /// Task input (the serialized user payload)
    pub input: String,

    /// Name the schema is registered under
    pub schema_name: &'static str,

    /// JSON Schema the reply must conform to
    pub schema: Value,
}

/// Trait for an external inference provider.
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Send one request and return the reply's output text.
    ///
    /// # Errors
    /// Returns `ProviderError` on transport failure, a non-success status,
    /// a refusal, or a reply with no output text.
    async fn complete(&self, request: &ProviderRequest) -> Result<String, ProviderError>;
}
