//! Error types and HTTP error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::adapters::sanitize::sanitize;
use crate::domain::ValidationError;
use crate::ports::ProviderError;
use crate::GlycoriskError;

/// Request-level failure, mapped onto a status code and a stable JSON body.
#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed input (400).
    Validation(ValidationError),
    /// Unsupported method on a known path (405).
    MethodNotAllowed,
    /// Assisted prediction failed (500).
    Provider(ProviderError),
}

/// JSON body returned on error.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(e) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: e.to_string(),
                    details: None,
                },
            ),
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                ErrorBody {
                    error: "Method Not Allowed".to_string(),
                    details: None,
                },
            ),
            ApiError::Provider(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorBody {
                    error: "Prediction failed".to_string(),
                    details: Some(sanitize(&e.to_string())),
                },
            ),
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<GlycoriskError> for ApiError {
    fn from(e: GlycoriskError) -> Self {
        match e {
            GlycoriskError::Validation(v) => ApiError::Validation(v),
            GlycoriskError::Provider(p) => ApiError::Provider(p),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Validation(e)
    }
}
