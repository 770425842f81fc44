//! Request handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde_json::{json, Value};

use crate::application::{parse_override, PredictionService};
use crate::domain::{PredictionResponse, ValidationError};
use crate::ports::{InferenceProvider, RiskSource};

use super::error::ApiError;

/// Header carrying the per-request mode override (`true` = mock).
pub const MOCK_MODE_HEADER: &str = "x-mock-mode";

pub(super) async fn predict<P, R>(
    State(service): State<Arc<PredictionService<P, R>>>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError>
where
    P: InferenceProvider + 'static,
    R: RiskSource + 'static,
{
    let Json(body) = body.map_err(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "Rejected request body");
        ValidationError::MalformedBody(rejection.body_text())
    })?;

    let header_override = headers
        .get(MOCK_MODE_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_override);

    let response = service.predict_json(&body, header_override).await.map_err(|e| {
        tracing::info!(error = %e, "Prediction request failed");
        ApiError::from(e)
    })?;

    Ok(Json(response))
}

pub(super) async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

pub(super) async fn health<P, R>(State(service): State<Arc<PredictionService<P, R>>>) -> Json<Value>
where
    P: InferenceProvider + 'static,
    R: RiskSource + 'static,
{
    Json(json!({
        "status": "ok",
        "default_mode": service.default_mode(),
    }))
}
