//! Assisted prediction: delegate to the inference provider under a strict
//! output schema and validate the reply before trusting any field.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use crate::domain::{
    PredictionResult, UserPayload, DURATION_MINUTES, FREQUENCY_PER_WEEK, KEY_FACTORS,
};
use crate::ports::{InferenceProvider, ProviderError, ProviderRequest};

/// Name the output schema is registered under. Bump the suffix when the
/// schema changes.
pub const SCHEMA_NAME: &str = "diabetes_risk_assessment_v1";

pub const SYSTEM_INSTRUCTIONS: &str = "You are a clinical risk assistant. \
Estimate the probability that this person has or will develop type 2 diabetes, \
reasoning probabilistically from BMI, fasting glucose, HbA1c, blood pressure, \
cholesterol, age and sex. Explain 3-6 key factors that drove the estimate. \
Give safe, actionable diet recommendations and a weekly activity plan. \
Always include a disclaimer that this is not a medical diagnosis. \
If the input is inconsistent or implausible, reduce your confidence, widen \
your uncertainty and say so in the key factors. \
risk_level must follow risk_percent: below 20 low, below 50 moderate, \
below 80 high, otherwise very_high.";

/// JSON Schema for [`PredictionResult`], field for field.
#[must_use]
pub fn output_schema() -> Value {
    let (min_factors, max_factors) = KEY_FACTORS;
    let (min_freq, max_freq) = FREQUENCY_PER_WEEK;
    let (min_dur, max_dur) = DURATION_MINUTES;

    json!({
        "type": "object",
        "additionalProperties": false,
        "required": [
            "risk_percent",
            "risk_level",
            "key_factors",
            "diet_recommendations",
            "activity_plan",
            "disclaimer"
        ],
        "properties": {
            "risk_percent": { "type": "integer", "minimum": 0, "maximum": 100 },
            "risk_level": {
                "type": "string",
                "enum": ["low", "moderate", "high", "very_high"]
            },
            "key_factors": {
                "type": "array",
                "items": { "type": "string" },
                "minItems": min_factors,
                "maxItems": max_factors
            },
            "diet_recommendations": {
                "type": "array",
                "items": { "type": "string" },
                "minItems": 1
            },
            "activity_plan": {
                "type": "array",
                "minItems": 1,
                "items": {
                    "type": "object",
                    "additionalProperties": false,
                    "required": ["name", "frequency_per_week", "duration_minutes"],
                    "properties": {
                        "name": { "type": "string" },
                        "frequency_per_week": {
                            "type": "integer",
                            "minimum": min_freq,
                            "maximum": max_freq
                        },
                        "duration_minutes": {
                            "type": "integer",
                            "minimum": min_dur,
                            "maximum": max_dur
                        }
                    }
                }
            },
            "disclaimer": { "type": "string" }
        }
    })
}

/// Build the provider request for one payload.
///
/// # Errors
/// Returns `ProviderError::Encoding` if the payload cannot be serialized.
pub fn build_request(payload: &UserPayload) -> Result<ProviderRequest, ProviderError> {
    let input = serde_json::to_string(payload).map_err(|e| ProviderError::Encoding(e.to_string()))?;

    Ok(ProviderRequest {
        instructions: SYSTEM_INSTRUCTIONS.to_string(),
        input,
        schema_name: SCHEMA_NAME,
        schema: output_schema(),
    })
}

/// Parse and validate a provider reply. Any deviation is rejected.
///
/// # Errors
/// Returns `ProviderError::InvalidJson` for unparseable text and
/// `ProviderError::SchemaViolation` for JSON that does not fit the contract.
pub fn parse_reply(text: &str) -> Result<PredictionResult, ProviderError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| ProviderError::InvalidJson(e.to_string()))?;

    let result: PredictionResult = serde_json::from_value(value)
        .map_err(|e| ProviderError::SchemaViolation(vec![e.to_string()]))?;

    result.validate().map_err(ProviderError::SchemaViolation)?;
    Ok(result)
}

/// Produces results through an [`InferenceProvider`].
pub struct AssistedAdapter<P> {
    provider: Arc<P>,
    timeout: Duration,
}

impl<P: InferenceProvider> AssistedAdapter<P> {
    pub fn new(provider: Arc<P>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    /// Run one provider call and validate its reply.
    ///
    /// The call is abandoned once the timeout elapses. No retries.
    ///
    /// # Errors
    /// Returns `ProviderError` if the call fails, times out, or the reply
    /// does not conform to the output schema.
    pub async fn predict(&self, payload: &UserPayload) -> Result<PredictionResult, ProviderError> {
        let request = build_request(payload)?;

        let reply = tokio::time::timeout(self.timeout, self.provider.complete(&request))
            .await
            .map_err(|_| ProviderError::Timeout(self.timeout))??;

        parse_reply(&reply)
    }
}
