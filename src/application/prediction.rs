//! Prediction service: the request pipeline.
//!
//! This service coordinates:
//! - Vitals validation and coercion
//! - BMI derivation
//! - Mode resolution
//! - Mock or assisted result generation
//! - Response composition

use serde_json::Value;

use crate::adapters::mock::MockGenerator;
use crate::application::{AssistedAdapter, ModeResolver};
use crate::domain::{
    Mode, PredictionResponse, PredictionResult, UserPayload, ValidationError, VitalsInput,
};
use crate::ports::{InferenceProvider, ProviderError, RiskSource};

/// A parsed request: typed vitals plus the client's optional mode override.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest {
    pub vitals: VitalsInput,

    /// `Some(true)` forces mock, `Some(false)` forces assisted
    pub mock_override: Option<bool>,
}

impl PredictionRequest {
    /// Parse a request body. A `mock` field in the body takes precedence
    /// over `header_override`.
    ///
    /// # Errors
    /// Returns `ValidationError` if the body is not an object, a required
    /// field is missing, or a value cannot be coerced.
    pub fn from_json(body: &Value, header_override: Option<bool>) -> Result<Self, ValidationError> {
        let map = body.as_object().ok_or(ValidationError::NotAnObject)?;

        let body_override = match map.get("mock") {
            None | Some(Value::Null) => None,
            Some(Value::Bool(b)) => Some(*b),
            Some(Value::String(s)) => Some(parse_override(s).ok_or(ValidationError::InvalidOverride)?),
            Some(_) => return Err(ValidationError::InvalidOverride),
        };

        Ok(Self {
            vitals: VitalsInput::from_json(map)?,
            mock_override: body_override.or(header_override),
        })
    }
}

/// Parse a textual `true`/`false` override signal.
#[must_use]
pub fn parse_override(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Runs the prediction pipeline.
///
/// Holds only what was fixed at startup; requests share it concurrently and
/// never mutate it.
pub struct PredictionService<P, R> {
    resolver: ModeResolver,
    mock: MockGenerator<R>,
    assisted: Option<AssistedAdapter<P>>,
}

impl<P, R> PredictionService<P, R>
where
    P: InferenceProvider,
    R: RiskSource,
{
    /// Create a new prediction service.
    ///
    /// `assisted` is `None` when no provider credential is configured.
    pub fn new(
        resolver: ModeResolver,
        mock: MockGenerator<R>,
        assisted: Option<AssistedAdapter<P>>,
    ) -> Self {
        Self {
            resolver,
            mock,
            assisted,
        }
    }

    #[must_use]
    pub fn default_mode(&self) -> Mode {
        self.resolver.default_mode()
    }

    /// Run the full pipeline on a raw JSON body.
    ///
    /// # Errors
    /// Returns `GlycoriskError::Validation` for bad input and
    /// `GlycoriskError::Provider` when assisted mode fails.
    pub async fn predict_json(
        &self,
        body: &Value,
        header_override: Option<bool>,
    ) -> crate::Result<PredictionResponse> {
        let request = PredictionRequest::from_json(body, header_override)?;
        self.predict(request).await
    }

    /// Run the pipeline on an already parsed request.
    ///
    /// # Errors
    /// Returns `GlycoriskError::Provider` when assisted mode fails, including
    /// when assisted mode is requested but no provider is configured.
    pub async fn predict(
        &self,
        request: PredictionRequest,
    ) -> crate::Result<PredictionResponse> {
        let payload = UserPayload::new(request.vitals);
        let mode = self.resolver.resolve(request.mock_override);

        tracing::debug!(
            %mode,
            overridden = request.mock_override.is_some(),
            bmi_available = payload.bmi().is_some(),
            "Resolved prediction mode"
        );

        let result = match mode {
            Mode::Mock => self.mock.generate(&payload),
            Mode::Assisted => self.run_assisted(&payload).await?,
        };

        tracing::info!(
            %mode,
            risk_level = %result.risk_level,
            "Prediction complete"
        );

        Ok(PredictionResponse::compose(payload, mode, result))
    }

    async fn run_assisted(&self, payload: &UserPayload) -> Result<PredictionResult, ProviderError> {
        let adapter = self.assisted.as_ref().ok_or_else(|| {
            tracing::warn!("Assisted mode requested but no provider credential is configured");
            ProviderError::MissingCredential
        })?;

        adapter.predict(payload).await.map_err(|e| {
            tracing::warn!(error = %e, "Assisted prediction failed");
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::SeededSource;
    use crate::domain::RiskLevel;
    use crate::ports::ProviderRequest;
    use crate::GlycoriskError;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Barrier;

    struct ScriptedProvider {
        reply: String,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl InferenceProvider for ScriptedProvider {
        async fn complete(&self, _request: &ProviderRequest) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    fn scripted(reply: Value) -> Arc<ScriptedProvider> {
        Arc::new(ScriptedProvider {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
        })
    }

    fn provider_reply() -> Value {
        json!({
            "risk_percent": 35,
            "risk_level": "moderate",
            "key_factors": ["BMI 28.4 (overweight)", "HbA1c 6.1% (prediabetes range)", "Glucose 140 mg/dL"],
            "diet_recommendations": ["Swap sugary drinks for water", "Add legumes"],
            "activity_plan": [
                {"name": "Walking", "frequency_per_week": 5, "duration_minutes": 30},
                {"name": "Resistance training", "frequency_per_week": 2, "duration_minutes": 20}
            ],
            "disclaimer": "Informational only; consult a clinician."
        })
    }

    fn body() -> Value {
        json!({
            "age": 45,
            "weightKg": 82,
            "heightCm": 170,
            "hba1cPercent": 6.1,
            "glucoseMgDl": 140
        })
    }

    fn service(
        default: Mode,
        provider: Option<Arc<ScriptedProvider>>,
    ) -> PredictionService<ScriptedProvider, SeededSource> {
        PredictionService::new(
            ModeResolver::new(default),
            MockGenerator::new(SeededSource::new(11)),
            provider.map(|p| AssistedAdapter::new(p, Duration::from_secs(5))),
        )
    }

    #[tokio::test]
    async fn test_mock_pipeline_example() {
        let svc = service(Mode::Mock, None);
        let response = svc.predict_json(&body(), None).await.expect("Should predict");

        assert_eq!(response.mode, Mode::Mock);
        assert_eq!(response.input.bmi(), Some(28.4));
        assert!(response.result.risk_percent <= 99);
        assert_eq!(
            response.result.risk_level,
            RiskLevel::from_percent(response.result.risk_percent)
        );
        assert!((2..=3).contains(&response.result.activity_plan.len()));
    }

    #[tokio::test]
    async fn test_assisted_override_without_credential_fails() {
        let svc = service(Mode::Mock, None);
        let mut request = body();
        request["mock"] = json!(false);

        let err = svc.predict_json(&request, None).await.expect_err("Should fail");
        assert!(matches!(
            err,
            GlycoriskError::Provider(ProviderError::MissingCredential)
        ));
    }

    #[tokio::test]
    async fn test_mock_override_skips_provider() {
        let provider = scripted(provider_reply());
        let svc = service(Mode::Assisted, Some(provider.clone()));

        let response = svc
            .predict_json(&body(), Some(true))
            .await
            .expect("Should predict");
        assert_eq!(response.mode, Mode::Mock);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_body_override_beats_header() {
        let provider = scripted(provider_reply());
        let svc = service(Mode::Mock, Some(provider.clone()));
        let mut request = body();
        request["mock"] = json!(false);

        let response = svc
            .predict_json(&request, Some(true))
            .await
            .expect("Should predict");
        assert_eq!(response.mode, Mode::Assisted);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_assisted_is_deterministic_with_fixed_provider() {
        let svc = service(Mode::Assisted, Some(scripted(provider_reply())));

        let first = svc.predict_json(&body(), None).await.expect("Should predict");
        let second = svc.predict_json(&body(), None).await.expect("Should predict");
        assert_eq!(first, second);
        assert_eq!(first.mode, Mode::Assisted);
        assert_eq!(first.result.risk_percent, 35);
    }

    #[tokio::test]
    async fn test_malformed_provider_reply_is_an_error() {
        let mut reply = provider_reply();
        reply.as_object_mut().expect("object").remove("disclaimer");
        let svc = service(Mode::Assisted, Some(scripted(reply)));

        assert!(matches!(
            svc.predict_json(&body(), None).await,
            Err(GlycoriskError::Provider(ProviderError::SchemaViolation(_)))
        ));
    }

    #[tokio::test]
    async fn test_payload_preserved_verbatim() {
        let svc = service(Mode::Mock, None);
        let mut request = body();
        request["bloodPressure"] = json!("130/85");
        request["gender"] = json!("male");

        let parsed = PredictionRequest::from_json(&request, None).expect("Should parse");
        let expected = UserPayload::new(parsed.vitals.clone());
        let response = svc.predict(parsed).await.expect("Should predict");
        assert_eq!(response.input, expected);
    }

    #[tokio::test]
    async fn test_validation_failure() {
        let svc = service(Mode::Mock, None);
        let mut request = body();
        request["glucoseMgDl"] = json!("");

        assert!(matches!(
            svc.predict_json(&request, None).await,
            Err(GlycoriskError::Validation(ValidationError::MissingFields(_)))
        ));
        assert!(matches!(
            svc.predict_json(&json!([1, 2, 3]), None).await,
            Err(GlycoriskError::Validation(ValidationError::NotAnObject))
        ));
    }

    /// Replies only once every party of its barrier is waiting inside `complete`.
    struct RendezvousProvider {
        barrier: Barrier,
        reply: String,
    }

    #[async_trait]
    impl InferenceProvider for RendezvousProvider {
        async fn complete(&self, _request: &ProviderRequest) -> Result<String, ProviderError> {
            self.barrier.wait().await;
            Ok(self.reply.clone())
        }
    }

    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    /// Never replies; records when its in-flight call is dropped.
    struct StalledProvider {
        started: Arc<AtomicBool>,
        dropped: Arc<AtomicBool>,
    }

    #[async_trait]
    impl InferenceProvider for StalledProvider {
        async fn complete(&self, _request: &ProviderRequest) -> Result<String, ProviderError> {
            let _flag = DropFlag(self.dropped.clone());
            self.started.store(true, Ordering::SeqCst);
            std::future::pending::<Result<String, ProviderError>>().await
        }
    }

    #[tokio::test]
    async fn test_concurrent_requests_do_not_serialize() {
        let provider = Arc::new(RendezvousProvider {
            barrier: Barrier::new(2),
            reply: provider_reply().to_string(),
        });
        let svc = PredictionService::new(
            ModeResolver::new(Mode::Assisted),
            MockGenerator::new(SeededSource::new(11)),
            Some(AssistedAdapter::new(provider, Duration::from_secs(5))),
        );

        // Both calls must be inside the provider at once for either to finish.
        let (first, second) = tokio::time::timeout(Duration::from_secs(2), async {
            let (body_a, body_b) = (body(), body());
            tokio::join!(
                svc.predict_json(&body_a, None),
                svc.predict_json(&body_b, None)
            )
        })
        .await
        .expect("Should not deadlock");

        let first = first.expect("Should predict");
        let second = second.expect("Should predict");
        assert_eq!(first, second);
        assert_eq!(first.mode, Mode::Assisted);
    }

    #[tokio::test]
    async fn test_dropped_request_cancels_provider_call() {
        let started = Arc::new(AtomicBool::new(false));
        let dropped = Arc::new(AtomicBool::new(false));
        let provider = Arc::new(StalledProvider {
            started: started.clone(),
            dropped: dropped.clone(),
        });
        let svc = PredictionService::new(
            ModeResolver::new(Mode::Assisted),
            MockGenerator::new(SeededSource::new(11)),
            Some(AssistedAdapter::new(provider, Duration::from_secs(60))),
        );

        // The caller gives up long before the adapter's own timeout.
        let outcome =
            tokio::time::timeout(Duration::from_millis(20), svc.predict_json(&body(), None)).await;

        assert!(outcome.is_err());
        assert!(started.load(Ordering::SeqCst));
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[test]
    fn test_override_parsing() {
        assert_eq!(parse_override("TRUE"), Some(true));
        assert_eq!(parse_override(" false "), Some(false));
        assert_eq!(parse_override("maybe"), None);

        let mut request = body();
        request["mock"] = json!(1);
        assert_eq!(
            PredictionRequest::from_json(&request, None),
            Err(ValidationError::InvalidOverride)
        );
    }
}
