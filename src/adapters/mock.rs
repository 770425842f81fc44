//! Mock adapter: fabricated assessments for running without a provider.
//!
//! The generator deliberately ignores the vitals. Its output has the right
//! shape and internal consistency, but carries no medical meaning.

use std::sync::{Mutex, PoisonError};

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::domain::{ActivityItem, PredictionResult, RiskLevel, UserPayload};
use crate::ports::RiskSource;

const KEY_FACTORS: [&str; 3] = [
    "Mock mode: estimate generated without AI",
    "Vitals were not used to compute this score",
    "Enable assisted mode for a personalised assessment",
];

const DIET_RECOMMENDATIONS: [&str; 3] = [
    "Increase fresh vegetables",
    "Limit sugary foods & drinks",
    "Choose whole grains (brown rice, oats, barley)",
];

const DISCLAIMER: &str = "Mock prediction only. This is not a medical diagnosis; \
assisted mode activates when an inference provider is configured.";

/// Draws from a CSPRNG seeded from OS entropy on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntropySource;

impl RiskSource for EntropySource {
    fn draw_percent(&self) -> u8 {
        let mut rng = ChaCha20Rng::from_entropy();
        rng.gen_range(0..100)
    }
}

/// Reproducible source for tests and demos.
#[derive(Debug)]
pub struct SeededSource {
    rng: Mutex<ChaCha20Rng>,
}

impl SeededSource {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha20Rng::seed_from_u64(seed)),
        }
    }
}

impl RiskSource for SeededSource {
    fn draw_percent(&self) -> u8 {
        // A panic mid-draw cannot leave the RNG in an invalid state.
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen_range(0..100)
    }
}

/// Produces self-consistent fake assessments.
#[derive(Debug, Default)]
pub struct MockGenerator<S = EntropySource> {
    source: S,
}

impl<S: RiskSource> MockGenerator<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Generate a result. The payload is accepted for interface symmetry with
    /// the assisted path but does not influence the output.
    pub fn generate(&self, _payload: &UserPayload) -> PredictionResult {
        let risk_percent = self.source.draw_percent().min(99);

        PredictionResult {
            risk_percent,
            risk_level: RiskLevel::from_percent(risk_percent),
            key_factors: KEY_FACTORS.iter().map(|s| (*s).to_string()).collect(),
            diet_recommendations: DIET_RECOMMENDATIONS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            activity_plan: vec![
                ActivityItem::new("Walking", 3, 30),
                ActivityItem::new("Cycling", 2, 40),
                ActivityItem::new("Stretching", 3, 10),
            ],
            disclaimer: DISCLAIMER.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VitalsInput;

    struct FixedSource(u8);

    impl RiskSource for FixedSource {
        fn draw_percent(&self) -> u8 {
            self.0
        }
    }

    fn payload(age: f64, glucose: f64) -> UserPayload {
        UserPayload::new(VitalsInput {
            age,
            weight_kg: 82.0,
            height_cm: 170.0,
            blood_pressure: None,
            cholesterol: None,
            gender: None,
            hba1c_percent: 6.1,
            glucose_mg_dl: glucose,
        })
    }

    #[test]
    fn test_result_is_valid_and_bounded() {
        let generator = MockGenerator::new(SeededSource::new(7));
        for _ in 0..200 {
            let result = generator.generate(&payload(45.0, 140.0));
            assert!(result.risk_percent <= 99);
            assert_eq!(result.risk_level, RiskLevel::from_percent(result.risk_percent));
            assert!((2..=3).contains(&result.activity_plan.len()));
            assert!(result.validate().is_ok());
            assert!(result.disclaimer.contains("Mock"));
        }
    }

    #[test]
    fn test_seeded_sources_are_reproducible() {
        let a = MockGenerator::new(SeededSource::new(42));
        let b = MockGenerator::new(SeededSource::new(42));
        let p = payload(45.0, 140.0);

        let first: Vec<u8> = (0..20).map(|_| a.generate(&p).risk_percent).collect();
        let second: Vec<u8> = (0..20).map(|_| b.generate(&p).risk_percent).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_vitals_do_not_influence_result() {
        let a = MockGenerator::new(SeededSource::new(3));
        let b = MockGenerator::new(SeededSource::new(3));

        let low = a.generate(&payload(20.0, 80.0));
        let high = b.generate(&payload(80.0, 300.0));
        assert_eq!(low, high);
    }

    #[test]
    fn test_fixed_source_sets_bucket() {
        let generator = MockGenerator::new(FixedSource(80));
        let result = generator.generate(&payload(45.0, 140.0));
        assert_eq!(result.risk_percent, 80);
        assert_eq!(result.risk_level, RiskLevel::VeryHigh);
    }

    #[test]
    fn test_out_of_range_draw_is_clamped() {
        let generator = MockGenerator::new(FixedSource(250));
        assert_eq!(generator.generate(&payload(45.0, 140.0)).risk_percent, 99);
    }

    #[test]
    fn test_entropy_source_in_range() {
        for _ in 0..50 {
            assert!(EntropySource.draw_percent() < 100);
        }
    }

    #[test]
    fn test_key_factors_flag_mock_source() {
        let result = MockGenerator::new(FixedSource(10)).generate(&payload(45.0, 140.0));
        assert!(result.key_factors[0].starts_with("Mock mode"));
    }
}
