//! Assessment result types.
//!
//! [`PredictionResult`] is the single normalized shape returned by every
//! result source, mock or provider-assisted.

use serde::{Deserialize, Serialize};

use super::UserPayload;

/// Inclusive bounds for an activity plan entry.
pub const FREQUENCY_PER_WEEK: (u8, u8) = (1, 7);
pub const DURATION_MINUTES: (u16, u16) = (10, 120);

/// Allowed number of key factors.
pub const KEY_FACTORS: (usize, usize) = (1, 6);

/// Risk bucket derived from a risk percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl RiskLevel {
    /// Bucket a risk percentage. Boundaries belong to the higher bucket.
    #[must_use]
    pub fn from_percent(risk_percent: u8) -> Self {
        match risk_percent {
            0..=19 => Self::Low,
            20..=49 => Self::Moderate,
            50..=79 => Self::High,
            _ => Self::VeryHigh,
        }
    }

    /// Wire name, as used in the output schema.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::VeryHigh => "very_high",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One weekly activity recommendation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActivityItem {
    pub name: String,
    pub frequency_per_week: u8,
    pub duration_minutes: u16,
}

impl ActivityItem {
    #[must_use]
    pub fn new(name: impl Into<String>, frequency_per_week: u8, duration_minutes: u16) -> Self {
        Self {
            name: name.into(),
            frequency_per_week,
            duration_minutes,
        }
    }
}

/// Normalized assessment, regardless of which source produced it.
///
/// Deserialization is strict: all fields are required and unknown fields are
/// rejected. Range constraints are checked by [`PredictionResult::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PredictionResult {
    /// Estimated risk, 0-100
    pub risk_percent: u8,
    pub risk_level: RiskLevel,
    pub key_factors: Vec<String>,
    pub diet_recommendations: Vec<String>,
    pub activity_plan: Vec<ActivityItem>,
    pub disclaimer: String,
}

impl PredictionResult {
    /// Check every range and consistency constraint of the result contract.
    ///
    /// # Errors
    /// Returns all violations found, one message per violation.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.risk_percent > 100 {
            errors.push(format!(
                "risk_percent {} out of range [0, 100]",
                self.risk_percent
            ));
        }
        let expected = RiskLevel::from_percent(self.risk_percent);
        if self.risk_level != expected {
            errors.push(format!(
                "risk_level {} inconsistent with risk_percent {} (expected {})",
                self.risk_level, self.risk_percent, expected
            ));
        }

        let (min_factors, max_factors) = KEY_FACTORS;
        if !(min_factors..=max_factors).contains(&self.key_factors.len()) {
            errors.push(format!(
                "key_factors has {} items, expected {min_factors}-{max_factors}",
                self.key_factors.len()
            ));
        }
        if self.key_factors.iter().any(|f| f.trim().is_empty()) {
            errors.push("key_factors contains an empty entry".to_string());
        }

        if self.diet_recommendations.is_empty() {
            errors.push("diet_recommendations is empty".to_string());
        }
        if self.diet_recommendations.iter().any(|d| d.trim().is_empty()) {
            errors.push("diet_recommendations contains an empty entry".to_string());
        }

        if self.activity_plan.is_empty() {
            errors.push("activity_plan is empty".to_string());
        }
        for item in &self.activity_plan {
            if item.name.trim().is_empty() {
                errors.push("activity_plan entry has an empty name".to_string());
            }
            let (min_freq, max_freq) = FREQUENCY_PER_WEEK;
            if !(min_freq..=max_freq).contains(&item.frequency_per_week) {
                errors.push(format!(
                    "{}: frequency_per_week {} out of range [{min_freq}, {max_freq}]",
                    item.name, item.frequency_per_week
                ));
            }
            let (min_dur, max_dur) = DURATION_MINUTES;
            if !(min_dur..=max_dur).contains(&item.duration_minutes) {
                errors.push(format!(
                    "{}: duration_minutes {} out of range [{min_dur}, {max_dur}]",
                    item.name, item.duration_minutes
                ));
            }
        }

        if self.disclaimer.trim().is_empty() {
            errors.push("disclaimer is empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Which source answered a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    #[serde(rename = "mock")]
    Mock,
    #[serde(rename = "ai")]
    Assisted,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mock => write!(f, "mock"),
            Self::Assisted => write!(f, "ai"),
        }
    }
}

/// Outward response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub input: UserPayload,
    pub mode: Mode,
    pub result: PredictionResult,
}

impl PredictionResponse {
    /// Wrap a result without touching the payload or the result.
    #[must_use]
    pub fn compose(input: UserPayload, mode: Mode, result: PredictionResult) -> Self {
        Self {
            input,
            mode,
            result,
        }
    }
}
