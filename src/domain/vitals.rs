//! Vitals input types for diabetes risk assessment.
//!
//! Request bodies arrive as loosely typed JSON (browser forms submit numbers
//! as strings). They are checked for presence and coerced into [`VitalsInput`]
//! here, before any other component sees them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields that must be present and non-empty in every request.
pub const REQUIRED_FIELDS: [&str; 5] = [
    "age",
    "weightKg",
    "heightCm",
    "hba1cPercent",
    "glucoseMgDl",
];

/// Errors raised while validating or coercing request vitals.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required field: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("invalid numeric value for {0}")]
    InvalidNumber(&'static str),

    #[error("invalid text value for {0}")]
    InvalidText(&'static str),

    #[error("invalid gender: {0} (expected male, female or other)")]
    InvalidGender(String),

    #[error("invalid mock override: expected true or false")]
    InvalidOverride,

    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("malformed request body: {0}")]
    MalformedBody(String),
}

/// Self-reported sex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    fn parse(raw: &str) -> Result<Option<Self>, ValidationError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "" => Ok(None),
            "male" => Ok(Some(Self::Male)),
            "female" => Ok(Some(Self::Female)),
            "other" => Ok(Some(Self::Other)),
            _ => Err(ValidationError::InvalidGender(raw.to_string())),
        }
    }
}

/// Typed vitals, after presence checks and coercion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VitalsInput {
    /// Age in years
    pub age: f64,

    /// Body weight in kilograms
    pub weight_kg: f64,

    /// Height in centimetres
    pub height_cm: f64,

    /// Free-form blood pressure reading, e.g. "130/85"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_pressure: Option<String>,

    /// Free-form cholesterol reading
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cholesterol: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,

    /// Glycated haemoglobin in %
    pub hba1c_percent: f64,

    /// Fasting plasma glucose in mg/dL
    pub glucose_mg_dl: f64,
}

/// Check that every required field is present, non-null and non-empty.
///
/// Types are not checked here; an empty string counts as missing even though
/// it is not null.
///
/// # Errors
/// Returns `ValidationError::MissingFields` listing every absent field.
pub fn check_required(body: &Map<String, Value>) -> Result<(), ValidationError> {
    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| is_missing(body.get(*field)))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::MissingFields(missing))
    }
}

fn is_missing(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

fn number(body: &Map<String, Value>, field: &'static str) -> Result<f64, ValidationError> {
    let parsed = match body.get(field) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed
        .filter(|v| v.is_finite())
        .ok_or(ValidationError::InvalidNumber(field))
}

fn optional_text(
    body: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, ValidationError> {
    match body.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(_) => Err(ValidationError::InvalidText(field)),
    }
}

impl VitalsInput {
    /// Validate and coerce a raw JSON object into typed vitals.
    ///
    /// # Errors
    /// Returns `ValidationError` if a required field is missing or a value
    /// cannot be coerced to its expected type.
    pub fn from_json(body: &Map<String, Value>) -> Result<Self, ValidationError> {
        check_required(body)?;

        let gender = match body.get("gender") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Gender::parse(s)?,
            Some(other) => return Err(ValidationError::InvalidGender(other.to_string())),
        };

        Ok(Self {
            age: number(body, "age")?,
            weight_kg: number(body, "weightKg")?,
            height_cm: number(body, "heightCm")?,
            blood_pressure: optional_text(body, "bloodPressure")?,
            cholesterol: optional_text(body, "cholesterol")?,
            gender,
            hba1c_percent: number(body, "hba1cPercent")?,
            glucose_mg_dl: number(body, "glucoseMgDl")?,
        })
    }
}

/// Body-mass index from weight (kg) and height (cm), rounded to one decimal.
///
/// Returns `None` when the result is not finite (zero height, for instance).
#[must_use]
pub fn body_mass_index(weight_kg: f64, height_cm: f64) -> Option<f64> {
    let height_m = height_cm / 100.0;
    let bmi = weight_kg / (height_m * height_m);
    bmi.is_finite().then(|| (bmi * 10.0).round() / 10.0)
}

/// Vitals plus derived metrics, as forwarded to a result source and echoed
/// back to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    #[serde(flatten)]
    vitals: VitalsInput,

    /// `null` when the BMI computation is not finite
    bmi: Option<f64>,
}

impl UserPayload {
    /// Build the payload, deriving BMI from the vitals.
    #[must_use]
    pub fn new(vitals: VitalsInput) -> Self {
        let bmi = body_mass_index(vitals.weight_kg, vitals.height_cm);
        Self { vitals, bmi }
    }

    #[must_use]
    pub fn vitals(&self) -> &VitalsInput {
        &self.vitals
    }

    #[must_use]
    pub fn bmi(&self) -> Option<f64> {
        self.bmi
    }
}
