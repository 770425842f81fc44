//! Domain layer: Core business types and logic.
//!
//! Pure types with no I/O. Request vitals are validated and coerced here, and
//! the result contract shared by every prediction source is defined here.

mod assessment;
mod vitals;

pub use assessment::{
    ActivityItem, Mode, PredictionResponse, PredictionResult, RiskLevel, DURATION_MINUTES,
    FREQUENCY_PER_WEEK, KEY_FACTORS,
};
pub use vitals::{
    body_mass_index, check_required, Gender, UserPayload, ValidationError, VitalsInput,
    REQUIRED_FIELDS,
};
