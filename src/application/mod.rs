//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement the
//! prediction request pipeline.

mod assisted;
mod mode;
mod prediction;

pub use assisted::{build_request, output_schema, parse_reply, AssistedAdapter, SCHEMA_NAME, SYSTEM_INSTRUCTIONS};
pub use mode::ModeResolver;
pub use prediction::{parse_override, PredictionRequest, PredictionService};
