//! # Glycorisk
//!
//! Diabetes risk assessment service.
//!
//! A set of vitals goes in; a risk score, risk bucket, contributing factors,
//! diet guidance and an activity plan come out. Results come from one of two
//! interchangeable sources:
//! - a deterministic-shape mock generator (no medical meaning)
//! - an external inference provider constrained by a strict output schema
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Vitals, derived metrics, and the result contract
//! - `ports`: Trait definitions for the provider and the random source
//! - `adapters`: Concrete implementations (OpenAI client, mock generator, log sanitizer)
//! - `application`: Mode resolution and the prediction pipeline
//! - `config`: Startup configuration
//! - `server`: HTTP surface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod server;

pub use domain::{Mode, PredictionResponse, PredictionResult, RiskLevel, UserPayload};

/// Result type for Glycorisk operations
pub type Result<T> = std::result::Result<T, GlycoriskError>;

/// Main error type for Glycorisk
#[derive(Debug, thiserror::Error)]
pub enum GlycoriskError {
    #[error("Invalid vitals: {0}")]
    Validation(#[from] domain::ValidationError),

    #[error("Prediction failed: {0}")]
    Provider(#[from] ports::ProviderError),
}
