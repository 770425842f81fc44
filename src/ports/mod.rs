//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundaries
//! between the application and external systems (the inference provider and
//! the random source behind mock results).

mod inference;
mod risk_source;

pub use inference::{InferenceProvider, ProviderError, ProviderRequest};
pub use risk_source::RiskSource;
