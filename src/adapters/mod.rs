//! Adapters layer: Concrete implementations of ports.
//!
//! - `openai`: HTTP client for the inference provider
//! - `mock`: fabricated results and the random sources behind them
//! - `sanitize`: credential filtering for logs and error details

pub mod mock;
pub mod openai;
pub mod sanitize;
