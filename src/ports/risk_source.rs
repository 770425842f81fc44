//! Risk source port: injectable randomness for the mock generator.

/// Source of uniformly distributed risk percentages.
///
/// Production uses fresh entropy per draw; tests inject a seeded or fixed
/// source so the sequence is reproducible.
pub trait RiskSource: Send + Sync {
    /// Draw an integer uniformly from `[0, 99]`.
    fn draw_percent(&self) -> u8;
}
