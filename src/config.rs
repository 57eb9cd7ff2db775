//! Engine tuning knobs.
//!
//! Values are normally filled from the command line; `Default` gives the
//! settings used by tests and library callers.

use std::time::Duration;

/// Retry policy applied when the account store reports a conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Total number of transaction attempts per mutation, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_backoff: Duration,
    /// Upper bound for any single delay.
    pub max_backoff: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(10),
            max_backoff: Duration::from_millis(200),
        }
    }
}

impl EngineConfig {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Delay to wait after the given failed attempt (1-based), doubling each time.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.initial_backoff
            .saturating_mul(1 << exponent)
            .min(self.max_backoff)
    }
}
