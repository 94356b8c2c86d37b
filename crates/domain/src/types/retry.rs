use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS};

/// Exponential backoff retry policy.
///
/// `max_attempts` counts the first attempt, so a policy of 3 makes at most
/// two retries. The delay before attempt `n` (n > 1) is
/// `base_delay_ms * backoff_multiplier^(n - 2)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl RetryPolicy {
    /// Build a policy, clamping `max_attempts` to at least one and the
    /// multiplier to at least `1.0`.
    pub fn new(max_attempts: u32, base_delay_ms: u64, backoff_multiplier: f64) -> Self {
        let backoff_multiplier =
            if backoff_multiplier.is_finite() && backoff_multiplier >= 1.0 { backoff_multiplier } else { 1.0 };
        Self { max_attempts: max_attempts.max(1), base_delay_ms, backoff_multiplier }
    }

    /// Policy that never retries.
    pub fn no_retry() -> Self {
        Self::new(1, 0, 1.0)
    }

    /// Copy of this policy with its invariants re-applied, for values that
    /// arrived through deserialization.
    pub fn clamped(self) -> Self {
        Self::new(self.max_attempts, self.base_delay_ms, self.backoff_multiplier)
    }

    /// Delay to sleep before `attempt` (1-indexed). The first attempt never
    /// waits.
    pub fn delay_before_attempt(&self, attempt: u32) -> Duration {
        if attempt <= 1 {
            return Duration::ZERO;
        }
        let exponent = i32::try_from(attempt - 2).unwrap_or(i32::MAX);
        let millis = self.base_delay_ms as f64 * self.backoff_multiplier.powi(exponent);
        // Saturate instead of overflowing on absurd configurations
        if !millis.is_finite() || millis >= u64::MAX as f64 {
            return Duration::from_millis(u64::MAX);
        }
        Duration::from_millis(millis as u64)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BASE_DELAY_MS, DEFAULT_BACKOFF_MULTIPLIER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_delays_are_two_then_four_seconds() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_before_attempt(1), Duration::ZERO);
        assert_eq!(policy.delay_before_attempt(2), Duration::from_millis(2000));
        assert_eq!(policy.delay_before_attempt(3), Duration::from_millis(4000));
    }

    #[test]
    fn max_attempts_is_clamped() {
        assert_eq!(RetryPolicy::new(0, 100, 2.0).max_attempts, 1);
        let raw = RetryPolicy { max_attempts: 0, base_delay_ms: 10, backoff_multiplier: 0.5 };
        let clamped = raw.clamped();
        assert_eq!(clamped.max_attempts, 1);
        assert!((clamped.backoff_multiplier - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn huge_exponent_saturates() {
        let policy = RetryPolicy::new(u32::MAX, u64::MAX, 10.0);
        assert_eq!(policy.delay_before_attempt(500), Duration::from_millis(u64::MAX));
    }
}
