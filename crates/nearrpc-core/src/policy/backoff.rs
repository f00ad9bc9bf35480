//! Exponential backoff policy for the request retry loop.

use std::time::Duration;

/// Configuration for the backoff policy.
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffConfig {
    /// Total number of attempts, the first try included.
    pub max_attempts: u32,
    /// Wait after the first failed attempt.
    pub base_delay: Duration,
    /// Multiplier applied to the wait on each further attempt.
    pub multiplier: f64,
    /// Optional ceiling on a single wait. `None` leaves growth bounded only
    /// by `max_attempts`.
    pub max_delay: Option<Duration>,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            max_attempts: 12,
            base_delay: Duration::from_millis(500),
            multiplier: 1.5,
            max_delay: None,
        }
    }
}

/// Stateless backoff policy — computes the wait given the attempt number.
#[derive(Debug, Clone, Default)]
pub struct BackoffPolicy {
    pub config: BackoffConfig,
}

impl BackoffPolicy {
    pub fn new(config: BackoffConfig) -> Self {
        Self { config }
    }

    /// Wait before the attempt following `attempt` (0-based):
    /// `base_delay * multiplier^attempt`, clamped to `max_delay` if set.
    ///
    /// Computed in float seconds and clamped before conversion, so huge
    /// exponents saturate at the cap (or `Duration::MAX`) and negative or
    /// NaN products yield zero.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(i32::MAX as u32) as i32;
        let secs = self.config.base_delay.as_secs_f64() * self.config.multiplier.powi(exponent);
        let ceiling = self.config.max_delay.unwrap_or(Duration::MAX);

        if secs.is_nan() || secs <= 0.0 {
            return Duration::ZERO;
        }
        if secs >= ceiling.as_secs_f64() {
            return ceiling;
        }
        Duration::try_from_secs_f64(secs).unwrap_or(ceiling)
    }

    /// Returns `true` if another attempt is allowed after attempt `attempt`
    /// (0-based) has failed.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt.saturating_add(1) < self.config.max_attempts
    }

    /// Total attempts the loop may make.
    pub fn max_attempts(&self) -> u32 {
        self.config.max_attempts
    }
}
