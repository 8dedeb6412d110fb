//! Retry policy and backoff.

use std::time::Duration;

/// Retry configuration.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Backoff strategy.
    pub backoff: BackoffStrategy,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::exponential(8, Duration::from_millis(500))
    }
}

impl RetryConfig {
    /// Create a retry config with exponential backoff starting at `min_delay`.
    pub fn exponential(max_retries: u32, min_delay: Duration) -> Self {
        Self {
            max_retries,
            backoff: BackoffStrategy::Exponential {
                initial: min_delay,
                max: Duration::from_secs(60),
                multiplier: 2.0,
            },
        }
    }

    /// Create a retry config with constant delay.
    pub fn constant(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries,
            backoff: BackoffStrategy::Constant(delay),
        }
    }

    /// Create a retry config with no delay.
    pub fn immediate(max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: BackoffStrategy::None,
        }
    }

    /// Create a config that never retries.
    pub fn disabled() -> Self {
        Self::immediate(0)
    }

    /// Total number of attempts a call may make.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before the given 1-based retry.
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        self.backoff.delay_for_attempt(retry.saturating_sub(1))
    }

    /// Attempt after which a still-failing call is reported as a warning.
    pub fn warning_attempt(&self) -> u32 {
        (self.max_retries as f64 / 2.0).round() as u32
    }
}

/// Backoff strategy for retries.
#[derive(Debug, Clone)]
pub enum BackoffStrategy {
    /// No delay between retries.
    None,
    /// Constant delay between retries.
    Constant(Duration),
    /// Exponential backoff: delay multiplies each attempt.
    Exponential {
        /// Initial delay.
        initial: Duration,
        /// Maximum delay.
        max: Duration,
        /// Multiplier (typically 2.0).
        multiplier: f64,
    },
}

impl BackoffStrategy {
    /// Calculate delay for a given attempt (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        match self {
            Self::None => Duration::ZERO,
            Self::Constant(d) => *d,
            Self::Exponential {
                initial,
                max,
                multiplier,
            } => {
                let factor = multiplier.powi(attempt.min(i32::MAX as u32) as i32);
                let millis = initial.as_millis() as f64 * factor;
                if !millis.is_finite() || millis >= max.as_millis() as f64 {
                    return *max;
                }
                Duration::from_millis(millis as u64)
            }
        }
    }
}
