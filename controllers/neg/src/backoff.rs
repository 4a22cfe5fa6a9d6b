//! # Retry backoff
//!
//! Exponential backoff for failed reconciliation passes. A NEG gets at
//! most [`MAX_RETRIES`] attempts, with the delay doubling from
//! [`MIN_RETRY_DELAY`] up to [`MAX_RETRY_DELAY`]. The 15-attempt budget
//! follows the kube-controller-manager convention. The watcher's error
//! policy keeps one [`ExponentialBackoff`] per NEG key and resets it on
//! the first successful pass.

use std::time::Duration;

/// Maximum reconciliation attempts per NEG before the failure is surfaced.
pub const MAX_RETRIES: u32 = 15;

/// Floor of the retry delay.
pub const MIN_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Ceiling of the retry delay.
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(600);

/// Exponential backoff calculator.
///
/// Each failure doubles the delay; a success resets it to the floor.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    min: Duration,
    max: Duration,
    current: Duration,
}

impl ExponentialBackoff {
    /// Create a backoff with the given floor and ceiling.
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min,
            max,
            current: min,
        }
    }

    /// Get the next delay and advance the sequence.
    pub fn next_backoff(&mut self) -> Duration {
        let result = self.current;
        self.current = std::cmp::min(self.current * 2, self.max);
        result
    }

    /// Reset the backoff after a successful pass.
    pub fn reset(&mut self) {
        self.current = self.min;
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(MIN_RETRY_DELAY, MAX_RETRY_DELAY)
    }
}
