//! Download configuration constants and retry policy

use std::time::Duration;

/// Attempts per file before a transfer is reported as failed.
pub const MAX_ATTEMPTS: u32 = 5;

/// Delay before the second attempt; doubles after every further failure.
pub const INITIAL_BACKOFF_MS: u64 = 1000; // 1 second

/// Concurrent day tasks when the request asks for zero.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Upper bound accepted on the command line for `--concurrency`.
pub const MAX_CONCURRENCY: usize = 64;

/// Calculate exponential backoff delay after `failed_attempts` failures
///
/// The first failure waits `base`, the second `2 * base`, and so on. `cap`
/// clamps the result when set.
pub fn calculate_backoff(base: Duration, failed_attempts: u32, cap: Option<Duration>) -> Duration {
    let exponent = failed_attempts.saturating_sub(1).min(31);
    let delay = base.saturating_mul(1u32 << exponent);
    match cap {
        Some(cap) => delay.min(cap),
        None => delay,
    }
}

/// Retry behaviour of the file fetcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per file, including the first one
    pub max_attempts: u32,
    /// Delay after the first failed attempt
    pub base_delay: Duration,
    /// Optional upper bound on a single backoff delay (`None` = uncapped)
    pub max_backoff: Option<Duration>,
    /// Delete the destination file when every attempt failed
    pub remove_partial_on_failure: bool,
}

impl RetryPolicy {
    /// Set the attempt budget (at least one attempt is always made)
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Set the base backoff delay
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Cap every backoff delay at `max_backoff`
    pub fn with_max_backoff(mut self, max_backoff: Option<Duration>) -> Self {
        self.max_backoff = max_backoff;
        self
    }

    /// Remove the destination file after exhausting all attempts
    pub fn with_remove_partial_on_failure(mut self, remove: bool) -> Self {
        self.remove_partial_on_failure = remove;
        self
    }

    /// Delay to sleep after `failed_attempts` failures
    pub fn backoff(&self, failed_attempts: u32) -> Duration {
        calculate_backoff(self.base_delay, failed_attempts, self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            base_delay: Duration::from_millis(INITIAL_BACKOFF_MS),
            max_backoff: None,
            remove_partial_on_failure: false,
        }
    }
}
