//! Exponential backoff for idempotent requests.

use std::time::{Duration, SystemTime};

use reqwest_retry::{RetryDecision, RetryPolicy};

const MAX_DELAY: Duration = Duration::from_secs(60);

/// Doubles the delay after each transient failure, capped at a minute.
pub struct BackoffPolicy {
    max_retries: u32,
    base_delay: Duration,
}

impl BackoffPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    fn delay(&self, n_past_retries: u32) -> Duration {
        self.base_delay
            .checked_mul(2_u32.saturating_pow(n_past_retries))
            .map_or(MAX_DELAY, |delay| delay.min(MAX_DELAY))
    }
}

impl RetryPolicy for BackoffPolicy {
    fn should_retry(&self, _request_start_time: SystemTime, n_past_retries: u32) -> RetryDecision {
        if n_past_retries >= self.max_retries {
            return RetryDecision::DoNotRetry;
        }
        RetryDecision::Retry {
            execute_after: SystemTime::now() + self.delay(n_past_retries),
        }
    }
}
