//! Bounded retry with exponential backoff around transport calls.

use std::future::Future;
use std::time::Duration;

use hostwatch_adapters::TransportError;
use tracing::warn;

use crate::MonitoringError;

/// Configuration for retry behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one. Never less than 1.
    pub max_attempts: u32,
    /// Delay before the first retry. Doubles for each further retry.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Delay before retry number `retry` (1-indexed): `base * 2^(retry-1)`.
    pub fn delay_before_retry(&self, retry: u32) -> Duration {
        let shift = retry.saturating_sub(1);
        let multiplier = 1u32.checked_shl(shift).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(multiplier)
            .unwrap_or(Duration::MAX)
    }

    /// Run `operation` until it succeeds or the attempts run out.
    ///
    /// The closure receives the 1-indexed attempt number. There is no delay
    /// before the first attempt.
    pub async fn execute<F, Fut, T>(&self, mut operation: F) -> Result<T, MonitoringError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match operation(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) if attempt >= attempts => {
                    return Err(MonitoringError::Exhausted {
                        attempts: attempt,
                        last: err,
                    });
                }
                Err(err) => {
                    let delay = self.delay_before_retry(attempt);
                    warn!(
                        attempt,
                        max = attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Fetch failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}
