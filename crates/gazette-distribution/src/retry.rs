//! Exponential backoff retry policy for outbound calls.
//!
//! The policy is pure arithmetic plus a driver loop, decoupled from the
//! HTTP transport so it can be exercised with counting closures and zero
//! delay in tests.

use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{DistributionError, DistributionResult};

/// Maximum backoff delay between attempts, in seconds.
const MAX_BACKOFF_SECS: u64 = 60;

/// Bounded retry with exponential backoff.
///
/// `max_retries` counts *additional* attempts: a call is tried
/// `max_retries + 1` times in total. Retries of one call are strictly
/// sequential; two attempts of the same call never overlap.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    base_backoff_secs: u64,
}

impl RetryPolicy {
    /// Create a policy with the given retry budget and base delay.
    #[must_use]
    pub fn new(max_retries: u32, base_backoff_secs: u64) -> Self {
        Self {
            max_retries,
            base_backoff_secs,
        }
    }

    /// Delay before retrying after the given 0-based failed attempt:
    /// `min(base * 2^attempt, 60s)`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let secs = self
            .base_backoff_secs
            .saturating_mul(2u64.saturating_pow(attempt))
            .min(MAX_BACKOFF_SECS);
        Duration::from_secs(secs)
    }

    /// Run `f` until it succeeds or the retry budget is exhausted.
    ///
    /// Every failure is retryable here: the operations this subsystem
    /// performs treat transport errors and non-2xx responses alike. On
    /// exhaustion the final [`DistributionError::Request`] is wrapped into
    /// [`DistributionError::RetryExhausted`], preserving its URL and
    /// status.
    pub async fn execute<F, Fut, T>(&self, operation: &str, mut f: F) -> DistributionResult<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = DistributionResult<T>>,
    {
        let mut attempt: u32 = 0;
        loop {
            match f().await {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(
                            operation,
                            attempt = attempt + 1,
                            "operation succeeded after retries"
                        );
                    }
                    return Ok(value);
                }
                Err(error) if attempt >= self.max_retries => {
                    let attempts = attempt + 1;
                    warn!(
                        operation,
                        attempts,
                        error = %error,
                        "retries exhausted"
                    );
                    return Err(exhausted(error, attempts));
                }
                Err(error) => {
                    let delay = self.delay_for(attempt);
                    debug!(
                        operation,
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        delay_secs = delay.as_secs(),
                        error = %error,
                        "retrying after failed attempt"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// Wrap the terminal per-attempt error into a retry-exhausted error.
fn exhausted(error: DistributionError, attempts: u32) -> DistributionError {
    match error {
        DistributionError::Request {
            url,
            status,
            detail,
        } => DistributionError::RetryExhausted {
            url,
            status,
            attempts,
            detail,
        },
        // Non-request failures (e.g. token acquisition inside the closure)
        // keep their own shape.
        other => other,
    }
}
