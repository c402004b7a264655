//! Retry logic with exponential backoff.
//!
//! The backoff is decoupled from any error type: [`retry_with_backoff`]
//! retries every failure and callers pre-filter what is worth retrying, or use
//! [`retry_if`] to stop early on non-retryable errors. Payment mutations are
//! never routed through here; only safe, idempotent reads are.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

/// Retry policy with exponential backoff and jitter.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the initial attempt (total attempts = `max_retries + 1`).
    pub max_retries: u32,
    /// Base delay; doubles each attempt.
    pub base_delay: Duration,
    /// Ceiling for the computed delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(10_000),
        }
    }
}

/// Jitter added on top of the exponential delay, up to one second.
const JITTER_MILLIS: u64 = 1000;

impl RetryPolicy {
    /// Create a policy with explicit parameters.
    #[must_use]
    pub const fn new(max_retries: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay,
        }
    }

    /// Delay before re-running after the failure of attempt `attempt`
    /// (0-indexed): `min(base * 2^attempt + jitter, max_delay)`.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponential = self
            .base_delay
            .saturating_mul(2u32.saturating_pow(attempt));
        let jitter = Duration::from_millis(rand::random::<u64>() % JITTER_MILLIS);
        (exponential + jitter).min(self.max_delay)
    }
}

/// Run `operation`, retrying every failure until the policy is exhausted.
///
/// The operation runs `max_retries + 1` times at most; the final failure is
/// returned as-is. Callers are responsible for only handing in operations
/// whose failures are worth retrying.
///
/// # Errors
///
/// Returns the last error once all attempts are spent.
pub async fn retry_with_backoff<T, E, F, Fut>(policy: &RetryPolicy, operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    retry_if(policy, operation, |_| true).await
}

/// Run `operation`, retrying only while `should_retry` approves the failure.
///
/// # Errors
///
/// Returns the first non-retryable error, or the last error once all
/// attempts are spent.
pub async fn retry_if<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    mut operation: F,
    should_retry: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
    P: Fn(&E) -> bool,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!(attempt, "operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if attempt < policy.max_retries && should_retry(&err) => {
                let delay = policy.delay_for_attempt(attempt);
                warn!(
                    attempt = attempt + 1,
                    max_retries = policy.max_retries,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "retrying after failure"
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
