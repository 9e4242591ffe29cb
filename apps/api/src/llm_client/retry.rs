//! Retry policy for collaborator calls.
//!
//! A single call attempt reports a tagged [`CallOutcome`]; [`run_with_retry`]
//! owns the loop, the backoff, and the decision to give up.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use super::LlmError;

/// Fixed attempt cap with linearly increasing backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Values below 1 are treated as 1.
    pub max_attempts: u32,
    /// Delay after the first failed attempt; the n-th retry waits `n * base_delay`.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

/// Result of one attempt against a collaborator.
#[derive(Debug)]
pub enum CallOutcome<T> {
    Success(T),
    /// Transient failure (rate limit, overload, transport). Worth another attempt.
    Retryable(LlmError),
    /// Failure that another attempt will not fix.
    Terminal(LlmError),
}

/// Runs `attempt_fn` until it succeeds, fails terminally, or the policy's
/// attempt cap is reached. Exhausting the cap yields `LlmError::RateLimited`.
pub async fn run_with_retry<T, F, Fut>(policy: &RetryPolicy, mut attempt_fn: F) -> Result<T, LlmError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = CallOutcome<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        match attempt_fn(attempt).await {
            CallOutcome::Success(value) => return Ok(value),
            CallOutcome::Terminal(err) => return Err(err),
            CallOutcome::Retryable(err) if attempt >= max_attempts => {
                warn!("LLM call failed on final attempt {attempt}/{max_attempts}: {err}");
                return Err(LlmError::RateLimited {
                    attempts: attempt,
                    last: err.to_string(),
                });
            }
            CallOutcome::Retryable(err) => {
                let delay = policy.delay_after(attempt);
                warn!(
                    "LLM call attempt {}/{} failed ({}), retrying after {}ms...",
                    attempt,
                    max_attempts,
                    err,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}
