//! Centralized retry policy for inference calls.
//!
//! One parameterized policy replaces per-call-site retry loops: bounded
//! attempts with exponential backoff and jitter for unavailable or
//! rate-limited calls, and at most one extra attempt after a timeout.
//! No retry ever crosses the chunk boundary.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use super::ClassifyError;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts for `Unavailable`/`RateLimited` failures.
    pub max_attempts: u32,
    /// Extra attempts granted after a `Timeout`.
    pub timeout_attempts: u32,
    /// First backoff delay; doubles each attempt.
    pub base_delay: Duration,
    /// Backoff ceiling before jitter.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            timeout_attempts: 1,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(4),
        }
    }
}

impl RetryPolicy {
    /// Same attempt budget, zero delays. For tests and callers that manage
    /// pacing themselves.
    pub fn immediate() -> Self {
        Self {
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Exponential backoff for the given 0-based attempt, capped, plus
    /// uniform jitter of up to half the delay.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exp = self
            .base_delay
            .saturating_mul(1u32 << attempt.min(16))
            .min(self.max_delay);
        if exp.is_zero() {
            return exp;
        }
        let jitter_ns = rand::thread_rng().gen_range(0..=exp.as_nanos() as u64 / 2);
        exp + Duration::from_nanos(jitter_ns)
    }
}

/// Drive `op` under the policy until it succeeds or the error's retry
/// budget is exhausted, sleeping the backoff delay between attempts.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T, ClassifyError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClassifyError>>,
{
    let mut attempt: u32 = 0;
    let mut timeouts: u32 = 0;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                let retry_allowed = match &error {
                    ClassifyError::Timeout => {
                        timeouts += 1;
                        timeouts <= policy.timeout_attempts
                    }
                    ClassifyError::Unavailable(_) | ClassifyError::RateLimited => {
                        attempt + 1 < policy.max_attempts
                    }
                };

                if !retry_allowed {
                    return Err(error);
                }

                let delay = policy.backoff_delay(attempt);
                tracing::warn!(
                    attempt = attempt + 1,
                    error = %error,
                    delay_ms = delay.as_millis() as u64,
                    "Classification call failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
