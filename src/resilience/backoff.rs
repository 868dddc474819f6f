//! Exponential backoff executor.
//!
//! Runs a fallible async operation, sleeping `min(initial * 2^(n-1), max)`
//! before retry `n`. Only the last failure is returned to the caller; every
//! earlier one is handed to the retry observer.

use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Retry bounds for one invocation of [`retry_with_backoff`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. Total attempts = `max_retries + 1`.
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    /// Add up to 10% random jitter on top of the capped delay.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
            jitter: false,
        }
    }
}

impl RetryPolicy {
    /// Total number of attempts this policy allows.
    pub fn attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Capped exponential delay before retry `attempt` (1-indexed).
    pub fn base_delay_for(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let factor = 2u32.saturating_pow(attempt - 1);
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Delay actually slept before retry `attempt`, jitter included.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let delay = self.base_delay_for(attempt);
        if !self.jitter {
            return delay;
        }

        let jitter_range = delay.as_millis() as u64 / 10;
        if jitter_range == 0 {
            return delay;
        }
        delay + Duration::from_millis(rand::thread_rng().gen_range(0..jitter_range))
    }

    /// Upper bound on the wall-clock time of a full retry sequence when each
    /// attempt (and the single warm-up probe) may take `per_call_timeout`.
    pub fn worst_case_latency(&self, per_call_timeout: Duration) -> Duration {
        let calls = self.attempts() + u32::from(self.max_retries > 0);
        let waits = (1..=self.max_retries)
            .map(|attempt| {
                let delay = self.base_delay_for(attempt);
                if self.jitter {
                    delay + delay / 10
                } else {
                    delay
                }
            })
            .fold(Duration::ZERO, |total, delay| total.saturating_add(delay));

        per_call_timeout.saturating_mul(calls).saturating_add(waits)
    }
}

/// Run `operation` under `policy` without a retry observer.
pub async fn retry<T, E, Op, Fut>(policy: &RetryPolicy, operation: Op) -> Result<T, E>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    retry_with_backoff(policy, operation, |_, _, _| std::future::ready(())).await
}

/// Run `operation`, retrying failures with exponential backoff.
///
/// Before each retry `on_retry(attempt, &error, delay)` is awaited and only
/// then does the delay timer start, so observer latency adds to the delay.
/// The error of the final attempt is returned as-is.
pub async fn retry_with_backoff<T, E, Op, Fut, Obs, ObsFut>(
    policy: &RetryPolicy,
    mut operation: Op,
    mut on_retry: Obs,
) -> Result<T, E>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    Obs: FnMut(u32, &E, Duration) -> ObsFut,
    ObsFut: Future<Output = ()>,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if attempt >= policy.max_retries {
                    return Err(error);
                }
                attempt += 1;

                let delay = policy.delay_for(attempt);
                on_retry(attempt, &error, delay).await;
                tokio::time::sleep(delay).await;
            }
        }
    }
}
