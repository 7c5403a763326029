//! Retry policy with exponential backoff.
//!
//! One combinator serves the two places the pipeline retries: per-turn
//! recognition (bounded attempts with growing delay) and the diarization
//! self-heal (two immediate attempts with a re-conversion in between).

use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Bounded retry schedule.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Whether failed attempts wait before the next one.
    backoff: bool,
}

impl RetryPolicy {
    /// Exponential backoff: `2^attempt` seconds plus up to one second of
    /// random jitter between attempts.
    pub fn exponential(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff: true,
        }
    }

    /// Retries without any delay between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff: false,
        }
    }

    /// Delay before the attempt following `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        if !self.backoff {
            return Duration::ZERO;
        }
        let base = Duration::from_secs(1u64 << attempt.min(16));
        let jitter = Duration::from_millis(rand::rng().random_range(0..1000));
        base + jitter
    }
}

/// Run `op` until it succeeds or the policy's attempts are exhausted.
///
/// `op` receives the 1-based attempt number; the last attempt's error is
/// returned verbatim.
pub async fn retry<T, Op, Fut>(policy: &RetryPolicy, mut op: Op) -> crate::error::Result<T>
where
    Op: FnMut(u32) -> Fut,
    Fut: Future<Output = crate::error::Result<T>>,
{
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= policy.max_attempts => return Err(e),
            Err(e) => {
                let delay = policy.delay_after(attempt);
                debug!(
                    "Attempt {}/{} failed ({}), retrying in {:?}",
                    attempt, policy.max_attempts, e, delay
                );
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TalerError;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_succeeds_on_later_attempt() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::immediate(5);

        let result = retry(&policy, |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 3 {
                    Err(TalerError::Recognition("transient".into()))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausts_attempts_and_returns_last_error() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::immediate(2);

        let result: crate::error::Result<()> = retry(&policy, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(TalerError::Recognition("always".into())) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_exponential_delay_grows() {
        let policy = RetryPolicy::exponential(5);
        let first = policy.delay_after(1);
        let fourth = policy.delay_after(4);
        assert!(first >= Duration::from_secs(2));
        assert!(first < Duration::from_secs(4));
        assert!(fourth >= Duration::from_secs(16));
        assert!(fourth < Duration::from_secs(18));
    }

    #[test]
    fn test_immediate_has_no_delay() {
        let policy = RetryPolicy::immediate(2);
        assert_eq!(policy.delay_after(1), Duration::ZERO);
    }
}
