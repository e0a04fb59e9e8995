//! Bounded exponential backoff for record store reads.
//!
//! Only store-level failures are retried. A query that succeeds with zero rows is a
//! terminal "not found" and is returned to the caller on the first attempt.

use std::future::Future;
use std::time::Duration;

use log::*;
use sea_orm::DbErr;

/// Fixed-count retry policy with exponential backoff and no jitter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// A policy that never waits between attempts.
    pub fn immediate(max_retries: u32) -> Self {
        Self::new(max_retries, Duration::ZERO)
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Delay before retry number `n_past_retries + 1`: base, 2x base, 4x base, ...
    pub fn delay_for(&self, n_past_retries: u32) -> Duration {
        self.base_delay.saturating_mul(2_u32.saturating_pow(n_past_retries))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

/// Runs `operation`, retrying store errors according to `policy`.
///
/// The last store error is returned once the retries are exhausted.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> Result<T, DbErr>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DbErr>>,
{
    let mut n_past_retries = 0;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if n_past_retries < policy.max_retries => {
                let delay = policy.delay_for(n_past_retries);
                warn!(
                    "{operation_name} failed (attempt {}/{}), retrying in {}ms: {err}",
                    n_past_retries + 1,
                    policy.max_retries + 1,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                n_past_retries += 1;
            }
            Err(err) => {
                error!(
                    "{operation_name} failed after {} attempts: {err}",
                    n_past_retries + 1
                );
                return Err(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn default_policy_waits_one_two_then_four_seconds() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.max_retries(), 3);
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let counter = AtomicU32::new(0);
        let attempts = &counter;

        let result = with_retry(&RetryPolicy::immediate(3), "test read", move || async move {
            if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(DbErr::Custom("connection reset".to_string()))
            } else {
                Ok(42)
            }
        })
        .await;

        assert_eq!(result, Ok(42));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let counter = AtomicU32::new(0);
        let attempts = &counter;

        let result: Result<(), DbErr> =
            with_retry(&RetryPolicy::immediate(3), "test read", move || async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(DbErr::Custom("database unavailable".to_string()))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn empty_results_are_not_retried() {
        let counter = AtomicU32::new(0);
        let attempts = &counter;

        let result: Result<Option<u32>, DbErr> =
            with_retry(&RetryPolicy::immediate(3), "test read", move || async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Ok(None)
            })
            .await;

        assert_eq!(result, Ok(None));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
