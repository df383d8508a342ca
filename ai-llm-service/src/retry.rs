//! Bounded retry with exponential backoff for calls to hosted services.
//!
//! Only failures classified as retryable ([`FailureKind::is_retryable`]) are
//! repeated; everything else is returned on the first occurrence.

use std::{fmt::Display, future::Future, time::Duration};

use tracing::warn;

use crate::error_handler::{AiLlmError, FailureKind};

/// Anything that can be classified into a [`FailureKind`].
pub trait Classify {
    /// Returns the failure category of this error.
    fn failure_kind(&self) -> FailureKind;
}

impl Classify for AiLlmError {
    fn failure_kind(&self) -> FailureKind {
        self.kind()
    }
}

/// Retry schedule: `initial_backoff * 2^(attempt-1)`, capped at `max_backoff`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one (values below 1 behave as 1).
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub initial_backoff: Duration,
    /// Upper bound for any single delay.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Delay to wait after the given failed attempt (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        self.initial_backoff
            .saturating_mul(1u32 << shift)
            .min(self.max_backoff)
    }
}

/// Runs `op` until it succeeds, fails with a non-retryable error, or the
/// attempt budget is spent. The last error is returned unchanged.
pub async fn retry_async<T, E, F, Fut>(
    policy: &RetryPolicy,
    op_name: &'static str,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Classify + Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(v) => return Ok(v),
            Err(err) if attempt < max_attempts && err.failure_kind().is_retryable() => {
                let delay = policy.backoff_for(attempt);
                warn!(
                    op = op_name,
                    attempt,
                    max_attempts,
                    kind = ?err.failure_kind(),
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "transient failure, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Debug)]
    struct Fake(FailureKind);

    impl Display for Fake {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "fake {:?}", self.0)
        }
    }

    impl Classify for Fake {
        fn failure_kind(&self) -> FailureKind {
            self.0
        }
    }

    fn fast() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(2),
        }
    }

    #[test]
    fn backoff_grows_and_caps() {
        let p = RetryPolicy {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(350),
        };
        assert_eq!(p.backoff_for(1), Duration::from_millis(100));
        assert_eq!(p.backoff_for(2), Duration::from_millis(200));
        assert_eq!(p.backoff_for(3), Duration::from_millis(350));
        assert_eq!(p.backoff_for(40), Duration::from_millis(350));
    }

    #[tokio::test]
    async fn transient_errors_are_retried_until_success() {
        let calls = AtomicU32::new(0);
        let out: Result<u32, Fake> = retry_async(&fast(), "test", || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 3 {
                    Err(Fake(FailureKind::TransientNetwork))
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(out.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn attempts_are_bounded() {
        let calls = AtomicU32::new(0);
        let out: Result<(), Fake> = retry_async(&fast(), "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(Fake(FailureKind::UpstreamQuota)) }
        })
        .await;
        assert!(out.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn permanent_errors_fail_fast() {
        let calls = AtomicU32::new(0);
        let out: Result<(), Fake> = retry_async(&fast(), "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(Fake(FailureKind::Configuration)) }
        })
        .await;
        assert!(matches!(out, Err(Fake(FailureKind::Configuration))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
