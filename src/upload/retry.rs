//! Bounded retry with exponential backoff and cooperative cancellation.

use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// How often and how patiently to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    /// Attempt `n` failing waits `base_delay * 2^n` before attempt `n + 1`
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

impl RetryPolicy {
    #[must_use]
    pub const fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Delay after the failed attempt number `attempt` (1-based).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Result of [`retry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryOutcome<T, E> {
    Success {
        value: T,
        attempts: u32,
    },
    /// Every attempt failed; `error` is the last one
    Failed {
        error: E,
        attempts: u32,
    },
    /// Cancelled before an attempt started, after a failure, or during backoff
    Cancelled {
        attempts: u32,
    },
}

impl<T, E> RetryOutcome<T, E> {
    /// Attempts actually made.
    pub const fn attempts(&self) -> u32 {
        match self {
            Self::Success { attempts, .. }
            | Self::Failed { attempts, .. }
            | Self::Cancelled { attempts } => *attempts,
        }
    }
}

/// Runs `op` until it succeeds, `policy.max_attempts` is reached, or `cancel` fires.
///
/// `op` receives the 1-based attempt number. `on_retry` is told about each failure
/// that will be retried, with the delay about to be slept. Cancellation is checked
/// before each attempt and after each failure, and interrupts the backoff sleep; an
/// attempt already running is allowed to finish.
pub async fn retry<T, E, Op, Fut, OnRetry>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    op: Op,
    on_retry: OnRetry,
) -> RetryOutcome<T, E>
where
    Op: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    OnRetry: FnMut(u32, &E, Duration),
{
    retry_if(policy, cancel, op, |_| true, on_retry).await
}

/// Like [`retry`], but an error for which `should_retry` returns `false` ends the
/// loop at once as [`RetryOutcome::Failed`].
pub async fn retry_if<T, E, Op, Fut, ShouldRetry, OnRetry>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    mut op: Op,
    should_retry: ShouldRetry,
    mut on_retry: OnRetry,
) -> RetryOutcome<T, E>
where
    Op: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    ShouldRetry: Fn(&E) -> bool,
    OnRetry: FnMut(u32, &E, Duration),
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        if cancel.is_cancelled() {
            return RetryOutcome::Cancelled {
                attempts: attempt - 1,
            };
        }

        let error = match op(attempt).await {
            Ok(value) => {
                return RetryOutcome::Success {
                    value,
                    attempts: attempt,
                };
            }
            Err(error) => error,
        };

        if cancel.is_cancelled() {
            return RetryOutcome::Cancelled { attempts: attempt };
        }
        if attempt >= max_attempts || !should_retry(&error) {
            return RetryOutcome::Failed {
                error,
                attempts: attempt,
            };
        }

        let delay = policy.delay_for(attempt);
        on_retry(attempt, &error, delay);
        debug!(attempt, ?delay, "Attempt failed, backing off");

        tokio::select! {
            () = cancel.cancelled() => {
                return RetryOutcome::Cancelled { attempts: attempt };
            }
            () = tokio::time::sleep(delay) => {}
        }
        attempt += 1;
    }
}
