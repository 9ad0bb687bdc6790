//! Retry logic.
//!
//! # Responsibilities
//! - Classify a failure as retryable or terminal
//! - Run an operation in a bounded loop with exponential backoff
//! - Stop immediately when the abort signal fires
//!
//! # Classification
//! - 400, 401, 403, 404, 422 (and any other 4xx but 408/429): terminal
//! - 408, 429, 5xx: retryable within the attempt budget
//! - Network failures: retryable within the attempt budget
//! - Timeout or abort: terminal

use std::future::Future;
use std::time::Duration;

use crate::config::RetryConfig;
use crate::error::{ApiError, ApiResult};
use crate::lifecycle::AbortSignal;
use crate::observability::{metrics, millis};
use crate::resilience::backoff::calculate_backoff;
use crate::resilience::timeouts;

/// Attempt budget and backoff base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed after the first attempt.
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Whether to retry after attempt number `attempt` (1-based) failed.
    pub fn should_retry(&self, error: &ApiError, attempt: u32) -> bool {
        attempt <= self.max_retries && error.is_retryable()
    }

    /// Delay before the retry that follows failed attempt `attempt`.
    pub fn next_delay(&self, attempt: u32) -> Duration {
        calculate_backoff(attempt, self.base_delay)
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(config.attempts, Duration::from_millis(config.base_delay_ms))
    }
}

fn reason(error: &ApiError) -> &'static str {
    match error {
        ApiError::Network { .. } => "network",
        ApiError::Http { status: 429, .. } => "rate_limited",
        ApiError::Http { status: 408, .. } => "request_timeout",
        ApiError::Http { .. } => "server_error",
        _ => "other",
    }
}

/// Run `operation` until it succeeds, fails terminally, exhausts the budget
/// or `abort` fires. `operation` receives the 1-based attempt number.
pub async fn retry_with_backoff<F, Fut, T>(
    policy: &RetryPolicy,
    abort: &AbortSignal,
    mut operation: F,
) -> ApiResult<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = ApiResult<T>>,
{
    let mut attempt = 1;
    loop {
        let error = match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    tracing::debug!(attempt, "Request succeeded after retry");
                }
                return Ok(value);
            }
            Err(error) => error,
        };

        if !error.is_retryable() {
            tracing::debug!(attempt, error = %error, "Terminal error, not retrying");
            return Err(error);
        }
        if !policy.should_retry(&error, attempt) {
            tracing::warn!(
                attempts = attempt,
                error = %error,
                "Retry budget exhausted"
            );
            return Err(error);
        }

        let delay = policy.next_delay(attempt);
        metrics::record_retry(reason(&error));
        tracing::debug!(
            attempt,
            delay_ms = millis(delay),
            error = %error,
            "Retrying after backoff"
        );
        timeouts::sleep(delay, abort).await?;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::AbortController;
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    fn http(status: u16) -> ApiError {
        ApiError::Http {
            status,
            message: String::new(),
            details: None,
        }
    }

    #[test]
    fn test_should_retry_budget() {
        let policy = RetryPolicy::new(2, Duration::from_millis(10));
        assert!(policy.should_retry(&http(503), 1));
        assert!(policy.should_retry(&http(503), 2));
        assert!(!policy.should_retry(&http(503), 3));
        assert!(!policy.should_retry(&http(404), 1));
        assert!(policy.should_retry(&ApiError::Network { message: "dns".into() }, 1));
        assert!(!policy.should_retry(&ApiError::Timeout { after_ms: 1 }, 1));
    }

    #[test]
    fn test_from_config() {
        let policy = RetryPolicy::from(&RetryConfig {
            attempts: 4,
            base_delay_ms: 250,
        });
        assert_eq!(policy.max_retries, 4);
        assert_eq!(policy.next_delay(3), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_delay_sequence() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100));
        let controller = AbortController::new();
        let abort = controller.signal();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let start = Instant::now();

        let result: ApiResult<()> = retry_with_backoff(&policy, &abort, |_| {
            calls.lock().unwrap().push(start.elapsed());
            async { Err(http(503)) }
        })
        .await;

        assert!(matches!(result, Err(ApiError::Http { status: 503, .. })));
        let calls = calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![
                Duration::ZERO,
                Duration::from_millis(100),
                Duration::from_millis(300),
                Duration::from_millis(700),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_single_attempt() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100));
        let controller = AbortController::new();
        let abort = controller.signal();
        let start = Instant::now();
        let mut calls = 0;

        let result: ApiResult<()> = retry_with_backoff(&policy, &abort, |_| {
            calls += 1;
            async { Err(http(401)) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls, 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failures() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10));
        let controller = AbortController::new();
        let abort = controller.signal();

        let result = retry_with_backoff(&policy, &abort, |attempt| async move {
            if attempt < 3 {
                Err(http(429))
            } else {
                Ok(attempt)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_during_backoff() {
        let policy = RetryPolicy::new(5, Duration::from_secs(10));
        let controller = AbortController::new();
        let abort = controller.signal();
        let mut calls = 0;

        let run = retry_with_backoff(&policy, &abort, |_| {
            calls += 1;
            async { Err::<(), _>(ApiError::Network { message: "reset".into() }) }
        });
        let aborter = async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            controller.abort();
        };
        let (result, _) = tokio::join!(run, aborter);

        assert!(matches!(result, Err(ApiError::Aborted)));
        assert_eq!(calls, 1);
    }
}
