//! One request, end to end: transport, timeout, retries, rate limit update.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

use crate::api::{ApiRequest, ErrorBody};
use crate::error::{ApiError, ApiResult};
use crate::lifecycle::{AbortController, AbortSignal};
use crate::observability::{metrics, millis};
use crate::rate_limit::RateLimiter;
use crate::resilience::{retry_with_backoff, timeouts, RetryPolicy};
use crate::transport::{RawResponse, Transport};

/// A successful response plus what the cache records about it.
#[derive(Debug, Clone)]
pub struct Executed {
    pub request_id: Uuid,
    pub response: RawResponse,
    pub elapsed: Duration,
}

/// Shared by direct callers and the queue processor.
pub struct Pipeline {
    transport: Arc<dyn Transport>,
    limiter: RateLimiter,
    retry: RetryPolicy,
    timeout: Duration,
    abort: AbortController,
}

impl Pipeline {
    pub fn new(
        transport: Arc<dyn Transport>,
        limiter: RateLimiter,
        retry: RetryPolicy,
        timeout: Duration,
    ) -> Self {
        Self {
            transport,
            limiter,
            retry,
            timeout,
            abort: AbortController::new(),
        }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Abort every call currently inside `execute`.
    pub fn abort_in_flight(&self) {
        let listening = self.abort.abort();
        tracing::debug!(listening, "Abort signalled to in-flight requests");
    }

    /// Run `request` until success, a terminal error, an exhausted retry
    /// budget or an abort. Only 2xx responses are `Ok`.
    ///
    /// Every attempt, retries included, first waits for the rate limit gate.
    pub async fn execute(&self, request: &ApiRequest) -> ApiResult<Executed> {
        let abort = self.abort.signal();
        let request_id = Uuid::new_v4();
        let started = Instant::now();

        let response = retry_with_backoff(&self.retry, &abort, |attempt| {
            let abort = &abort;
            async move {
                self.admitted(abort).await?;
                tracing::debug!(%request_id, attempt, path = %request.path, "Sending request");
                let attempt_started = Instant::now();
                let outcome = timeouts::race(self.timeout, abort, self.transport.send(request)).await;
                self.settle(outcome, attempt_started.elapsed())
            }
        })
        .await?;

        Ok(Executed {
            request_id,
            response,
            elapsed: started.elapsed(),
        })
    }

    /// Wait until the limiter admits a call, unless `abort` fires first.
    async fn admitted(&self, abort: &AbortSignal) -> ApiResult<()> {
        if let Some(reopens_at) = self.limiter.blocked_until() {
            tracing::debug!(
                wait_ms = millis(reopens_at.saturating_duration_since(Instant::now())),
                "Holding attempt until rate limit reset"
            );
            tokio::select! {
                biased;
                _ = abort.fired() => return Err(ApiError::Aborted),
                _ = self.limiter.wait_until_open() => {}
            }
        }
        Ok(())
    }

    /// Record one attempt's outcome and turn non-2xx into an error.
    fn settle(&self, outcome: ApiResult<RawResponse>, elapsed: Duration) -> ApiResult<RawResponse> {
        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                metrics::record_request("error", elapsed);
                return Err(e);
            }
        };

        metrics::record_request(metrics::status_class(response.status), elapsed);
        if let Some(headers) = &response.rate_limit {
            self.limiter.update_from_headers(headers);
        }

        if response.is_success() {
            Ok(response)
        } else {
            Err(ErrorBody::into_error(response.status, &response.body))
        }
    }
}
