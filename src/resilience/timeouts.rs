//! Timeout and abort enforcement.
//!
//! Every transport call is raced against its deadline and the client's
//! abort signal. Whichever settles first wins; the losing future is dropped,
//! which cancels the underlying request.

use std::future::Future;
use std::time::Duration;

use crate::error::{ApiError, ApiResult};
use crate::lifecycle::AbortSignal;
use crate::observability::millis;

/// Run `fut` with a deadline, stopping early if `abort` fires.
pub async fn race<F, T>(deadline: Duration, abort: &AbortSignal, fut: F) -> ApiResult<T>
where
    F: Future<Output = ApiResult<T>>,
{
    tokio::select! {
        biased;
        _ = abort.fired() => Err(ApiError::Aborted),
        outcome = tokio::time::timeout(deadline, fut) => match outcome {
            Ok(result) => result,
            Err(_) => Err(ApiError::Timeout {
                after_ms: millis(deadline),
            }),
        },
    }
}

/// Sleep for `delay` unless `abort` fires first.
pub async fn sleep(delay: Duration, abort: &AbortSignal) -> ApiResult<()> {
    tokio::select! {
        biased;
        _ = abort.fired() => Err(ApiError::Aborted),
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}
