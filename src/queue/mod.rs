//! Request queue subsystem.
//!
//! # Data Flow
//! ```text
//! facade call denied by the rate limiter
//!     → RequestQueue::enqueue(request, priority) → oneshot receiver
//!     → processor.rs (single worker):
//!         wait for work → wait for the gate → pop highest priority
//!         → pipeline.execute → resolve the caller's continuation
//!
//! abort()/destroy()
//!     → RequestQueue::cancel_all → every waiting caller gets QueueCancelled
//! ```
//!
//! # Design Decisions
//! - Strict priority, FIFO within a priority; no starvation guard
//! - One worker, so queued requests leave the queue in order
//! - The worker sleeps until the reset instant instead of polling

pub mod processor;
pub mod request;

use std::collections::BinaryHeap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::{oneshot, Notify};

use crate::api::{ApiRequest, Priority};
use crate::error::{ApiError, ApiResult};
use crate::observability::metrics;
use crate::client::pipeline::Executed;

pub use processor::QueueProcessor;
pub use request::QueuedRequest;

#[derive(Default)]
struct QueueState {
    heap: BinaryHeap<QueuedRequest>,
    next_seq: u64,
    closed: bool,
}

/// Calls waiting for the rate limiter to admit them.
#[derive(Default)]
pub struct RequestQueue {
    state: Mutex<QueueState>,
    available: Notify,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add a call. The receiver yields its outcome once it has been run or
    /// cancelled. A closed queue cancels immediately.
    pub fn enqueue(
        &self,
        request: ApiRequest,
        priority: Priority,
    ) -> oneshot::Receiver<ApiResult<Executed>> {
        let mut state = self.lock();
        let seq = state.next_seq;
        state.next_seq += 1;
        let (queued, rx) = QueuedRequest::new(request, priority, seq);

        if state.closed {
            queued.reject(ApiError::QueueCancelled);
            return rx;
        }

        tracing::debug!(
            id = %queued.id,
            path = %queued.request.path,
            priority = ?priority,
            depth = state.heap.len() + 1,
            "Request queued for rate limit"
        );
        state.heap.push(queued);
        metrics::record_queue_depth(state.heap.len());
        drop(state);

        self.available.notify_one();
        rx
    }

    /// Highest priority, earliest arrival.
    pub fn pop(&self) -> Option<QueuedRequest> {
        let mut state = self.lock();
        let next = state.heap.pop();
        metrics::record_queue_depth(state.heap.len());
        next
    }

    pub fn len(&self) -> usize {
        self.lock().heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().heap.is_empty()
    }

    /// Resolves once something has been enqueued since the last wake-up.
    pub async fn available(&self) {
        self.available.notified().await
    }

    /// Reject every waiting call with `QueueCancelled`. Returns the count.
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<QueuedRequest> = {
            let mut state = self.lock();
            let drained = std::mem::take(&mut state.heap).into_vec();
            metrics::record_queue_depth(0);
            drained
        };

        let count = drained.len();
        for queued in drained {
            queued.reject(ApiError::QueueCancelled);
        }
        if count > 0 {
            tracing::warn!(count, "Cancelled queued requests");
        }
        count
    }

    /// Cancel everything and refuse future work.
    pub fn close(&self) -> usize {
        self.lock().closed = true;
        self.cancel_all()
    }
}
