//! Queued request entries and their ordering.

use std::cmp::Ordering;
use tokio::sync::oneshot;
use tokio::time::Instant;
use uuid::Uuid;

use crate::api::{ApiRequest, Priority};
use crate::error::{ApiError, ApiResult};
use crate::client::pipeline::Executed;

/// A call waiting for admission.
///
/// Consumed by `resolve`, so it is settled at most once; if it is dropped
/// unresolved, the waiting caller sees `QueueCancelled`.
#[derive(Debug)]
pub struct QueuedRequest {
    pub id: Uuid,
    pub request: ApiRequest,
    pub priority: Priority,
    pub enqueued_at: Instant,
    /// Arrival order; breaks ties within a priority.
    pub(crate) seq: u64,
    responder: oneshot::Sender<ApiResult<Executed>>,
}

impl QueuedRequest {
    pub(crate) fn new(
        request: ApiRequest,
        priority: Priority,
        seq: u64,
    ) -> (Self, oneshot::Receiver<ApiResult<Executed>>) {
        let (responder, rx) = oneshot::channel();
        let queued = Self {
            id: Uuid::new_v4(),
            request,
            priority,
            enqueued_at: Instant::now(),
            seq,
            responder,
        };
        (queued, rx)
    }

    /// Hand the outcome to the waiting caller.
    pub fn resolve(self, result: ApiResult<Executed>) {
        if self.responder.send(result).is_err() {
            tracing::debug!(id = %self.id, "Queued caller went away before resolution");
        }
    }

    pub fn reject(self, error: ApiError) {
        self.resolve(Err(error));
    }
}

// Max-heap order: higher priority first, then lower sequence number first.
impl Ord for QueuedRequest {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueuedRequest {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueuedRequest {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl Eq for QueuedRequest {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BinaryHeap;

    #[test]
    fn test_priority_then_fifo() {
        let mut heap = BinaryHeap::new();
        let entries = [
            (Priority::Low, 0),
            (Priority::Normal, 1),
            (Priority::High, 2),
            (Priority::Normal, 3),
            (Priority::High, 4),
        ];
        for (priority, seq) in entries {
            heap.push(QueuedRequest::new(ApiRequest::me(), priority, seq).0);
        }

        let order: Vec<u64> = std::iter::from_fn(|| heap.pop().map(|q| q.seq)).collect();
        assert_eq!(order, vec![2, 4, 1, 3, 0]);
    }

    #[tokio::test]
    async fn test_drop_unresolved_is_observable() {
        let (queued, rx) = QueuedRequest::new(ApiRequest::me(), Priority::Normal, 0);
        drop(queued);
        assert!(rx.await.is_err());
    }
}
