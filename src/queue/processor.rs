//! The single worker draining the request queue.

use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::time;

use crate::client::pipeline::Pipeline;
use crate::observability::millis;
use crate::queue::RequestQueue;

/// Pulls one request at a time while the rate limiter admits calls.
pub struct QueueProcessor {
    queue: Arc<RequestQueue>,
    pipeline: Arc<Pipeline>,
}

impl QueueProcessor {
    pub fn new(queue: Arc<RequestQueue>, pipeline: Arc<Pipeline>) -> Self {
        Self { queue, pipeline }
    }

    /// Run until shutdown. Anything still queued then is cancelled.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        loop {
            if self.queue.is_empty() {
                tokio::select! {
                    _ = self.queue.available() => continue,
                    _ = shutdown.recv() => break,
                }
            }

            if let Some(reopens_at) = self.pipeline.limiter().blocked_until() {
                tracing::debug!(
                    queued = self.queue.len(),
                    wait_ms = millis(reopens_at.saturating_duration_since(time::Instant::now())),
                    "Queue waiting for rate limit reset"
                );
                tokio::select! {
                    _ = self.pipeline.limiter().wait_until_open() => {}
                    _ = shutdown.recv() => break,
                }
                continue;
            }

            let Some(queued) = self.queue.pop() else {
                continue;
            };
            tracing::debug!(
                id = %queued.id,
                priority = ?queued.priority,
                waited_ms = millis(queued.enqueued_at.elapsed()),
                "Dequeued request"
            );
            let result = self.pipeline.execute(&queued.request).await;
            queued.resolve(result);
        }

        let cancelled = self.queue.close();
        tracing::debug!(cancelled, "Queue processor stopped");
    }
}
