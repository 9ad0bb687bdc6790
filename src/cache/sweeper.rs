//! Periodic expiry sweep.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time;

use crate::cache::store::ResponseCache;

/// Background task removing expired entries on a fixed interval, so memory
/// stays bounded even when entries are never read again.
pub struct CacheSweeper<T> {
    cache: Arc<ResponseCache<T>>,
    interval: Duration,
}

impl<T: Clone + Send + Sync + 'static> CacheSweeper<T> {
    pub fn new(cache: Arc<ResponseCache<T>>, interval: Duration) -> Self {
        Self { cache, interval }
    }

    /// Run until the shutdown signal fires or its sender is dropped.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = time::interval_at(time::Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = self.cache.sweep();
                    if removed > 0 {
                        tracing::debug!(removed, remaining = self.cache.len(), "Cache sweep");
                    }
                }
                _ = shutdown.recv() => {
                    tracing::debug!("Cache sweeper stopping");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::store::EntryMetadata;
    use uuid::Uuid;

    fn meta() -> EntryMetadata {
        EntryMetadata {
            request_id: Uuid::new_v4(),
            response_time: Duration::ZERO,
            rate_limit: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeps_without_reads() {
        let cache = Arc::new(ResponseCache::new());
        cache.set("a", 1u8, Duration::from_secs(30), meta());
        cache.set("b", 2u8, Duration::from_secs(300), meta());

        let (tx, rx) = broadcast::channel(1);
        let handle = tokio::spawn(CacheSweeper::new(cache.clone(), Duration::from_secs(60)).run(rx));

        time::sleep(Duration::from_secs(61)).await;
        assert_eq!(cache.len(), 1);

        tx.send(()).unwrap();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_when_sender_dropped() {
        let cache: Arc<ResponseCache<u8>> = Arc::new(ResponseCache::new());
        let (tx, rx) = broadcast::channel::<()>(1);
        let handle = tokio::spawn(CacheSweeper::new(cache, Duration::from_secs(60)).run(rx));
        drop(tx);
        handle.await.unwrap();
    }
}
