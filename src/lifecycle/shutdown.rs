//! Stop signal for a client's background tasks.

use tokio::sync::broadcast;

/// Tells the cache sweeper and the queue processor of one client to exit.
///
/// Each task subscribes once when the client is built; `destroy()` fires it.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Receiver for one background task.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Signal every subscribed task. Returns how many were still running.
    pub fn trigger(&self) -> usize {
        self.tx.send(()).unwrap_or(0)
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_trigger_reaches_every_task() {
        let shutdown = Shutdown::new();
        let mut sweeper = shutdown.subscribe();
        let mut processor = shutdown.subscribe();
        assert_eq!(shutdown.receiver_count(), 2);

        assert_eq!(shutdown.trigger(), 2);
        assert!(sweeper.recv().await.is_ok());
        assert!(processor.recv().await.is_ok());
    }

    #[test]
    fn test_trigger_without_tasks() {
        let shutdown = Shutdown::new();
        assert_eq!(shutdown.trigger(), 0);
    }
}
