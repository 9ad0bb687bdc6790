//! Client-wide cancellation of in-flight calls.

use tokio::sync::watch;

/// Fires an abort to every call currently listening.
///
/// Each abort bumps a generation counter. A signal remembers the generation
/// it was created at and fires once the counter moves past it, so calls
/// issued after an abort are unaffected and a signal can be shared freely
/// between the steps of one call.
#[derive(Debug)]
pub struct AbortController {
    tx: watch::Sender<u64>,
}

impl AbortController {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(0);
        Self { tx }
    }

    /// A signal for one call. Only aborts fired after this point reach it.
    pub fn signal(&self) -> AbortSignal {
        let rx = self.tx.subscribe();
        let generation = *rx.borrow();
        AbortSignal { rx, generation }
    }

    /// Abort every listening call. Returns how many signals were alive.
    pub fn abort(&self) -> usize {
        self.tx.send_modify(|generation| *generation += 1);
        self.tx.receiver_count()
    }
}

impl Default for AbortController {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-call view of the abort generation.
#[derive(Debug, Clone)]
pub struct AbortSignal {
    rx: watch::Receiver<u64>,
    generation: u64,
}

impl AbortSignal {
    pub fn is_fired(&self) -> bool {
        *self.rx.borrow() > self.generation
    }

    /// Resolves once an abort fires (or the controller is gone).
    pub async fn fired(&self) {
        let mut rx = self.rx.clone();
        let generation = self.generation;
        match rx.wait_for(|current| *current > generation).await {
            // Err: the controller was dropped, which also ends every call.
            Ok(_) | Err(_) => {}
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_abort_reaches_live_signals_only() {
        let controller = AbortController::new();
        let before = controller.signal();
        assert_eq!(controller.abort(), 1);
        assert!(before.is_fired());
        before.fired().await;

        let after = controller.signal();
        assert!(!after.is_fired());
        let pending = tokio::time::timeout(Duration::from_millis(20), after.fired()).await;
        assert!(pending.is_err(), "signal created after abort must not fire");
    }

    #[tokio::test]
    async fn test_clones_share_generation() {
        let controller = AbortController::new();
        let signal = controller.signal();
        let clone = signal.clone();
        controller.abort();
        signal.fired().await;
        clone.fired().await;
    }

    #[tokio::test]
    async fn test_dropped_controller_fires() {
        let controller = AbortController::new();
        let signal = controller.signal();
        drop(controller);
        signal.fired().await;
    }

    #[test]
    fn test_abort_without_listeners() {
        assert_eq!(AbortController::new().abort(), 0);
    }
}
