//! Shared admission gate.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::SystemTime;
use tokio::sync::Notify;
use tokio::time::{self, Instant};

use crate::config::RateLimitConfig;
use crate::observability::metrics;
use crate::rate_limit::state::{RateLimitHeaders, RateLimitSnapshot, RateLimitState};

/// Admission gate shared by direct callers and the queue processor.
pub struct RateLimiter {
    state: Mutex<RateLimitState>,
    changed: Notify,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            state: Mutex::new(RateLimitState::new(
                config.limit,
                config.max_requests_per_minute,
            )),
            changed: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RateLimitState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn can_admit(&self) -> bool {
        self.lock().can_admit(Instant::now())
    }

    /// When the gate reopens, or `None` if it is open now.
    pub fn blocked_until(&self) -> Option<Instant> {
        self.lock().blocked_until(Instant::now())
    }

    /// Apply headers from a real response and wake the queue processor.
    pub fn update_from_headers(&self, headers: &RateLimitHeaders) {
        {
            let mut state = self.lock();
            state.update(headers, Instant::now(), SystemTime::now());
            if let Some(remaining) = headers.remaining {
                metrics::record_rate_limit_remaining(remaining);
            }
        }
        tracing::debug!(
            remaining = ?headers.remaining,
            reset = ?headers.reset,
            limit = ?headers.limit,
            "Rate limit updated from headers"
        );
        self.changed.notify_waiters();
    }

    /// Resolves once the gate admits calls: either the reset instant passes
    /// or fresh headers report quota.
    pub async fn wait_until_open(&self) {
        loop {
            // Registered before the check so an update in between still wakes us.
            let changed = self.changed.notified();
            tokio::pin!(changed);
            changed.as_mut().enable();

            let Some(reopens_at) = self.blocked_until() else {
                return;
            };
            tokio::select! {
                _ = time::sleep_until(reopens_at) => {}
                _ = &mut changed => {}
            }
        }
    }

    pub fn snapshot(&self, queue_length: usize) -> RateLimitSnapshot {
        self.lock().snapshot(Instant::now(), queue_length)
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("state", &*self.lock())
            .finish()
    }
}
