//! Rate limit state as last reported by the server.

use reqwest::header::HeaderMap;
use serde::Serialize;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::Instant;

pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";
pub const RESET_HEADER: &str = "x-ratelimit-reset";
pub const LIMIT_HEADER: &str = "x-ratelimit-limit";

/// Rate limit values carried by one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RateLimitHeaders {
    pub remaining: Option<u32>,
    /// Seconds since the Unix epoch.
    pub reset: Option<u64>,
    pub limit: Option<u32>,
}

impl RateLimitHeaders {
    /// Parse the `x-ratelimit-*` headers. `None` if none are present.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        fn parse<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
            headers.get(name)?.to_str().ok()?.trim().parse().ok()
        }

        let parsed = Self {
            remaining: parse(headers, REMAINING_HEADER),
            reset: parse(headers, RESET_HEADER),
            limit: parse(headers, LIMIT_HEADER),
        };
        if parsed == Self::default() {
            None
        } else {
            Some(parsed)
        }
    }
}

/// Point-in-time view of the limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitSnapshot {
    pub remaining: u32,
    /// Seconds since the Unix epoch.
    pub reset: u64,
    pub limit: u32,
    /// Whether a new request would have to queue right now.
    pub is_limited: bool,
    /// Requests currently waiting for admission.
    pub queue_length: usize,
}

/// Remaining quota, reset instant and ceiling.
///
/// The reset instant is kept both as the server's epoch seconds (for
/// reporting) and as a monotonic deadline (for admission and waiting).
#[derive(Debug, Clone)]
pub struct RateLimitState {
    remaining: u32,
    reset_epoch: u64,
    reset_at: Instant,
    limit: u32,
}

impl RateLimitState {
    /// Seed state for a fresh one-minute window.
    pub fn new(limit: u32, initial_remaining: u32) -> Self {
        let window = Duration::from_secs(60);
        Self {
            remaining: initial_remaining,
            reset_epoch: epoch_secs(SystemTime::now() + window),
            reset_at: Instant::now() + window,
            limit,
        }
    }

    /// A call may be issued if quota remains or the window has elapsed.
    ///
    /// An elapsed window counts as an implicit reset even if no fresh header
    /// has arrived yet.
    pub fn can_admit(&self, now: Instant) -> bool {
        self.remaining > 0 || now >= self.reset_at
    }

    /// When a closed gate reopens, or `None` if it is open.
    pub fn blocked_until(&self, now: Instant) -> Option<Instant> {
        if self.can_admit(now) {
            None
        } else {
            Some(self.reset_at)
        }
    }

    /// Overwrite with the server's view. Absent headers keep their field.
    pub fn update(&mut self, headers: &RateLimitHeaders, now: Instant, wall: SystemTime) {
        if let Some(remaining) = headers.remaining {
            self.remaining = remaining;
        }
        if let Some(limit) = headers.limit {
            self.limit = limit;
        }
        if let Some(reset) = headers.reset {
            self.reset_epoch = reset;
            let wall_secs = wall.duration_since(UNIX_EPOCH).unwrap_or_default();
            let until = Duration::from_secs(reset).saturating_sub(wall_secs);
            self.reset_at = now + until;
        }
    }

    pub fn snapshot(&self, now: Instant, queue_length: usize) -> RateLimitSnapshot {
        RateLimitSnapshot {
            remaining: self.remaining,
            reset: self.reset_epoch,
            limit: self.limit,
            is_limited: !self.can_admit(now),
            queue_length,
        }
    }
}

fn epoch_secs(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}
