//! TTL response cache.

use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use uuid::Uuid;

use crate::observability::{metrics, millis};
use crate::rate_limit::RateLimitHeaders;

/// How an entry came to be.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryMetadata {
    /// Id of the request that produced the payload.
    pub request_id: Uuid,
    /// Transport latency of that request.
    pub response_time: Duration,
    /// Rate limit headers seen on that response, if any.
    pub rate_limit: Option<RateLimitHeaders>,
}

/// A cached payload with its expiry.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub fetched_at: Instant,
    pub expires_at: Instant,
    pub metadata: EntryMetadata,
}

impl<T> CacheEntry<T> {
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Per-entry line of `CacheStats`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheEntryInfo {
    pub key: String,
    pub age_ms: u64,
    pub expires_in_ms: u64,
}

/// Cache summary for callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    /// Hits over lookups; 0 before any lookup.
    pub hit_rate: f64,
    pub entries: Vec<CacheEntryInfo>,
}

/// A thread-safe key → payload cache with per-entry expiry.
///
/// Expired entries are removed lazily on `get` and eagerly by `sweep`.
pub struct ResponseCache<T> {
    inner: DashMap<String, CacheEntry<T>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<T: Clone> ResponseCache<T> {
    pub fn new() -> Self {
        Self {
            inner: DashMap::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Fresh value for `key`, or `None`.
    pub fn get(&self, key: &str) -> Option<T> {
        let now = Instant::now();
        if let Some(entry) = self.inner.get(key) {
            if !entry.is_expired(now) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                metrics::record_cache_lookup(true);
                return Some(entry.value.clone());
            }
        }

        if self.inner.remove_if(key, |_, e| e.is_expired(now)).is_some() {
            tracing::debug!(key, "Evicted expired cache entry on read");
            metrics::record_cache_size(self.inner.len());
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        metrics::record_cache_lookup(false);
        None
    }

    /// Store `value` under `key` for `ttl`.
    pub fn set(&self, key: impl Into<String>, value: T, ttl: Duration, metadata: EntryMetadata) {
        let now = Instant::now();
        self.inner.insert(
            key.into(),
            CacheEntry {
                value,
                fetched_at: now,
                expires_at: now + ttl,
                metadata,
            },
        );
        metrics::record_cache_size(self.inner.len());
    }

    /// Full entry for `key`, expired or not. Does not count as a lookup.
    pub fn entry(&self, key: &str) -> Option<CacheEntry<T>> {
        self.inner.get(key).map(|r| r.value().clone())
    }

    /// Remove every expired entry. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let before = self.inner.len();
        self.inner.retain(|_, e| !e.is_expired(now));
        let removed = before.saturating_sub(self.inner.len());
        metrics::record_cache_size(self.inner.len());
        removed
    }

    /// Drop all entries and reset hit statistics.
    pub fn clear(&self) {
        self.inner.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        metrics::record_cache_size(0);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let hits = self.hits.load(Ordering::Relaxed);
        let lookups = hits + self.misses.load(Ordering::Relaxed);
        let hit_rate = if lookups == 0 {
            0.0
        } else {
            hits as f64 / lookups as f64
        };

        let mut entries: Vec<CacheEntryInfo> = self
            .inner
            .iter()
            .map(|r| CacheEntryInfo {
                key: r.key().clone(),
                age_ms: millis(now.saturating_duration_since(r.fetched_at)),
                expires_in_ms: millis(r.expires_at.saturating_duration_since(now)),
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));

        CacheStats {
            size: entries.len(),
            hit_rate,
            entries,
        }
    }
}

impl<T: Clone> Default for ResponseCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
