//! Metrics collection.
//!
//! # Metrics
//! - `figma_requests_total` (counter): transport attempts by outcome
//! - `figma_request_duration_seconds` (histogram): transport latency
//! - `figma_retries_total` (counter): retries scheduled
//! - `figma_cache_lookups_total` (counter): cache lookups by result
//! - `figma_cache_entries` (gauge): live cache entries
//! - `figma_queue_depth` (gauge): requests waiting for admission
//! - `figma_rate_limit_remaining` (gauge): last reported quota

use std::time::Duration;

pub fn record_request(outcome: &'static str, elapsed: Duration) {
    metrics::counter!("figma_requests_total", "outcome" => outcome).increment(1);
    metrics::histogram!("figma_request_duration_seconds").record(elapsed.as_secs_f64());
}

pub fn record_retry(reason: &'static str) {
    metrics::counter!("figma_retries_total", "reason" => reason).increment(1);
}

pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    metrics::counter!("figma_cache_lookups_total", "result" => result).increment(1);
}

pub fn record_cache_size(size: usize) {
    metrics::gauge!("figma_cache_entries").set(size as f64);
}

pub fn record_queue_depth(depth: usize) {
    metrics::gauge!("figma_queue_depth").set(depth as f64);
}

pub fn record_rate_limit_remaining(remaining: u32) {
    metrics::gauge!("figma_rate_limit_remaining").set(f64::from(remaining));
}

/// Outcome label for a finished transport attempt.
pub fn status_class(status: u16) -> &'static str {
    match status {
        200..=299 => "2xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}
