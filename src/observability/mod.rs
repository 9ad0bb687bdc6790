//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! cache, limiter, queue, pipeline
//!     → tracing events (debug for pipeline steps, warn for give-ups)
//!     → metrics.rs (counters, gauges, histograms via the `metrics` facade)
//!
//! Consumers:
//!     → logging.rs installs a subscriber (binary only)
//!     → whatever metrics recorder the embedding application installs
//! ```
//!
//! # Design Decisions
//! - The library never installs a subscriber or recorder itself
//! - The credential is never part of a log field or metric label

pub mod logging;
pub mod metrics;

use std::time::Duration;

/// Whole milliseconds for log fields and stats, saturating at `u64::MAX`.
pub fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_saturates() {
        assert_eq!(millis(Duration::from_millis(1_500)), 1_500);
        assert_eq!(millis(Duration::MAX), u64::MAX);
    }
}
