//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to the API:
//!     → timeouts.rs (race transport against deadline and abort signal)
//!     → On failure: retries.rs (classify, back off, try again)
//!     → backoff.rs (delay for retry n = base * 2^(n-1))
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every transport call has a deadline
//! - Retries are a bounded loop, never recursion
//! - Only network failures, 408, 429 and 5xx are retried
//! - A fired timeout or abort ends the loop at once

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use retries::{retry_with_backoff, RetryPolicy};
