//! Rate limit tracking.
//!
//! # Data Flow
//! ```text
//! every real response
//!     → RateLimitHeaders::from_headers (x-ratelimit-remaining/reset/limit)
//!     → RateLimiter::update_from_headers (overwrite, wake every waiter)
//!
//! before every attempt, retries included
//!     → RateLimiter::wait_until_open (reset instant or fresh quota)
//!
//! before every call
//!     → RateLimiter::can_admit (remaining > 0 || now >= reset)
//!     → admitted: call directly; denied: enqueue
//! ```
//!
//! # Design Decisions
//! - The server's headers are authoritative; nothing is predicted locally
//! - An elapsed reset instant reopens the gate even without new headers
//! - No backoff here; the gate only admits or denies

pub mod limiter;
pub mod state;

pub use limiter::RateLimiter;
pub use state::{RateLimitHeaders, RateLimitSnapshot, RateLimitState};
