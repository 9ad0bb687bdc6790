//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! destroy() / last client handle dropped (shutdown.rs):
//!     Shutdown::trigger → cache sweeper and queue processor exit
//!
//! abort() / destroy() (abort.rs):
//!     AbortController::abort → every in-flight transport call and backoff
//!     wait stops with ApiError::Aborted
//! ```
//!
//! # Design Decisions
//! - Shutdown is a broadcast channel; dropping the sender counts as firing
//! - Abort is a watch generation counter; a signal only reacts to aborts
//!   issued after it was taken, so later calls are unaffected

pub mod abort;
pub mod shutdown;

pub use abort::{AbortController, AbortSignal};
pub use shutdown::Shutdown;
