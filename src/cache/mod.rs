//! Response cache subsystem.
//!
//! # Data Flow
//! ```text
//! facade call
//!     → key.rs (method + URL + sorted query/headers/body)
//!     → store.rs get: fresh → return, expired → evict + miss
//!     → on miss, after a successful call: store.rs set(key, payload, ttl)
//!
//! sweeper.rs (one task per client, stopped on destroy)
//!     → store.rs sweep every interval
//! ```
//!
//! # Design Decisions
//! - In-memory only; nothing survives the process
//! - Two eviction paths: lazy on read, periodic sweep for unread entries

pub mod key;
pub mod store;
pub mod sweeper;

pub use key::cache_key;
pub use store::{CacheEntry, CacheEntryInfo, CacheStats, EntryMetadata, ResponseCache};
pub use sweeper::CacheSweeper;
