//! Transport subsystem.
//!
//! # Data Flow
//! ```text
//! pipeline (one attempt)
//!     → Transport::send(ApiRequest)
//!         HttpTransport: reqwest call against the configured base URL
//!         PlaceholderTransport: fixed demo payloads, no network
//!     → RawResponse { status, body, rate-limit headers }
//! ```
//!
//! # Design Decisions
//! - The strategy is chosen once, when the client is built; nothing
//!   downstream knows which one is active
//! - A transport performs exactly one call: no retries, no timeout of its
//!   own (the pipeline races it against the deadline)

pub mod http;
pub mod placeholder;

use futures_util::future::BoxFuture;
use serde::Serialize;

use crate::api::ApiRequest;
use crate::error::ApiResult;
use crate::rate_limit::RateLimitHeaders;

pub use http::HttpTransport;
pub use placeholder::PlaceholderTransport;

/// Which strategy a client was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Http,
    Placeholder,
    Custom,
}

/// Whatever came back from one call, before classification.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
    pub rate_limit: Option<RateLimitHeaders>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues a single call.
///
/// Errors are reserved for calls that produced no response at all; a
/// non-2xx status is still `Ok`.
pub trait Transport: Send + Sync {
    fn send<'a>(&'a self, request: &'a ApiRequest) -> BoxFuture<'a, ApiResult<RawResponse>>;
}
