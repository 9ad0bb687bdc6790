//! Error taxonomy for the API client.

use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by the client's typed operations.
///
/// `Clone` because a single pipeline execution may be shared by several
/// identical in-flight callers, each of which receives the same outcome.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// No response was obtained (connection refused, reset, DNS failure).
    #[error("network error: {message}")]
    Network { message: String },

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        message: String,
        details: Option<Value>,
    },

    /// The per-call timer fired before the transport completed.
    #[error("request timed out after {after_ms} ms")]
    Timeout { after_ms: u64 },

    /// The client-wide abort signal fired while the call was in flight.
    #[error("request aborted")]
    Aborted,

    /// Malformed input, rejected before touching the network.
    #[error("validation error: {0}")]
    Validation(String),

    /// The request was still queued when the queue was cancelled.
    #[error("queued request cancelled")]
    QueueCancelled,

    /// A 2xx body that does not match the endpoint's payload type.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The client has been destroyed.
    #[error("client destroyed")]
    Destroyed,
}

impl ApiError {
    /// Whether a retry may succeed where this attempt failed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Network { .. } => true,
            ApiError::Http { status, .. } => is_retryable_status(*status),
            ApiError::Timeout { .. }
            | ApiError::Aborted
            | ApiError::Validation(_)
            | ApiError::QueueCancelled
            | ApiError::Decode(_)
            | ApiError::Destroyed => false,
        }
    }

    /// HTTP status for `Http` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// 429 and 408 are transient, as is every 5xx. Everything else is final.
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 429) || status >= 500
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Network {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// Result type for client operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        for status in [400, 401, 403, 404, 422] {
            assert!(!is_retryable_status(status), "{status} must be terminal");
        }
        for status in [408, 429, 500, 502, 503, 504] {
            assert!(is_retryable_status(status), "{status} must be retryable");
        }
    }

    #[test]
    fn test_terminal_variants() {
        assert!(ApiError::Network { message: "reset".into() }.is_retryable());
        assert!(!ApiError::Timeout { after_ms: 10 }.is_retryable());
        assert!(!ApiError::Aborted.is_retryable());
        assert!(!ApiError::QueueCancelled.is_retryable());
        assert!(!ApiError::Validation("bad".into()).is_retryable());
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::Http {
            status: 404,
            message: "Not found".into(),
            details: None,
        };
        assert_eq!(err.to_string(), "HTTP 404: Not found");
        assert_eq!(err.status(), Some(404));

        let err = ApiError::Timeout { after_ms: 250 };
        assert_eq!(err.to_string(), "request timed out after 250 ms");
    }
}
