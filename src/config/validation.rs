//! Configuration validation.
//!
//! Serde handles syntax; this handles value ranges and URL shape. Every
//! problem is reported, not just the first. The credential is not checked
//! here: a malformed key selects demo mode rather than failing.

use url::Url;

use crate::config::schema::ClientConfig;

/// A single semantic problem in a config.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Validate a config, collecting all errors.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.api.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
        Ok(url) => errors.push(ValidationError::new(
            "api.base_url",
            format!("unsupported URL '{}'", url),
        )),
        Err(e) => errors.push(ValidationError::new(
            "api.base_url",
            format!("invalid URL '{}': {}", config.api.base_url, e),
        )),
    }

    let positive: [(&'static str, u64); 5] = [
        ("timeouts.request_ms", config.timeouts.request_ms),
        ("cache.ttl_ms", config.cache.ttl_ms),
        ("cache.sweep_interval_ms", config.cache.sweep_interval_ms),
        ("rate_limit.limit", u64::from(config.rate_limit.limit)),
        (
            "rate_limit.max_requests_per_minute",
            u64::from(config.rate_limit.max_requests_per_minute),
        ),
    ];
    for (field, value) in positive {
        if value == 0 {
            errors.push(ValidationError::new(field, "must be greater than zero"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
