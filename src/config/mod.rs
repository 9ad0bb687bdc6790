//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) or ClientConfig::default()
//!     → loader.rs (parse, fill credential from FIGMA_API_KEY)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → owned by the client, copied into each subsystem at construction
//! ```
//!
//! # Design Decisions
//! - Config is immutable once the client is built
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ApiConfig, CacheConfig, ClientConfig, ObservabilityConfig, RateLimitConfig, RetryConfig,
    TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
