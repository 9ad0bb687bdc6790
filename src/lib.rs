//! Client for the rate-limited design-file HTTP API.
//!
//! # Architecture Overview
//!
//! ```text
//!   get_file / get_user / validate_api_key
//!            │
//!            ▼
//!   ┌─────────────┐  hit   ┌──────────────────────────────────────────┐
//!   │   cache     │───────▶│ return                                   │
//!   └──────┬──────┘        └──────────────────────────────────────────┘
//!          │ miss
//!          ▼
//!   ┌─────────────┐ denied ┌─────────────┐
//!   │ rate_limit  │───────▶│   queue     │ priority, then FIFO
//!   └──────┬──────┘        └──────┬──────┘ single processor task
//!          │ admitted             │ gate reopens
//!          ▼                      ▼
//!   ┌────────────────────────────────────┐
//!   │ pipeline: transport + timeout      │──▶ rate_limit update from headers
//!   │           + resilience (retries)   │──▶ cache set (TTL)
//!   └────────────────────────────────────┘
//! ```
//!
//! A client built without a well-formed credential runs the same pipeline
//! over a placeholder transport and never touches the network.

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod queue;
pub mod rate_limit;
pub mod resilience;
pub mod transport;

pub use api::{FileOptions, FileResponse, Priority, User, ValidationResult};
pub use client::FigmaClient;
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult};
