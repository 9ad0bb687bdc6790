//! Remote API surface: what can be requested and what comes back.

pub mod request;
pub mod types;

pub use request::{ApiRequest, Endpoint, FileOptions, Priority};
pub use types::{
    ApiPayload, Component, ErrorBody, FileResponse, Node, Style, User, ValidationResult,
};
