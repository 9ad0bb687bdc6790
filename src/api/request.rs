//! Endpoint descriptors.
//!
//! An `ApiRequest` is the target of a call: method, path relative to the
//! base URL, query and extra headers. Maps are ordered so the cache key
//! derived from a request does not depend on insertion order.

use reqwest::Method;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::{ApiError, ApiResult};

/// Which endpoint a request targets, used to pick the payload decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    File,
    Me,
}

/// Queue priority for requests that cannot be admitted immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

/// A single call against the remote API.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub endpoint: Endpoint,
    pub method: Method,
    /// Path below the base URL, always starting with '/'.
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
}

impl ApiRequest {
    fn get(endpoint: Endpoint, path: String) -> Self {
        Self {
            endpoint,
            method: Method::GET,
            path,
            query: BTreeMap::new(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    /// `GET /files/{file_key}` with the given options as query parameters.
    pub fn file(file_key: &str, options: &FileOptions) -> ApiResult<Self> {
        let file_key = file_key.trim();
        if file_key.is_empty() {
            return Err(ApiError::Validation("file key is required".into()));
        }
        if file_key.contains('/') || file_key.contains('?') || file_key.contains('#') {
            return Err(ApiError::Validation(format!(
                "file key '{}' contains reserved characters",
                file_key
            )));
        }

        let mut request = Self::get(Endpoint::File, format!("/files/{}", file_key));
        options.apply(&mut request.query);
        Ok(request)
    }

    /// `GET /me`.
    pub fn me() -> Self {
        Self::get(Endpoint::Me, "/me".to_string())
    }
}

/// Optional parameters for fetching a file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileOptions {
    /// Specific version id to fetch.
    pub version: Option<String>,
    /// Restrict the document to these node ids.
    pub ids: Vec<String>,
    /// How deep into the document tree to traverse.
    pub depth: Option<u32>,
    /// Set to "paths" to export vector data.
    pub geometry: Option<String>,
    /// Plugin ids whose shared data should be included.
    pub plugin_data: Option<String>,
    /// Include branch metadata.
    pub branch_data: bool,
    /// Queue priority if the call cannot be admitted right away.
    pub priority: Priority,
}

impl FileOptions {
    fn apply(&self, query: &mut BTreeMap<String, String>) {
        if let Some(version) = &self.version {
            query.insert("version".into(), version.clone());
        }
        if !self.ids.is_empty() {
            query.insert("ids".into(), self.ids.join(","));
        }
        if let Some(depth) = self.depth {
            query.insert("depth".into(), depth.to_string());
        }
        if let Some(geometry) = &self.geometry {
            query.insert("geometry".into(), geometry.clone());
        }
        if let Some(plugin_data) = &self.plugin_data {
            query.insert("plugin_data".into(), plugin_data.clone());
        }
        if self.branch_data {
            query.insert("branch_data".into(), "true".into());
        }
    }
}
