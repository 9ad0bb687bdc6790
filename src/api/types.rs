//! Typed response payloads.
//!
//! Every payload keeps fields it does not model in an `extra` map so nothing
//! the server sends is lost on the way through the cache.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::api::request::Endpoint;
use crate::error::{ApiError, ApiResult};

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Node {
    /// Number of nodes in this subtree, including self.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Node::count).sum::<usize>()
    }
}

/// Component metadata keyed by node id in a file response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Style metadata keyed by node id in a file response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    pub key: String,
    pub name: String,
    pub style_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `GET /files/{key}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResponse {
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    pub last_modified: String,
    #[serde(default)]
    pub editor_type: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    pub version: String,
    pub document: Node,
    #[serde(default)]
    pub components: HashMap<String, Component>,
    #[serde(default)]
    pub component_sets: HashMap<String, Component>,
    #[serde(default)]
    pub styles: HashMap<String, Style>,
    #[serde(default)]
    pub schema_version: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `GET /me`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub handle: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub img_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Outcome of `validate_api_key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Error body of a non-2xx response: `{ "status", "err" }` or `{ "message" }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub err: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Build the `Http` error for a failed response, falling back to the
    /// status text when the body is not the documented shape.
    pub fn into_error(status: u16, body: &str) -> ApiError {
        let details = serde_json::from_str::<Value>(body).ok();
        let parsed = details
            .as_ref()
            .and_then(|v| ErrorBody::deserialize(v).ok())
            .unwrap_or_default();

        let message = parsed
            .message
            .or(parsed.err)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| status_text(status));

        ApiError::Http {
            status,
            message,
            details,
        }
    }
}

fn status_text(status: u16) -> String {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status))
}

/// A decoded payload as stored in the response cache.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiPayload {
    File(Box<FileResponse>),
    User(User),
}

impl ApiPayload {
    /// Decode a 2xx body according to the endpoint it came from.
    pub fn decode(endpoint: Endpoint, body: &str) -> ApiResult<Self> {
        Ok(match endpoint {
            Endpoint::File => ApiPayload::File(Box::new(serde_json::from_str(body)?)),
            Endpoint::Me => ApiPayload::User(serde_json::from_str(body)?),
        })
    }

    pub fn into_file(self) -> ApiResult<FileResponse> {
        match self {
            ApiPayload::File(file) => Ok(*file),
            other => Err(ApiError::Decode(format!("expected file payload, got {:?}", other.endpoint()))),
        }
    }

    pub fn into_user(self) -> ApiResult<User> {
        match self {
            ApiPayload::User(user) => Ok(user),
            other => Err(ApiError::Decode(format!("expected user payload, got {:?}", other.endpoint()))),
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        match self {
            ApiPayload::File(_) => Endpoint::File,
            ApiPayload::User(_) => Endpoint::Me,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILE_BODY: &str = r#"{
        "name": "Design System",
        "lastModified": "2024-01-01T00:00:00Z",
        "version": "123",
        "schemaVersion": 0,
        "linkAccess": "view",
        "document": {
            "id": "0:0",
            "name": "Document",
            "type": "DOCUMENT",
            "children": [
                {"id": "0:1", "name": "Page 1", "type": "CANVAS", "backgroundColor": {"r": 1, "g": 1, "b": 1, "a": 1}}
            ]
        },
        "styles": {
            "1:2": {"key": "abc", "name": "Primary", "styleType": "FILL"}
        }
    }"#;

    #[test]
    fn test_file_decode_keeps_unknown_fields() {
        let payload = ApiPayload::decode(Endpoint::File, FILE_BODY).unwrap();
        let file = payload.into_file().unwrap();
        assert_eq!(file.name, "Design System");
        assert_eq!(file.document.count(), 2);
        assert_eq!(file.extra.get("linkAccess"), Some(&Value::from("view")));
        assert!(file.document.children[0].extra.contains_key("backgroundColor"));
        assert_eq!(file.styles["1:2"].style_type, "FILL");
    }

    #[test]
    fn test_decode_mismatch() {
        let err = ApiPayload::decode(Endpoint::Me, "{\"nope\": true}").unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[test]
    fn test_error_body_message() {
        let err = ErrorBody::into_error(403, r#"{"status": 403, "err": "Invalid token"}"#);
        match err {
            ApiError::Http { status, message, details } => {
                assert_eq!(status, 403);
                assert_eq!(message, "Invalid token");
                assert!(details.is_some());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_error_body_fallback_to_status_text() {
        let err = ErrorBody::into_error(502, "<html>bad gateway</html>");
        match err {
            ApiError::Http { message, details, .. } => {
                assert_eq!(message, "Bad Gateway");
                assert!(details.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
