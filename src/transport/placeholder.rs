//! Network-free demo transport.
//!
//! Selected when no well-formed credential is configured. Answers the known
//! endpoints with fixed payloads shaped exactly like the real ones, so the
//! rest of the pipeline (decode, cache, stats) runs unchanged.

use futures_util::future::{self, BoxFuture, FutureExt};
use serde_json::json;

use crate::api::{ApiRequest, Endpoint};
use crate::error::ApiResult;
use crate::transport::{RawResponse, Transport};

#[derive(Debug, Clone, Default)]
pub struct PlaceholderTransport;

impl PlaceholderTransport {
    pub fn new() -> Self {
        Self
    }

    fn respond(request: &ApiRequest) -> RawResponse {
        let body = match request.endpoint {
            Endpoint::Me => json!({
                "id": "demo-user",
                "handle": "Demo User",
                "email": "demo@example.com",
                "img_url": "",
            }),
            Endpoint::File => {
                let file_key = request.path.rsplit('/').next().unwrap_or_default();
                json!({
                    "name": format!("Demo File ({})", file_key),
                    "role": "viewer",
                    "lastModified": "1970-01-01T00:00:00Z",
                    "editorType": "figma",
                    "thumbnailUrl": "",
                    "version": "0",
                    "schemaVersion": 0,
                    "document": {
                        "id": "0:0",
                        "name": "Document",
                        "type": "DOCUMENT",
                        "children": [{
                            "id": "0:1",
                            "name": "Page 1",
                            "type": "CANVAS",
                            "children": [{
                                "id": "1:1",
                                "name": "Primary Button",
                                "type": "COMPONENT",
                                "fills": [{"type": "SOLID", "color": {"r": 0.2, "g": 0.4, "b": 1.0, "a": 1.0}}],
                            }],
                        }],
                    },
                    "components": {
                        "1:1": {"key": "demo-button", "name": "Primary Button", "description": "Placeholder component"}
                    },
                    "componentSets": {},
                    "styles": {
                        "2:1": {"key": "demo-primary", "name": "Primary", "styleType": "FILL", "description": ""}
                    },
                })
            }
        };

        RawResponse {
            status: 200,
            body: body.to_string(),
            rate_limit: None,
        }
    }
}

impl Transport for PlaceholderTransport {
    fn send<'a>(&'a self, request: &'a ApiRequest) -> BoxFuture<'a, ApiResult<RawResponse>> {
        tracing::debug!(path = %request.path, "Serving placeholder response");
        future::ready(Ok(Self::respond(request))).boxed()
    }
}
