//! Real HTTP transport.

use futures_util::future::{BoxFuture, FutureExt};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::Client;

use crate::api::ApiRequest;
use crate::error::{ApiError, ApiResult};
use crate::rate_limit::RateLimitHeaders;
use crate::transport::{RawResponse, Transport};

/// Header carrying the personal access token.
pub const TOKEN_HEADER: &str = "x-figma-token";

/// reqwest-backed transport.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Build a transport sending `api_key` on every request.
    pub fn new(base_url: &str, api_key: &str) -> ApiResult<Self> {
        let mut token = HeaderValue::from_str(api_key)
            .map_err(|_| ApiError::Validation("API key is not a valid header value".into()))?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(TOKEN_HEADER, token);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| ApiError::Validation(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn call(&self, request: &ApiRequest) -> ApiResult<RawResponse> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.client.request(request.method.clone(), &url);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ApiError::Validation(format!("bad header name '{}': {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ApiError::Validation(format!("bad header value: {}", e)))?;
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let rate_limit = RateLimitHeaders::from_headers(response.headers());
        let body = response.text().await?;

        Ok(RawResponse {
            status,
            body,
            rate_limit,
        })
    }
}

impl Transport for HttpTransport {
    fn send<'a>(&'a self, request: &'a ApiRequest) -> BoxFuture<'a, ApiResult<RawResponse>> {
        self.call(request).boxed()
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .finish()
    }
}
