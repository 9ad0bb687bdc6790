//! Deterministic cache keys.

use crate::api::ApiRequest;

/// Key for a request: method, URL, then sorted query, headers and body.
///
/// Two logically identical requests map to the same key regardless of the
/// order their parameters or headers were added in. Header names are
/// case-insensitive and lowercased.
pub fn cache_key(base_url: &str, request: &ApiRequest) -> String {
    let mut key = format!(
        "{} {}{}",
        request.method,
        base_url.trim_end_matches('/'),
        request.path
    );

    if !request.query.is_empty() {
        let query: Vec<String> = request
            .query
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        key.push('?');
        key.push_str(&query.join("&"));
    }

    if !request.headers.is_empty() {
        let mut headers: Vec<String> = request
            .headers
            .iter()
            .map(|(k, v)| format!("{}:{}", k.to_ascii_lowercase(), v))
            .collect();
        headers.sort();
        key.push_str(" |h ");
        key.push_str(&headers.join(";"));
    }

    // serde_json maps are ordered, so serialization is canonical.
    if let Some(body) = &request.body {
        key.push_str(" |b ");
        key.push_str(&body.to_string());
    }

    key
}
