//! End-to-end tests of the client against a local HTTP backend.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use figma_client::{ApiError, ClientConfig, FigmaClient, FileOptions};

mod common;
use common::{MockResponse, VALID_KEY};

fn config_for(addr: std::net::SocketAddr) -> ClientConfig {
    let mut config = ClientConfig::with_api_key(VALID_KEY);
    config.api.base_url = format!("http://{}/v1", addr);
    config.retries.attempts = 3;
    config.retries.base_delay_ms = 10;
    config.timeouts.request_ms = 5_000;
    config
}

#[tokio::test]
async fn test_retry_on_failure() {
    let calls = Arc::new(AtomicU32::new(0));
    let cc = calls.clone();
    let (addr, _) = common::start_programmable_backend(move |_| {
        let count = cc.fetch_add(1, Ordering::SeqCst);
        async move {
            if count < 2 {
                MockResponse::json(503, r#"{"status":503,"err":"Service Unavailable"}"#)
            } else {
                MockResponse::json(200, common::user_body())
            }
        }
    })
    .await;

    let client = FigmaClient::new(config_for(addr)).unwrap();
    let user = client.get_user().await.expect("should succeed after retries");

    assert_eq!(user.handle, "ada");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    client.destroy();
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let (addr, hits) = common::start_programmable_backend(|_| async {
        MockResponse::json(404, r#"{"status":404,"err":"Not found"}"#)
    })
    .await;

    let client = FigmaClient::new(config_for(addr)).unwrap();
    let err = client
        .get_file("missing", FileOptions::default())
        .await
        .unwrap_err();

    match err {
        ApiError::Http { status, message, .. } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Not found");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    client.destroy();
}

#[tokio::test]
async fn test_request_target_and_rate_limit_headers() {
    let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
    let log = seen.clone();
    let (addr, _) = common::start_programmable_backend(move |target| {
        log.lock().unwrap().push(target);
        async {
            MockResponse::json(
                200,
                r#"{"name":"Landing","lastModified":"2024-01-01T00:00:00Z","version":"7","document":{"id":"0:0","name":"Document","type":"DOCUMENT"}}"#,
            )
            .with_header("x-ratelimit-remaining", 17)
            .with_header("x-ratelimit-reset", 4_102_444_800u64)
            .with_header("x-ratelimit-limit", 120)
        }
    })
    .await;

    let client = FigmaClient::new(config_for(addr)).unwrap();
    let options = FileOptions {
        depth: Some(2),
        ..Default::default()
    };
    let file = client.get_file("abc123", options).await.unwrap();
    assert_eq!(file.name, "Landing");

    assert_eq!(seen.lock().unwrap().as_slice(), ["/v1/files/abc123?depth=2"]);

    let status = client.rate_limit_status();
    assert_eq!(status.remaining, 17);
    assert_eq!(status.limit, 120);
    assert_eq!(status.reset, 4_102_444_800);
    assert!(!status.is_limited);
    client.destroy();
}

#[tokio::test]
async fn test_cached_response_skips_network() {
    let (addr, hits) =
        common::start_programmable_backend(|_| async { MockResponse::json(200, common::user_body()) })
            .await;

    let client = FigmaClient::new(config_for(addr)).unwrap();
    client.get_user().await.unwrap();
    client.get_user().await.unwrap();

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(client.cache_stats().size, 1);
    client.destroy();
}

#[tokio::test]
async fn test_demo_mode_never_connects() {
    let (addr, hits) =
        common::start_programmable_backend(|_| async { MockResponse::json(200, common::user_body()) })
            .await;

    let mut config = config_for(addr);
    config.api.api_key = "demo".into();
    let client = FigmaClient::new(config).unwrap();

    let user = client.get_user().await.unwrap();
    assert_eq!(user.id, "demo-user");
    let file = client.get_file("anything", FileOptions::default()).await.unwrap();
    assert_eq!(file.name, "Demo File (anything)");
    let validation = client.validate_api_key().await;
    assert!(!validation.is_valid);

    assert_eq!(hits.load(Ordering::SeqCst), 0);
    client.destroy();
}

#[tokio::test]
async fn test_unauthorized_key_fails_validation() {
    let (addr, hits) = common::start_programmable_backend(|_| async {
        MockResponse::json(403, r#"{"status":403,"err":"Invalid token"}"#)
    })
    .await;

    let client = FigmaClient::new(config_for(addr)).unwrap();
    let validation = client.validate_api_key().await;

    assert!(!validation.is_valid);
    assert!(validation.user.is_none());
    assert!(validation.error.unwrap().contains("Invalid token"));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
    client.destroy();
}
