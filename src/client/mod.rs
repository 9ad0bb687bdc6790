//! Public client facade.
//!
//! # Data Flow
//! ```text
//! get_file / get_user / validate_api_key
//!     → cache key → cache hit? return
//!     → identical call in flight? await it
//!     → rate limiter admits? pipeline.execute : queue.enqueue + await
//!     → decode payload → cache set (configured TTL) → return
//! ```
//!
//! # Design Decisions
//! - One client owns its cache sweeper and queue processor; both stop on
//!   `destroy()` or when the last handle is dropped
//! - The transport strategy (real or placeholder) is picked once in `new`
//! - Identical concurrent calls share a single pipeline execution

pub mod credential;
pub mod pipeline;

use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::api::{
    ApiPayload, ApiRequest, FileOptions, FileResponse, Priority, User, ValidationResult,
};
use crate::cache::{cache_key, CacheStats, CacheSweeper, EntryMetadata, ResponseCache};
use crate::config::{validate_config, ClientConfig};
use crate::error::{ApiError, ApiResult};
use crate::lifecycle::Shutdown;
use crate::queue::{QueueProcessor, RequestQueue};
use crate::rate_limit::{RateLimitSnapshot, RateLimiter};
use crate::resilience::RetryPolicy;
use crate::transport::{HttpTransport, PlaceholderTransport, Transport, TransportKind};

use pipeline::Pipeline;

type SharedCall = Shared<BoxFuture<'static, ApiResult<ApiPayload>>>;

/// Client for the design-file API.
///
/// Cheap to clone; clones share cache, rate limit state and queue.
#[derive(Clone)]
pub struct FigmaClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    kind: TransportKind,
    loader: Loader,
    in_flight: Mutex<HashMap<String, SharedCall>>,
    shutdown: Shutdown,
    destroyed: AtomicBool,
}

/// Everything a cache miss needs, detached from the client handle so an
/// in-flight call keeps no reference back to it.
#[derive(Clone)]
struct Loader {
    pipeline: Arc<Pipeline>,
    cache: Arc<ResponseCache<ApiPayload>>,
    queue: Arc<RequestQueue>,
    ttl: Duration,
}

impl Loader {
    async fn load(self, key: String, request: ApiRequest, priority: Priority) -> ApiResult<ApiPayload> {
        let executed = if self.pipeline.limiter().can_admit() {
            self.pipeline.execute(&request).await?
        } else {
            let rx = self.queue.enqueue(request.clone(), priority);
            rx.await.unwrap_or(Err(ApiError::QueueCancelled))?
        };

        let payload = ApiPayload::decode(request.endpoint, &executed.response.body)?;
        self.cache.set(
            key,
            payload.clone(),
            self.ttl,
            EntryMetadata {
                request_id: executed.request_id,
                response_time: executed.elapsed,
                rate_limit: executed.response.rate_limit,
            },
        );
        Ok(payload)
    }
}

impl FigmaClient {
    /// Build a client from `config`.
    ///
    /// A well-formed credential selects the HTTP transport; anything else
    /// selects placeholder data and no network call is ever made. Must be
    /// called from within a Tokio runtime.
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        check_config(&config)?;

        if credential::is_well_formed(&config.api.api_key) {
            let transport = HttpTransport::new(&config.api.base_url, &config.api.api_key)?;
            Self::build(config, Arc::new(transport), TransportKind::Http)
        } else {
            tracing::info!("No well-formed API key configured, serving placeholder data");
            Self::build(config, Arc::new(PlaceholderTransport::new()), TransportKind::Placeholder)
        }
    }

    /// Build a client around a caller-supplied transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> ApiResult<Self> {
        check_config(&config)?;
        Self::build(config, transport, TransportKind::Custom)
    }

    fn build(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        kind: TransportKind,
    ) -> ApiResult<Self> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| ApiError::Validation("client must be created inside a Tokio runtime".into()))?;

        let pipeline = Arc::new(Pipeline::new(
            transport,
            RateLimiter::new(&config.rate_limit),
            RetryPolicy::from(&config.retries),
            config.timeouts.request(),
        ));
        let cache = Arc::new(ResponseCache::new());
        let queue = Arc::new(RequestQueue::new());
        let shutdown = Shutdown::new();

        runtime.spawn(
            CacheSweeper::new(cache.clone(), config.cache.sweep_interval()).run(shutdown.subscribe()),
        );
        runtime.spawn(QueueProcessor::new(queue.clone(), pipeline.clone()).run(shutdown.subscribe()));

        tracing::debug!(
            transport = ?kind,
            base_url = %config.api.base_url,
            retry_attempts = config.retries.attempts,
            cache_ttl_ms = config.cache.ttl_ms,
            "Client initialized"
        );

        let loader = Loader {
            pipeline,
            cache,
            queue,
            ttl: config.cache.ttl(),
        };
        Ok(Self {
            inner: Arc::new(ClientInner {
                config,
                kind,
                loader,
                in_flight: Mutex::new(HashMap::new()),
                shutdown,
                destroyed: AtomicBool::new(false),
            }),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn transport_kind(&self) -> TransportKind {
        self.inner.kind
    }

    /// Fetch a file document.
    pub async fn get_file(&self, file_key: &str, options: FileOptions) -> ApiResult<FileResponse> {
        let request = ApiRequest::file(file_key, &options)?;
        self.fetch(request, options.priority).await?.into_file()
    }

    /// Fetch the user the credential belongs to.
    pub async fn get_user(&self) -> ApiResult<User> {
        self.fetch(ApiRequest::me(), Priority::Normal).await?.into_user()
    }

    /// Check the credential: structurally first, then against the server.
    pub async fn validate_api_key(&self) -> ValidationResult {
        if !credential::is_well_formed(&self.inner.config.api.api_key) {
            return ValidationResult {
                is_valid: false,
                user: None,
                error: Some(format!(
                    "API key must start with '{}' followed by at least {} characters",
                    credential::API_KEY_PREFIX,
                    credential::MIN_SECRET_LEN
                )),
            };
        }

        match self.fetch(ApiRequest::me(), Priority::High).await.and_then(ApiPayload::into_user) {
            Ok(user) => ValidationResult {
                is_valid: true,
                user: Some(user),
                error: None,
            },
            Err(e) => ValidationResult {
                is_valid: false,
                user: None,
                error: Some(e.to_string()),
            },
        }
    }

    pub fn rate_limit_status(&self) -> RateLimitSnapshot {
        let loader = &self.inner.loader;
        loader.pipeline.limiter().snapshot(loader.queue.len())
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.inner.loader.cache.stats()
    }

    pub fn clear_cache(&self) {
        self.inner.loader.cache.clear();
        tracing::debug!("Cache cleared");
    }

    /// Cancel in-flight calls and reject everything queued. The client stays
    /// usable for new calls.
    pub fn abort(&self) {
        let loader = &self.inner.loader;
        loader.pipeline.abort_in_flight();
        let cancelled = loader.queue.cancel_all();
        tracing::debug!(cancelled, "Client aborted");
    }

    /// Abort, clear cache and queue, stop background tasks. Every later call
    /// fails with `ApiError::Destroyed`.
    pub fn destroy(&self) {
        if self.inner.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }
        let loader = &self.inner.loader;
        loader.pipeline.abort_in_flight();
        loader.queue.close();
        loader.cache.clear();
        self.in_flight().clear();
        let stopped = self.inner.shutdown.trigger();
        tracing::debug!(background_tasks = stopped, "Client destroyed");
    }

    pub fn is_destroyed(&self) -> bool {
        self.inner.destroyed.load(Ordering::SeqCst)
    }

    fn in_flight(&self) -> MutexGuard<'_, HashMap<String, SharedCall>> {
        self.inner.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn fetch(&self, request: ApiRequest, priority: Priority) -> ApiResult<ApiPayload> {
        if self.is_destroyed() {
            return Err(ApiError::Destroyed);
        }

        let key = cache_key(&self.inner.config.api.base_url, &request);
        if let Some(hit) = self.inner.loader.cache.get(&key) {
            tracing::debug!(key = %key, "Cache hit");
            return Ok(hit);
        }

        let call = {
            let mut in_flight = self.in_flight();
            match in_flight.get(&key) {
                Some(existing) => {
                    tracing::debug!(key = %key, "Joining identical in-flight request");
                    existing.clone()
                }
                None => {
                    tracing::debug!(key = %key, "Cache miss");
                    let call = self
                        .inner
                        .loader
                        .clone()
                        .load(key.clone(), request, priority)
                        .boxed()
                        .shared();
                    in_flight.insert(key.clone(), call.clone());
                    call
                }
            }
        };

        let result = call.clone().await;

        let mut in_flight = self.in_flight();
        if in_flight.get(&key).is_some_and(|current| current.ptr_eq(&call)) {
            in_flight.remove(&key);
        }
        result
    }
}

fn check_config(config: &ClientConfig) -> ApiResult<()> {
    validate_config(config).map_err(|errors| {
        ApiError::Validation(
            errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        )
    })
}

impl std::fmt::Debug for FigmaClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FigmaClient")
            .field("base_url", &self.inner.config.api.base_url)
            .field("transport", &self.inner.kind)
            .field("destroyed", &self.is_destroyed())
            .finish()
    }
}
