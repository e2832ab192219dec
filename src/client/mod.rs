//! API client facade.
//!
//! # Data Flow
//! ```text
//! caller: request(path, credential, options)
//!     → request.rs (normalize into RequestDescriptor; method defaults to GET)
//!     → GET? dedup.rs (join in-flight result, or register a new one)
//!     → executor.rs (one attempt, deadline-bound)
//!     → resilience::retries (retry after delay while eligible and budget left)
//!     → session::guard (terminal 401 → debounced sign-out)
//!     → outcome.rs (terminal outcome → Value or ApiError)
//!     → dedup.rs entry released on settlement
//! ```
//!
//! # State Machine (per logical request)
//! ```text
//! Idle → Attempting → Success
//!                   → RetryableFailure → (delay) → Attempting
//!                   → TerminalFailure
//! ```
//!
//! # Design Decisions
//! - All shared state lives in one `Arc`-held instance; clones share it
//! - Attempts of one logical request are strictly sequential
//! - Only `ApiError` crosses the module boundary on failure

pub mod dedup;
pub mod executor;
pub mod outcome;
pub mod request;

use std::sync::Arc;
use std::time::Instant;

use futures_util::FutureExt;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::dedup::InflightRegistry;
use crate::client::executor::Executor;
use crate::client::outcome::AttemptOutcome;
use crate::config::validation::validate_config;
use crate::config::{ClientConfig, ConfigError};
use crate::error::{ApiError, ApiResult, ErrorKind};
use crate::observability::metrics;
use crate::resilience::{RetryDecision, RetryPolicy};
use crate::session::{LoggingSessionHandler, SessionGuard, SessionHandler};
use crate::transport::{ReqwestTransport, Transport};

pub use request::{Credential, DedupeKey, RequestDescriptor, RequestOptions};

/// Resilient client for the remote JSON API.
///
/// Cheap to clone; clones share the in-flight registry and session guard.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    executor: Executor,
    policy: RetryPolicy,
    inflight: InflightRegistry,
    session: SessionGuard,
}

/// Builder for [`ApiClient`].
pub struct ApiClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    session_handler: Option<Arc<dyn SessionHandler>>,
}

impl ApiClientBuilder {
    /// Replace the default `reqwest` transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Install the sign-out side effect run on session expiry.
    pub fn session_handler(mut self, handler: Arc<dyn SessionHandler>) -> Self {
        self.session_handler = Some(handler);
        self
    }

    /// Validate the config and build the client.
    pub fn build(self) -> Result<ApiClient, ConfigError> {
        validate_config(&self.config).map_err(ConfigError::Validation)?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new()?),
        };
        let handler = self
            .session_handler
            .unwrap_or_else(|| Arc::new(LoggingSessionHandler));

        let executor = Executor::new(transport, &self.config.base_url, self.config.timeouts.request());
        let policy = RetryPolicy::from_config(&self.config.retries);
        let session = SessionGuard::new(&self.config.session, handler);

        tracing::debug!(
            base_url = %self.config.base_url,
            timeout_ms = self.config.timeouts.request_ms,
            max_retries = self.config.retries.max_retries,
            "API client initialized"
        );

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                config: self.config,
                executor,
                policy,
                inflight: InflightRegistry::new(),
                session,
            }),
        })
    }
}

impl ApiClient {
    /// Client over `reqwest` with the default session handler.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        Self::builder(config).build()
    }

    /// Client configured from defaults and `API_BASE_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(ClientConfig::from_env())
    }

    /// Start building a client with a custom transport or session handler.
    pub fn builder(config: ClientConfig) -> ApiClientBuilder {
        ApiClientBuilder {
            config,
            transport: None,
            session_handler: None,
        }
    }

    /// Configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Number of deduplicated GETs currently in flight.
    pub fn in_flight(&self) -> usize {
        self.inner.inflight.len()
    }

    /// Request `path` and return the parsed JSON body.
    ///
    /// GETs with the same path and credential issued while one is in flight
    /// share its outcome. Failures are always an [`ApiError`].
    pub async fn request(
        &self,
        path: &str,
        credential: impl Into<Credential>,
        options: RequestOptions,
    ) -> ApiResult<Value> {
        let start = Instant::now();
        let descriptor = RequestDescriptor::new(path, credential.into(), options)?;
        let method = descriptor.method.clone();

        let result = match descriptor.dedupe_key() {
            Some(key) => self.request_shared(key, descriptor).await,
            None => self.inner.run(descriptor).await,
        };

        if self.inner.config.observability.metrics_enabled {
            let outcome = match &result {
                Ok(_) => "success",
                Err(err) => err.kind().as_str(),
            };
            metrics::record_request(method.as_str(), outcome, start);
        }
        result
    }

    /// Like [`request`](Self::request), deserializing the body into `T`.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        path: &str,
        credential: impl Into<Credential>,
        options: RequestOptions,
    ) -> ApiResult<T> {
        let value = self.request(path, credential, options).await?;
        serde_json::from_value(value).map_err(|e| {
            ApiError::new(ErrorKind::Unknown, 0)
                .with_code("invalid_response")
                .with_message(format!("Unexpected response shape: {}", e))
        })
    }

    /// GET `path`; concurrent identical calls share one request.
    pub async fn get(&self, path: &str, credential: impl Into<Credential>) -> ApiResult<Value> {
        self.request(path, credential, RequestOptions::default()).await
    }

    /// POST a JSON body. Never retried or shared.
    pub async fn post(&self, path: &str, credential: impl Into<Credential>, body: Value) -> ApiResult<Value> {
        self.request(path, credential, RequestOptions::method(Method::POST).with_json(body))
            .await
    }

    /// PUT a JSON body.
    pub async fn put(&self, path: &str, credential: impl Into<Credential>, body: Value) -> ApiResult<Value> {
        self.request(path, credential, RequestOptions::method(Method::PUT).with_json(body))
            .await
    }

    /// PATCH with a JSON body.
    pub async fn patch(&self, path: &str, credential: impl Into<Credential>, body: Value) -> ApiResult<Value> {
        self.request(path, credential, RequestOptions::method(Method::PATCH).with_json(body))
            .await
    }

    /// DELETE `path`.
    pub async fn delete(&self, path: &str, credential: impl Into<Credential>) -> ApiResult<Value> {
        self.request(path, credential, RequestOptions::method(Method::DELETE))
            .await
    }

    async fn request_shared(&self, key: DedupeKey, descriptor: RequestDescriptor) -> ApiResult<Value> {
        let inner = self.inner.clone();
        let (pending, joined) = self.inner.inflight.join_or_register(key.clone(), move || {
            // The request runs in its own task so it settles, and frees its
            // key, even when every caller stops waiting.
            let task = tokio::spawn(async move {
                let _release = ReleaseOnDrop { inner: inner.clone(), key };
                inner.run(descriptor).await
            });
            async move {
                task.await.unwrap_or_else(|e| {
                    tracing::error!(error = %e, "Shared request task failed");
                    Err(ApiError::new(ErrorKind::Unknown, 0)
                        .with_code("request_aborted")
                        .with_message("Request was aborted before completing"))
                })
            }
            .boxed()
            .shared()
        });

        if joined {
            tracing::debug!("Joined in-flight GET request");
            if self.inner.config.observability.metrics_enabled {
                metrics::record_dedup_joined();
            }
        }
        pending.await
    }
}

/// Removes a dedupe entry when the request task ends, including by panic.
struct ReleaseOnDrop {
    inner: Arc<ClientInner>,
    key: DedupeKey,
}

impl Drop for ReleaseOnDrop {
    fn drop(&mut self) {
        self.inner.inflight.release(&self.key);
    }
}

impl ClientInner {
    /// Drive one logical request through attempts until a terminal outcome.
    async fn run(&self, descriptor: RequestDescriptor) -> ApiResult<Value> {
        let eligible = self.policy.is_eligible(&descriptor.method, descriptor.idempotent);
        let mut state = self.policy.new_state();
        let mut attempt: u32 = 1;

        let outcome = loop {
            tracing::debug!(
                request_id = %descriptor.request_id,
                method = %descriptor.method,
                path = %descriptor.path,
                attempt,
                "Attempting request"
            );

            let outcome = self.executor.execute(&descriptor).await;
            match self.policy.decide(&outcome, eligible, &mut state) {
                RetryDecision::Retry { delay, reason } => {
                    tracing::info!(
                        request_id = %descriptor.request_id,
                        attempt,
                        status = outcome.status(),
                        delay = ?delay,
                        reason = reason.as_str(),
                        "Retrying request"
                    );
                    if self.config.observability.metrics_enabled {
                        metrics::record_retry(reason.as_str());
                    }
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                RetryDecision::Stop => break outcome,
            }
        };

        if let AttemptOutcome::Success(_) = outcome {
            tracing::debug!(request_id = %descriptor.request_id, attempts = attempt, "Request succeeded");
        } else {
            tracing::warn!(
                request_id = %descriptor.request_id,
                method = %descriptor.method,
                path = %descriptor.path,
                attempts = attempt,
                status = outcome.status(),
                "Request failed"
            );
        }

        if self.session.observe(outcome.status()) && self.config.observability.metrics_enabled {
            metrics::record_sign_out();
        }

        outcome.into_result()
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.config.base_url)
            .field("executor", &self.inner.executor)
            .field("inflight", &self.inner.inflight)
            .field("session", &self.inner.session)
            .finish()
    }
}
