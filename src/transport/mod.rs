//! Transport seam.
//!
//! # Responsibilities
//! - Define the single network primitive the executor depends on
//! - Keep the resilience logic independent of the HTTP library
//!
//! # Design Decisions
//! - `Transport::send` performs exactly one round trip, no retries
//! - Deadlines are enforced by the caller, not the transport
//! - Production uses `reqwest` (http.rs); tests script responses

pub mod http;

use futures_util::future::BoxFuture;
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde_json::Value;
use thiserror::Error;
use url::Url;

pub use http::ReqwestTransport;

/// Body forwarded to the API unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Serialized as JSON with `Content-Type: application/json`.
    Json(Value),
    /// Sent verbatim; the caller sets the content type.
    Text(String),
}

/// A fully resolved outbound request.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
}

/// Raw response as received from the wire.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Failures below the HTTP layer.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The transport gave up on its own deadline.
    #[error("transport timeout")]
    Timeout,

    /// Could not connect (DNS, refused, TLS).
    #[error("connection failed: {0}")]
    Connect(String),

    /// Connection dropped or response could not be read.
    #[error("request failed: {0}")]
    Request(String),
}

/// A single-shot network primitive.
pub trait Transport: Send + Sync + 'static {
    fn send(&self, request: TransportRequest) -> BoxFuture<'_, Result<TransportResponse, TransportError>>;
}
