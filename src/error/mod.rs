//! Typed error model.
//!
//! # Data Flow
//! ```text
//! Terminal attempt outcome
//!     → status code (0 for transport-level failures)
//!     → ErrorKind::from_status (classification table)
//!     → payload.rs (override message/code/details from a JSON body)
//!     → ApiError (the only failure type that leaves the client)
//! ```
//!
//! # Design Decisions
//! - `ApiError` is `Clone` so deduplicated callers can share one outcome
//! - Status 0 means no HTTP status applies: transport failures and
//!   requests rejected before they were sent
//! - Every kind has a ready-to-display default message

pub mod payload;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::error::payload::ErrorPayload;

/// Closed set of failure categories callers can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Timeout or transport failure; no HTTP response was received.
    Network,
    /// 400 / 422: the request was rejected as invalid input.
    Validation,
    /// 401: the credential is missing, invalid or expired.
    AuthenticationExpired,
    /// 403
    Forbidden,
    /// 404
    NotFound,
    /// 409
    Conflict,
    /// 429
    RateLimited,
    /// 5xx
    Server,
    /// Anything the table does not cover.
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::Validation => "validation",
            ErrorKind::AuthenticationExpired => "authentication_expired",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::Server => "server",
            ErrorKind::Unknown => "unknown",
        }
    }

    /// Classify an HTTP status code. `0` is reserved for transport failures.
    pub fn from_status(status: u16) -> Self {
        match status {
            0 => ErrorKind::Network,
            400 | 422 => ErrorKind::Validation,
            401 => ErrorKind::AuthenticationExpired,
            403 => ErrorKind::Forbidden,
            404 => ErrorKind::NotFound,
            409 => ErrorKind::Conflict,
            429 => ErrorKind::RateLimited,
            s if s >= 500 => ErrorKind::Server,
            _ => ErrorKind::Unknown,
        }
    }

    /// Default machine-readable code.
    pub fn default_code(&self) -> &'static str {
        match self {
            ErrorKind::Network => "network_error",
            ErrorKind::Validation => "validation_error",
            ErrorKind::AuthenticationExpired => "authentication_expired",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::RateLimited => "rate_limited",
            ErrorKind::Server => "server_error",
            ErrorKind::Unknown => "unknown_error",
        }
    }

    /// Default human-readable message.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorKind::Network => {
                "Unable to reach the server. Check your connection and try again."
            }
            ErrorKind::Validation => "The request contains invalid data.",
            ErrorKind::AuthenticationExpired => "Your session has expired. Please sign in again.",
            ErrorKind::Forbidden => "You do not have permission to perform this action.",
            ErrorKind::NotFound => "The requested resource was not found.",
            ErrorKind::Conflict => "The request conflicts with the current state of the resource.",
            ErrorKind::RateLimited => "Too many requests. Please wait a moment and try again.",
            ErrorKind::Server => "The server is temporarily unavailable. Please try again later.",
            ErrorKind::Unknown => "An unexpected error occurred.",
        }
    }
}

/// Error surfaced to callers for every failed request.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{message} (status {status}, code {code})")]
pub struct ApiError {
    kind: ErrorKind,
    status: u16,
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

/// Result type for client operations.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Build an error with the defaults for `kind`.
    pub fn new(kind: ErrorKind, status: u16) -> Self {
        Self {
            kind,
            status,
            code: kind.default_code().to_string(),
            message: kind.default_message().to_string(),
            details: None,
        }
    }

    /// Classify a failed HTTP response, letting a structured body refine it.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let error = Self::new(ErrorKind::from_status(status), status);
        match ErrorPayload::parse(body) {
            Some(payload) => error.with_payload(payload),
            None => error,
        }
    }

    /// The request never got an answer within its deadline.
    pub fn timeout() -> Self {
        Self::new(ErrorKind::Network, 0)
            .with_code("timeout")
            .with_message("The request timed out. Please try again.")
    }

    /// Transport-level failure (DNS, refused connection, reset, TLS).
    pub fn network(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, 0).with_details(Value::String(reason.into()))
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    fn with_payload(mut self, payload: ErrorPayload) -> Self {
        if let Some(message) = payload.message {
            self.message = message;
        }
        if let Some(code) = payload.code {
            self.code = code;
        }
        if payload.details.is_some() {
            self.details = payload.details;
        }
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// HTTP status, or 0 for transport-level failures.
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    /// Whether the error matches a machine-readable code, e.g. a
    /// server-side "confirmation required" signal in a 4xx body.
    pub fn has_code(&self, code: &str) -> bool {
        self.code == code
    }

    pub fn is_auth_expired(&self) -> bool {
        self.kind == ErrorKind::AuthenticationExpired
    }

    /// Whether retrying the same request later might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::Network | ErrorKind::RateLimited | ErrorKind::Server
        )
    }
}
