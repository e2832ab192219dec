//! Request description.
//!
//! # Responsibilities
//! - Caller-facing options (method, headers, body, idempotency hint)
//! - Resolve path + options + credential into an immutable descriptor
//! - Derive the dedupe key for read requests

use std::fmt;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult, ErrorKind};
use crate::transport::RequestBody;

/// Bearer credential. Never printed in full.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl From<&str> for Credential {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for Credential {
    fn from(token: String) -> Self {
        Self(token)
    }
}

/// Per-call options. `RequestOptions::default()` is a plain GET.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Option<Method>,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    /// Caller guarantees the endpoint is idempotent; enables retries for
    /// non-read methods. Never enables deduplication.
    pub idempotent: bool,
}

impl RequestOptions {
    pub fn method(method: Method) -> Self {
        Self {
            method: Some(method),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    /// Serialize `body` as JSON.
    pub fn with_body<T: Serialize>(self, body: &T) -> ApiResult<Self> {
        let value = serde_json::to_value(body).map_err(|e| {
            ApiError::new(ErrorKind::Validation, 0)
                .with_code("invalid_body")
                .with_message(format!("Request body could not be serialized: {}", e))
        })?;
        Ok(self.with_json(value))
    }

    pub fn with_text(mut self, body: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Text(body.into()));
        self
    }

    pub fn idempotent(mut self) -> Self {
        self.idempotent = true;
        self
    }
}

/// Key coalescing concurrent identical reads: full path plus credential.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct DedupeKey {
    path: String,
    credential: Credential,
}

impl DedupeKey {
    pub fn new(path: impl Into<String>, credential: Credential) -> Self {
        Self {
            path: path.into(),
            credential,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Debug for DedupeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DedupeKey")
            .field("path", &self.path)
            .field("credential", &self.credential)
            .finish()
    }
}

/// Immutable description of one logical request, reused across retries.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub path: String,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<RequestBody>,
    pub credential: Credential,
    pub idempotent: bool,
    pub request_id: Uuid,
}

impl RequestDescriptor {
    /// Normalize caller input. The method defaults to GET.
    pub fn new(path: &str, credential: Credential, options: RequestOptions) -> ApiResult<Self> {
        let mut headers = HeaderMap::new();
        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid_header(name))?;
            let value = HeaderValue::from_str(value).map_err(|_| invalid_header(name.as_str()))?;
            headers.append(name, value);
        }

        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{}", path)
        };

        Ok(Self {
            path,
            method: options.method.unwrap_or(Method::GET),
            headers,
            body: options.body,
            credential,
            idempotent: options.idempotent,
            request_id: Uuid::new_v4(),
        })
    }

    /// Only GET requests are coalesced.
    ///
    /// HEAD stays retry-eligible but is never coalesced, unlike GET.
    pub fn dedupe_key(&self) -> Option<DedupeKey> {
        (self.method == Method::GET).then(|| DedupeKey::new(self.path.clone(), self.credential.clone()))
    }
}

fn invalid_header(name: &str) -> ApiError {
    ApiError::new(ErrorKind::Validation, 0)
        .with_code("invalid_header")
        .with_message(format!("Invalid request header '{}'", name))
}
