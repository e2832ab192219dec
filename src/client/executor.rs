//! Single-attempt request execution.
//!
//! # Responsibilities
//! - Resolve the descriptor against the base URL
//! - Attach `Authorization: Bearer` and `x-request-id`
//! - Enforce the per-attempt deadline
//! - Classify the result as success, network failure or HTTP failure
//!
//! # Design Decisions
//! - Exactly one transport call per `execute`; retries live in the facade
//! - 2xx and 3xx are success; everything else keeps the raw response
//! - Empty, 204 and non-JSON successes become `{}`

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde_json::{Map, Value};
use url::Url;

use crate::client::outcome::{AttemptOutcome, NetworkFailure, RawResponse};
use crate::client::request::RequestDescriptor;
use crate::error::{ApiError, ErrorKind};
use crate::resilience::timeouts::with_deadline;
use crate::transport::{Transport, TransportError, TransportRequest, TransportResponse};

/// Header carrying the per-request correlation ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Issues one attempt at a time against the configured API.
pub struct Executor {
    transport: Arc<dyn Transport>,
    base_url: String,
    timeout: Duration,
}

impl Executor {
    pub fn new(transport: Arc<dyn Transport>, base_url: &str, timeout: Duration) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// Absolute URL for an API path (query string included).
    pub fn url_for(&self, path: &str) -> Result<Url, ApiError> {
        Url::parse(&format!("{}{}", self.base_url, path)).map_err(|e| {
            ApiError::new(ErrorKind::Validation, 0)
                .with_code("invalid_url")
                .with_message(format!("Invalid request path '{}': {}", path, e))
        })
    }

    /// Perform exactly one network attempt.
    pub async fn execute(&self, descriptor: &RequestDescriptor) -> AttemptOutcome {
        let request = match self.build_request(descriptor) {
            Ok(request) => request,
            Err(err) => return AttemptOutcome::Rejected(err),
        };

        match with_deadline(self.timeout, self.transport.send(request)).await {
            Err(_) => {
                tracing::warn!(
                    request_id = %descriptor.request_id,
                    path = %descriptor.path,
                    timeout = ?self.timeout,
                    "Request timed out"
                );
                AttemptOutcome::NetworkFailure(NetworkFailure::Timeout)
            }
            Ok(Err(TransportError::Timeout)) => AttemptOutcome::NetworkFailure(NetworkFailure::Timeout),
            Ok(Err(e)) => {
                tracing::warn!(
                    request_id = %descriptor.request_id,
                    path = %descriptor.path,
                    error = %e,
                    "Transport error"
                );
                AttemptOutcome::NetworkFailure(NetworkFailure::Connection(e.to_string()))
            }
            Ok(Ok(response)) => classify(response),
        }
    }

    fn build_request(&self, descriptor: &RequestDescriptor) -> Result<TransportRequest, ApiError> {
        if descriptor.credential.is_empty() {
            return Err(ApiError::new(ErrorKind::AuthenticationExpired, 0)
                .with_code("missing_credential")
                .with_message("No credential supplied. Please sign in."));
        }

        let url = self.url_for(&descriptor.path)?;

        let mut headers: HeaderMap = descriptor.headers.clone();
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", descriptor.credential.expose()))
            .map_err(|_| {
                ApiError::new(ErrorKind::AuthenticationExpired, 0)
                    .with_code("invalid_credential")
                    .with_message("The credential contains invalid characters.")
            })?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        if let Ok(id) = HeaderValue::from_str(&descriptor.request_id.to_string()) {
            headers.insert(REQUEST_ID_HEADER, id);
        }
        if !headers.contains_key(ACCEPT) {
            headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        }

        Ok(TransportRequest {
            method: descriptor.method.clone(),
            url,
            headers,
            body: descriptor.body.clone(),
        })
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

fn classify(response: TransportResponse) -> AttemptOutcome {
    let TransportResponse {
        status,
        headers,
        body,
    } = response;

    if !(200..400).contains(&status) {
        return AttemptOutcome::HttpFailure(RawResponse {
            status,
            headers,
            body,
        });
    }

    if status == 204 || body.iter().all(u8::is_ascii_whitespace) || !is_json(&headers) {
        return AttemptOutcome::Success(Value::Object(Map::new()));
    }

    match serde_json::from_slice(&body) {
        Ok(value) => AttemptOutcome::Success(value),
        Err(e) => AttemptOutcome::Rejected(
            ApiError::new(ErrorKind::Unknown, status)
                .with_code("invalid_response")
                .with_message(format!("The server returned malformed JSON: {}", e)),
        ),
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::request::RequestOptions;
    use crate::transport::mock::{response, ScriptedTransport};
    use crate::transport::RequestBody;
    use reqwest::Method;
    use serde_json::json;

    fn executor(transport: Arc<ScriptedTransport>, timeout_ms: u64) -> Executor {
        Executor::new(transport, "http://api.test/v1/", Duration::from_millis(timeout_ms))
    }

    fn get(path: &str) -> RequestDescriptor {
        RequestDescriptor::new(path, "abc".into(), RequestOptions::default()).unwrap()
    }

    #[tokio::test]
    async fn test_attaches_auth_and_request_id() {
        let transport = Arc::new(ScriptedTransport::new(Duration::ZERO));
        transport.push_status(200, "application/json", r#"{"ok":true}"#);
        let exec = executor(transport.clone(), 1_000);

        let desc = RequestDescriptor::new(
            "/drivers?page=2",
            "abc".into(),
            RequestOptions::method(Method::POST).with_json(json!({"name": "Ada"})),
        )
        .unwrap();
        let outcome = exec.execute(&desc).await;
        assert!(matches!(outcome, AttemptOutcome::Success(ref v) if v["ok"] == true));

        let requests = transport.requests.lock().unwrap();
        let sent = &requests[0];
        assert_eq!(sent.url.as_str(), "http://api.test/v1/drivers?page=2");
        assert_eq!(sent.method, Method::POST);
        assert_eq!(sent.headers[AUTHORIZATION], "Bearer abc");
        assert_eq!(
            sent.headers[REQUEST_ID_HEADER].to_str().unwrap(),
            desc.request_id.to_string()
        );
        assert_eq!(sent.body, Some(RequestBody::Json(json!({"name": "Ada"}))));
    }

    #[tokio::test]
    async fn test_empty_and_non_json_success_is_empty_object() {
        let transport = Arc::new(ScriptedTransport::new(Duration::ZERO));
        transport
            .push_status(204, "", "")
            .push_status(200, "text/plain", "pong")
            .push_status(200, "application/json", "  ");
        let exec = executor(transport, 1_000);

        for _ in 0..3 {
            match exec.execute(&get("/ping")).await {
                AttemptOutcome::Success(value) => assert_eq!(value, json!({})),
                other => panic!("unexpected outcome: {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_json_with_charset_and_vendor_types() {
        let transport = Arc::new(ScriptedTransport::new(Duration::ZERO));
        transport
            .push_status(200, "application/json; charset=utf-8", "[1,2]")
            .push_status(200, "application/problem+json", r#"{"a":1}"#);
        let exec = executor(transport, 1_000);

        assert!(matches!(exec.execute(&get("/a")).await, AttemptOutcome::Success(v) if v == json!([1, 2])));
        assert!(matches!(exec.execute(&get("/b")).await, AttemptOutcome::Success(v) if v == json!({"a": 1})));
    }

    #[tokio::test]
    async fn test_malformed_json_is_rejected() {
        let transport = Arc::new(ScriptedTransport::new(Duration::ZERO));
        transport.push_status(200, "application/json", "{not json");
        let exec = executor(transport, 1_000);

        match exec.execute(&get("/a")).await {
            AttemptOutcome::Rejected(err) => {
                assert_eq!(err.code(), "invalid_response");
                assert_eq!(err.status(), 200);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_error_status_keeps_raw_response() {
        let transport = Arc::new(ScriptedTransport::new(Duration::ZERO));
        transport.push_status(422, "application/json", r#"{"message":"bad"}"#);
        let exec = executor(transport, 1_000);

        match exec.execute(&get("/a")).await {
            AttemptOutcome::HttpFailure(raw) => {
                assert_eq!(raw.status, 422);
                assert_eq!(raw.body, br#"{"message":"bad"}"#.to_vec());
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_redirect_status_is_success() {
        let transport = Arc::new(ScriptedTransport::new(Duration::ZERO));
        transport.push(Ok(response(304, "", "")));
        let exec = executor(transport, 1_000);
        assert!(matches!(exec.execute(&get("/a")).await, AttemptOutcome::Success(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_yields_timeout() {
        let transport = Arc::new(ScriptedTransport::new(Duration::from_secs(10)));
        transport.push_status(200, "application/json", "{}");
        let exec = executor(transport, 100);

        assert!(matches!(
            exec.execute(&get("/slow")).await,
            AttemptOutcome::NetworkFailure(NetworkFailure::Timeout)
        ));
    }

    #[tokio::test]
    async fn test_transport_errors_are_classified() {
        let transport = Arc::new(ScriptedTransport::new(Duration::ZERO));
        transport
            .push(Err(TransportError::Connect("connection refused".into())))
            .push(Err(TransportError::Timeout));
        let exec = executor(transport, 1_000);

        assert!(matches!(
            exec.execute(&get("/a")).await,
            AttemptOutcome::NetworkFailure(NetworkFailure::Connection(reason)) if reason.contains("refused")
        ));
        assert!(matches!(
            exec.execute(&get("/a")).await,
            AttemptOutcome::NetworkFailure(NetworkFailure::Timeout)
        ));
    }

    #[tokio::test]
    async fn test_missing_credential_never_reaches_transport() {
        let transport = Arc::new(ScriptedTransport::new(Duration::ZERO));
        let exec = executor(transport.clone(), 1_000);
        let desc = RequestDescriptor::new("/a", "  ".into(), RequestOptions::default()).unwrap();

        match exec.execute(&desc).await {
            AttemptOutcome::Rejected(err) => assert_eq!(err.code(), "missing_credential"),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(transport.calls(), 0);
    }
}
