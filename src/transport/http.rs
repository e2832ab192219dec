//! `reqwest`-backed transport.

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::Client;

use crate::transport::{RequestBody, Transport, TransportError, TransportRequest, TransportResponse};

/// Production transport over a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder().build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client (custom TLS, proxies, pool settings).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn round_trip(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let TransportRequest {
            method,
            url,
            mut headers,
            body,
        } = request;

        let mut builder = self.client.request(method, url);
        match body {
            Some(RequestBody::Json(value)) => {
                if !headers.contains_key(CONTENT_TYPE) {
                    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                }
                let bytes = serde_json::to_vec(&value)
                    .map_err(|e| TransportError::Request(format!("invalid JSON body: {}", e)))?;
                builder = builder.body(bytes);
            }
            Some(RequestBody::Text(text)) => {
                builder = builder.body(text);
            }
            None => {}
        }

        let response = builder.headers(headers).send().await.map_err(map_error)?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(map_error)?;

        Ok(TransportResponse {
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: TransportRequest) -> BoxFuture<'_, Result<TransportResponse, TransportError>> {
        self.round_trip(request).boxed()
    }
}

fn map_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Request(err.to_string())
    }
}
