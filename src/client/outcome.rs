//! Result of a single network attempt.

use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::error::ApiError;

/// Why an attempt produced no HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkFailure {
    Timeout,
    Connection(String),
}

/// A non-2xx/3xx response kept intact for classification.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

/// Outcome of exactly one attempt. Produced fresh per attempt.
#[derive(Debug, Clone)]
pub enum AttemptOutcome {
    Success(Value),
    NetworkFailure(NetworkFailure),
    HttpFailure(RawResponse),
    /// The request could not be attempted or its response was unusable.
    Rejected(ApiError),
}

impl AttemptOutcome {
    /// HTTP status for logging; 0 when there was no response.
    pub fn status(&self) -> u16 {
        match self {
            AttemptOutcome::Success(_) => 200,
            AttemptOutcome::NetworkFailure(_) => 0,
            AttemptOutcome::HttpFailure(raw) => raw.status,
            AttemptOutcome::Rejected(err) => err.status(),
        }
    }

    /// Convert a terminal outcome into what the caller receives.
    pub fn into_result(self) -> Result<Value, ApiError> {
        match self {
            AttemptOutcome::Success(value) => Ok(value),
            AttemptOutcome::NetworkFailure(NetworkFailure::Timeout) => Err(ApiError::timeout()),
            AttemptOutcome::NetworkFailure(NetworkFailure::Connection(reason)) => {
                Err(ApiError::network(reason))
            }
            AttemptOutcome::HttpFailure(raw) => Err(ApiError::from_response(raw.status, &raw.body)),
            AttemptOutcome::Rejected(err) => Err(err),
        }
    }
}
