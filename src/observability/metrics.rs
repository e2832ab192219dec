//! Metrics collection.
//!
//! # Metrics
//! - `api_client_requests_total` (counter): logical requests by method, outcome
//! - `api_client_request_duration_seconds` (histogram): end-to-end latency
//! - `api_client_retries_total` (counter): scheduled retries by reason
//! - `api_client_dedup_joined_total` (counter): GETs served by an in-flight request
//! - `api_client_sign_outs_total` (counter): session guard sign-outs
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; the host installs an exporter
//! - Without a recorder every call is a no-op

use std::time::Instant;

/// Record a settled logical request.
///
/// `outcome` is `"success"` or the error kind.
pub fn record_request(method: &str, outcome: &'static str, start: Instant) {
    metrics::counter!(
        "api_client_requests_total",
        "method" => method.to_string(),
        "outcome" => outcome
    )
    .increment(1);
    metrics::histogram!(
        "api_client_request_duration_seconds",
        "method" => method.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_retry(reason: &'static str) {
    metrics::counter!("api_client_retries_total", "reason" => reason).increment(1);
}

pub fn record_dedup_joined() {
    metrics::counter!("api_client_dedup_joined_total").increment(1);
}

pub fn record_sign_out() {
    metrics::counter!("api_client_sign_outs_total").increment(1);
}
