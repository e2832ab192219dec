//! Retry logic.
//!
//! # Responsibilities
//! - Determine if a request is retryable (read methods only)
//! - Compute the delay before the next attempt
//! - Enforce the per-request retry budget
//!
//! # Design Decisions
//! - Never retry POST/PUT/DELETE/PATCH unless the caller marks the request idempotent
//! - 5xx waits a fixed delay; 429 honors `Retry-After` or backs off exponentially
//! - 429 backoff never shrinks between attempts of the same request
//! - Connection errors and timeouts only retried when configured

use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::Method;

use crate::client::outcome::AttemptOutcome;
use crate::config::RetryConfig;
use crate::resilience::backoff::calculate_backoff;

/// Read-only methods eligible for automatic retry.
pub fn is_read_method(method: &Method) -> bool {
    *method == Method::GET || *method == Method::HEAD
}

/// Parse a `Retry-After` header given in seconds.
///
/// Values too large for a `Duration` saturate; callers clamp the result.
pub fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    if let Ok(secs) = value.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(|secs| Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX))
}

/// Why a retry was scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryReason {
    ServerError,
    RateLimited,
    Network,
}

impl RetryReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetryReason::ServerError => "server_error",
            RetryReason::RateLimited => "rate_limited",
            RetryReason::Network => "network",
        }
    }
}

/// What to do after an attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Retry { delay: Duration, reason: RetryReason },
    Stop,
}

/// Retry bookkeeping for one logical request.
#[derive(Debug, Clone)]
pub struct RetryState {
    remaining: u32,
    retries_made: u32,
    last_backoff: Duration,
}

impl RetryState {
    pub fn new(budget: u32) -> Self {
        Self {
            remaining: budget,
            retries_made: 0,
            last_backoff: Duration::ZERO,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn retries_made(&self) -> u32 {
        self.retries_made
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

/// Decides whether and when to retry an attempt.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    enabled: bool,
    max_retries: u32,
    server_error_delay: Duration,
    rate_limit_base_ms: u64,
    rate_limit_max_ms: u64,
    jitter: f64,
    retry_after_max: Duration,
    retry_network_errors: bool,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            enabled: config.enabled,
            max_retries: config.max_retries,
            server_error_delay: Duration::from_millis(config.server_error_delay_ms),
            rate_limit_base_ms: config.rate_limit_base_delay_ms,
            rate_limit_max_ms: config.rate_limit_max_delay_ms,
            jitter: config.rate_limit_jitter,
            retry_after_max: Duration::from_secs(config.retry_after_max_secs),
            retry_network_errors: config.retry_network_errors,
        }
    }

    /// Whether a request may be retried at all.
    pub fn is_eligible(&self, method: &Method, marked_idempotent: bool) -> bool {
        self.enabled && (is_read_method(method) || marked_idempotent)
    }

    /// Fresh state holding the full budget.
    pub fn new_state(&self) -> RetryState {
        RetryState::new(self.max_retries)
    }

    /// Decide what follows `outcome`, consuming budget when retrying.
    pub fn decide(
        &self,
        outcome: &AttemptOutcome,
        eligible: bool,
        state: &mut RetryState,
    ) -> RetryDecision {
        let reason = match outcome {
            AttemptOutcome::HttpFailure(raw) if raw.status == 429 => RetryReason::RateLimited,
            AttemptOutcome::HttpFailure(raw) if raw.status >= 500 => RetryReason::ServerError,
            AttemptOutcome::NetworkFailure(_) if self.retry_network_errors => RetryReason::Network,
            _ => return RetryDecision::Stop,
        };

        if !eligible || state.is_exhausted() {
            return RetryDecision::Stop;
        }

        let delay = match (reason, outcome) {
            (RetryReason::RateLimited, AttemptOutcome::HttpFailure(raw)) => {
                match retry_after(&raw.headers) {
                    Some(hint) => hint.min(self.retry_after_max),
                    None => {
                        let computed = calculate_backoff(
                            state.retries_made + 1,
                            self.rate_limit_base_ms,
                            self.rate_limit_max_ms,
                            self.jitter,
                        );
                        let delay = computed.max(state.last_backoff);
                        state.last_backoff = delay;
                        delay
                    }
                }
            }
            _ => self.server_error_delay,
        };

        state.remaining -= 1;
        state.retries_made += 1;
        RetryDecision::Retry { delay, reason }
    }
}
