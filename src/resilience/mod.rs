//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to API:
//!     → timeouts.rs (enforce per-attempt deadline)
//!     → On failure: retries.rs (check if retryable, pick delay, spend budget)
//!     → backoff.rs (exponential delay with jitter for rate limiting)
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every attempt has a deadline
//! - Retries only for idempotent requests (GET, HEAD)
//! - Retry budget is per logical request and bounded by config

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use retries::{RetryDecision, RetryPolicy, RetryReason, RetryState};
