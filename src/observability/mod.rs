//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Client, retry loop, dedup registry, session guard produce:
//!     → logging.rs (structured log events with request_id)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Host application's tracing subscriber
//!     → Host application's metrics exporter
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every attempt of a logical request
//! - Metrics are cheap and no-ops without a recorder

pub mod logging;
pub mod metrics;
