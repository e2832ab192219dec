//! Resilient JSON API client.
//!
//! Every call the application makes to the remote API goes through
//! [`ApiClient::request`]: per-attempt timeouts, bounded retries with
//! backoff, `Retry-After` handling, coalescing of duplicate concurrent
//! GETs, debounced sign-out on expired sessions and a typed error model.

pub mod client;
pub mod config;
pub mod error;
pub mod observability;
pub mod resilience;
pub mod session;
pub mod transport;

pub use client::{ApiClient, ApiClientBuilder, Credential, RequestOptions};
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult, ErrorKind};
pub use session::{SessionHandler, SignOutEvent};
pub use transport::{RequestBody, Transport};
