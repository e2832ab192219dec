//! Session expiry handling.
//!
//! # Data Flow
//! ```text
//! Terminal 401 from any request
//!     → guard.rs (cooldown check + timestamp, one lock)
//!     → handler.rs (host-supplied sign-out: clear token, navigate)
//! ```
//!
//! # Design Decisions
//! - State lives in the client instance, never in globals
//! - The networking core knows nothing about storage or navigation
//! - A burst of expired requests signs out once per cooldown window

pub mod guard;
pub mod handler;

pub use guard::SessionGuard;
pub use handler::{LoggingSessionHandler, SessionHandler, SignOutEvent};
