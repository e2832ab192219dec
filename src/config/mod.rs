//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML), or defaults
//!     → loader.rs (parse & deserialize)
//!     → schema.rs (API_BASE_URL environment override)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → owned by the ApiClient instance
//! ```
//!
//! # Design Decisions
//! - Config is immutable once a client is built from it
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::ClientConfig;
pub use schema::LogFormat;
pub use schema::ObservabilityConfig;
pub use schema::RetryConfig;
pub use schema::SessionConfig;
pub use schema::TimeoutConfig;
