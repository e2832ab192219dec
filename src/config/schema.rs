//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Local development API address used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Environment variable overriding `base_url`.
pub const BASE_URL_ENV: &str = "API_BASE_URL";

/// Root configuration for the API client.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL every request path is appended to.
    pub base_url: String,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Retry configuration.
    pub retries: RetryConfig,

    /// Session expiry handling.
    pub session: SessionConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeouts: TimeoutConfig::default(),
            retries: RetryConfig::default(),
            session: SessionConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Defaults with `API_BASE_URL` applied when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Apply environment overrides on top of the loaded values.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            let url = url.trim();
            if !url.is_empty() {
                self.base_url = url.to_string();
            }
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Maximum wait for a single attempt, in milliseconds.
    pub request_ms: u64,
}

impl TimeoutConfig {
    pub fn request(&self) -> Duration {
        Duration::from_millis(self.request_ms)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_ms: 30_000 }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Enable automatic retries.
    pub enabled: bool,

    /// Additional attempts beyond the first.
    pub max_retries: u32,

    /// Fixed delay before retrying a 5xx response, in milliseconds.
    pub server_error_delay_ms: u64,

    /// Base delay for 429 exponential backoff, in milliseconds.
    pub rate_limit_base_delay_ms: u64,

    /// Cap for 429 exponential backoff, in milliseconds.
    pub rate_limit_max_delay_ms: u64,

    /// Jitter applied to 429 backoff, as a fraction of the delay.
    pub rate_limit_jitter: f64,

    /// Upper bound honored for a `Retry-After` hint, in seconds.
    pub retry_after_max_secs: u64,

    /// Retry timeouts and connection failures like 5xx responses.
    pub retry_network_errors: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: 2,
            server_error_delay_ms: 1_000,
            rate_limit_base_delay_ms: 1_000,
            rate_limit_max_delay_ms: 30_000,
            rate_limit_jitter: 0.1,
            retry_after_max_secs: 120,
            retry_network_errors: false,
        }
    }
}

/// Session expiry (401) handling.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Minimum interval between two sign-outs, in milliseconds.
    pub cooldown_ms: u64,

    /// Storage key of the persisted session token.
    pub storage_key: String,

    /// Path of the sign-in entry point.
    pub sign_in_path: String,
}

impl SessionConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cooldown_ms: 5_000,
            storage_key: "token".to_string(),
            sign_in_path: "/login".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Emit request counters and latency histograms.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.retries.max_retries, 2);
        assert!(config.retries.enabled);
        assert!(!config.retries.retry_network_errors);
        assert_eq!(config.session.cooldown(), Duration::from_secs(5));
        assert_eq!(config.session.sign_in_path, "/login");
        assert_eq!(config.timeouts.request(), Duration::from_secs(30));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            base_url = "https://api.example.com"

            [retries]
            max_retries = 4

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.retries.max_retries, 4);
        assert_eq!(config.retries.server_error_delay_ms, 1_000);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        assert_eq!(config.session.storage_key, "token");
    }
}
