//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate the base URL and value ranges (timeouts > 0, delays ordered)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>
//! - Runs before a client is built from the config

use std::fmt;

use url::Url;

use crate::config::schema::ClientConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.base_url) {
        Ok(url) if url.scheme() != "http" && url.scheme() != "https" => {
            errors.push(ValidationError::new(
                "base_url",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        Ok(url) if url.cannot_be_a_base() => {
            errors.push(ValidationError::new("base_url", "must be an absolute URL"));
        }
        Ok(_) => {}
        Err(e) => errors.push(ValidationError::new("base_url", e.to_string())),
    }

    if config.timeouts.request_ms == 0 {
        errors.push(ValidationError::new("timeouts.request_ms", "must be greater than 0"));
    }

    let retries = &config.retries;
    if retries.rate_limit_base_delay_ms == 0 {
        errors.push(ValidationError::new(
            "retries.rate_limit_base_delay_ms",
            "must be greater than 0",
        ));
    }
    if retries.rate_limit_max_delay_ms < retries.rate_limit_base_delay_ms {
        errors.push(ValidationError::new(
            "retries.rate_limit_max_delay_ms",
            "must be at least rate_limit_base_delay_ms",
        ));
    }
    if !(0.0..=1.0).contains(&retries.rate_limit_jitter) {
        errors.push(ValidationError::new(
            "retries.rate_limit_jitter",
            "must be between 0.0 and 1.0",
        ));
    }

    if config.session.storage_key.is_empty() {
        errors.push(ValidationError::new("session.storage_key", "must not be empty"));
    }
    if !config.session.sign_in_path.starts_with('/') {
        errors.push(ValidationError::new("session.sign_in_path", "must start with '/'"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
