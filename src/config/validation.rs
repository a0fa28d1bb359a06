//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and returns every
//! problem found, not just the first.

use std::fmt;
use url::Url;

use crate::config::schema::BatchConfig;

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

/// Longest transaction lifetime accepted, one day.
pub const MAX_EXPIRATION_SECS: u64 = 86_400;

/// Validate a parsed configuration.
pub fn validate_config(config: &BatchConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.node.rpc_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "node.rpc_url",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("node.rpc_url", e.to_string())),
    }

    if config.node.request_timeout_secs == 0 {
        errors.push(ValidationError::new("node.request_timeout_secs", "must be > 0"));
    }

    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::new("retries.max_attempts", "must be >= 1"));
    }

    if config.polling.max_attempts == 0 {
        errors.push(ValidationError::new("polling.max_attempts", "must be >= 1"));
    }

    if config.gas.min_max_gas > config.gas.max_max_gas {
        errors.push(ValidationError::new(
            "gas.min_max_gas",
            format!(
                "{} exceeds gas.max_max_gas {}",
                config.gas.min_max_gas, config.gas.max_max_gas
            ),
        ));
    }

    if config.gas.gas_unit_price == 0 {
        errors.push(ValidationError::new("gas.gas_unit_price", "must be > 0"));
    }

    if config.gas.expiration_secs == 0 || config.gas.expiration_secs > MAX_EXPIRATION_SECS {
        errors.push(ValidationError::new(
            "gas.expiration_secs",
            format!("must be between 1 and {}", MAX_EXPIRATION_SECS),
        ));
    }

    if !matches!(config.observability.log_format.as_str(), "pretty" | "json") {
        errors.push(ValidationError::new(
            "observability.log_format",
            format!("unknown format '{}'", config.observability.log_format),
        ));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "not a socket address",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
