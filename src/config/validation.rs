//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and URLs parse
//! - Validate value ranges (timeouts > 0, batch sizes sane)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::AppConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
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

/// Validate a fully loaded configuration.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("not a socket address: {}", config.listener.bind_address),
        ));
    }
    if config.listener.max_body_size == 0 {
        errors.push(ValidationError::new("listener.max_body_size", "must be > 0"));
    }

    if config.database.path.trim().is_empty() {
        errors.push(ValidationError::new("database.path", "must not be empty"));
    }
    if config.database.query_timeout_secs == 0 {
        errors.push(ValidationError::new("database.query_timeout_secs", "must be > 0"));
    }

    match url::Url::parse(&config.backend.api_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "backend.api_url",
            format!("unsupported scheme: {}", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(
            "backend.api_url",
            format!("invalid URL: {}", e),
        )),
    }
    if config.backend.request_timeout_secs == 0 {
        errors.push(ValidationError::new("backend.request_timeout_secs", "must be > 0"));
    }

    let tracing = &config.tracing;
    if tracing.collector_host.trim().is_empty() {
        errors.push(ValidationError::new("tracing.collector_host", "must not be empty"));
    }
    if !tracing.collector_path.starts_with('/') {
        errors.push(ValidationError::new("tracing.collector_path", "must start with '/'"));
    }
    if tracing.export_timeout_secs == 0 {
        errors.push(ValidationError::new("tracing.export_timeout_secs", "must be > 0"));
    }
    if tracing.max_export_batch_size == 0 {
        errors.push(ValidationError::new("tracing.max_export_batch_size", "must be > 0"));
    }
    if tracing.max_export_batch_size > tracing.max_queue_size {
        errors.push(ValidationError::new(
            "tracing.max_export_batch_size",
            "must not exceed tracing.max_queue_size",
        ));
    }
    if tracing.scheduled_delay_ms == 0 {
        errors.push(ValidationError::new("tracing.scheduled_delay_ms", "must be > 0"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be > 0"));
    }

    let observability = &config.observability;
    if !matches!(observability.log_format.as_str(), "pretty" | "json") {
        errors.push(ValidationError::new(
            "observability.log_format",
            format!("expected \"pretty\" or \"json\", got {:?}", observability.log_format),
        ));
    }
    if observability.metrics_enabled
        && observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("not a socket address: {}", observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(validate_config(&AppConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = AppConfig::default();
        config.listener.bind_address = "nowhere".into();
        config.backend.api_url = "ftp://api".into();
        config.database.query_timeout_secs = 0;
        config.tracing.max_export_batch_size = config.tracing.max_queue_size + 1;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "listener.bind_address",
                "database.query_timeout_secs",
                "backend.api_url",
                "tracing.max_export_batch_size",
            ]
        );
    }

    #[test]
    fn test_metrics_address_only_checked_when_enabled() {
        let mut config = AppConfig::default();
        config.observability.metrics_address = "bogus".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert!(validate_config(&config).is_err());
    }
}
