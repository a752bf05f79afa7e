//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: {value:?}")]
    Env { var: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: optional TOML file, then environment overrides,
/// then validation.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => AppConfig::default(),
    };

    apply_env_overrides(&mut config, |var| std::env::var(var).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment variables onto `config`.
///
/// `lookup` abstracts the environment so tests can supply their own.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("BIND_ADDRESS") {
        config.listener.bind_address = v;
    }
    if let Some(v) = lookup("DB_PATH") {
        config.database.path = v;
    }
    if let Some(v) = lookup("DB_QUERY_TIMEOUT_SECS") {
        config.database.query_timeout_secs = parse_var("DB_QUERY_TIMEOUT_SECS", v)?;
    }
    if let Some(v) = lookup("API_URL") {
        config.backend.api_url = v;
    }
    if let Some(v) = lookup("JAEGER_AGENT_HOST") {
        config.tracing.collector_host = v;
    }
    if let Some(v) = lookup("JAEGER_AGENT_PORT") {
        config.tracing.collector_port = parse_var("JAEGER_AGENT_PORT", v)?;
    }
    if let Some(v) = lookup("TRACING_ENABLED") {
        config.tracing.enabled = parse_var("TRACING_ENABLED", v)?;
    }
    if let Some(v) = lookup("SERVICE_NAME") {
        config.tracing.service_name = Some(v);
    }
    if let Some(v) = lookup("LOG_LEVEL") {
        config.observability.log_level = v;
    }
    if let Some(v) = lookup("LOG_FORMAT") {
        config.observability.log_format = v;
    }
    if let Some(v) = lookup("METRICS_ENABLED") {
        config.observability.metrics_enabled = parse_var("METRICS_ENABLED", v)?;
    }
    if let Some(v) = lookup("METRICS_ADDRESS") {
        config.observability.metrics_address = v;
    }
    Ok(())
}

fn parse_var<T: FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Env { var, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_env_overrides() {
        let vars = env(&[
            ("API_URL", "http://api.internal:5000"),
            ("JAEGER_AGENT_HOST", "jaeger"),
            ("JAEGER_AGENT_PORT", "14318"),
            ("DB_PATH", "/var/lib/kv/store.db"),
        ]);
        let mut config = AppConfig::default();
        apply_env_overrides(&mut config, |k| vars.get(k).cloned()).unwrap();

        assert_eq!(config.backend.api_url, "http://api.internal:5000");
        assert_eq!(config.tracing.collector_host, "jaeger");
        assert_eq!(config.tracing.collector_port, 14318);
        assert_eq!(config.database.path, "/var/lib/kv/store.db");
        // Untouched fields keep their defaults
        assert_eq!(config.listener.bind_address, "0.0.0.0:5000");
    }

    #[test]
    fn test_bad_port_is_rejected() {
        let vars = env(&[("JAEGER_AGENT_PORT", "not-a-port")]);
        let mut config = AppConfig::default();
        let err = apply_env_overrides(&mut config, |k| vars.get(k).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: "JAEGER_AGENT_PORT", .. }));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[listener]
bind_address = "127.0.0.1:7000"

[tracing]
enabled = false
service_name = "kv-test"
"#
        )
        .unwrap();

        let config = load_config(Some(file.path())).unwrap();
        assert!(!config.tracing.enabled);
        assert_eq!(config.tracing.service_name.as_deref(), Some("kv-test"));
        assert_eq!(config.database.query_timeout_secs, 5);
    }

    #[test]
    fn test_invalid_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "listener = 12").unwrap();
        assert!(matches!(
            load_config(Some(file.path())),
            Err(ConfigError::Parse(_))
        ));
    }
}
