//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for both services.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration shared by the api and frontend services.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Relational store settings (api only).
    pub database: DatabaseConfig,

    /// Where the frontend finds the api (frontend only).
    pub backend: BackendConfig,

    /// Trace export settings.
    pub tracing: TracingConfig,

    /// Inbound request timeouts.
    pub timeouts: TimeoutConfig,

    /// Logging and metrics settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    pub bind_address: String,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
            max_body_size: 64 * 1024,
        }
    }
}

/// Store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path of the SQLite database file.
    pub path: String,

    /// Upper bound for a single statement, including waiting on locks.
    pub query_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "kv_store.db".to_string(),
            query_timeout_secs: 5,
        }
    }
}

/// Location of the backend api, as seen from the frontend.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the api (e.g., "http://api:5000").
    pub api_url: String,

    /// Timeout for one frontend → api call in seconds.
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:5000".to_string(),
            request_timeout_secs: 5,
        }
    }
}

/// Trace export configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TracingConfig {
    /// Export spans to the collector. When false spans are still created
    /// and propagated, but discarded on completion.
    pub enabled: bool,

    /// Service name stamped on every span. Defaults to the role's name.
    pub service_name: Option<String>,

    /// OTLP collector host.
    pub collector_host: String,

    /// OTLP/HTTP port of the collector.
    pub collector_port: u16,

    /// Trace ingestion path on the collector.
    pub collector_path: String,

    /// Timeout for one export call in seconds.
    pub export_timeout_secs: u64,

    /// Maximum spans buffered before new spans are dropped.
    pub max_queue_size: usize,

    /// Maximum spans per export call.
    pub max_export_batch_size: usize,

    /// Delay between scheduled exports in milliseconds.
    pub scheduled_delay_ms: u64,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            service_name: None,
            collector_host: "localhost".to_string(),
            collector_port: 4318,
            collector_path: "/v1/traces".to_string(),
            export_timeout_secs: 10,
            max_queue_size: 2048,
            max_export_batch_size: 512,
            scheduled_delay_ms: 5000,
        }
    }
}

impl TracingConfig {
    /// Full OTLP/HTTP trace endpoint.
    pub fn collector_url(&self) -> String {
        format!(
            "http://{}:{}{}",
            self.collector_host, self.collector_port, self.collector_path
        )
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log format ("pretty" or "json").
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
