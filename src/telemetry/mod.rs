//! Distributed trace propagation.
//!
//! # Data Flow
//! ```text
//! inbound HTTP  → middleware.rs (extract traceparent, server span)
//!               → handler (internal span, explicit Context)
//!               → store / outbound HTTP (client span, inject traceparent)
//! span end      → SDK batch processor → OTLP/HTTP collector
//! ```
//!
//! # Design Decisions
//! - One [`Tracer`] per process, built at startup and passed explicitly
//! - The active [`Context`] is a value handed down each call chain; only the
//!   HTTP boundaries read or write it from headers
//! - Tracing is best-effort: nothing here can fail a request

pub mod middleware;
pub mod propagation;
pub mod span;

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;

use opentelemetry::trace::{SpanBuilder, TraceContextExt, TracerProvider as _};
use opentelemetry_otlp::{ExporterBuildError, WithExportConfig};
use opentelemetry_sdk::trace::{
    BatchConfig, BatchConfigBuilder, BatchSpanProcessor, SdkTracer, SdkTracerProvider, SpanExporter,
};
use opentelemetry_sdk::Resource;
use thiserror::Error;

pub use middleware::trace_requests;
pub use opentelemetry::trace::{SpanKind, Status};
pub use opentelemetry::{Context, KeyValue};
pub use propagation::TRACEPARENT;
pub use span::ActiveSpan;

use crate::config::TracingConfig;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("failed to build span exporter: {0}")]
    Exporter(#[from] ExporterBuildError),
}

/// Process-wide span factory for one service.
#[derive(Clone)]
pub struct Tracer {
    provider: SdkTracerProvider,
    tracer: SdkTracer,
    service_name: Arc<str>,
}

impl Tracer {
    /// Build the tracer described by the configuration.
    ///
    /// With export enabled, completed spans are batched on the SDK's worker
    /// thread and sent to the collector as OTLP/HTTP protobuf. With export
    /// disabled, spans are still created and propagated but never leave the
    /// process.
    pub fn from_config(config: &TracingConfig, default_service: &str) -> Result<Self, TelemetryError> {
        let service_name = config
            .service_name
            .clone()
            .unwrap_or_else(|| default_service.to_string());

        let mut builder = SdkTracerProvider::builder().with_resource(resource(&service_name));
        if config.enabled {
            let exporter = opentelemetry_otlp::SpanExporter::builder()
                .with_http()
                .with_endpoint(config.collector_url())
                .with_timeout(Duration::from_secs(config.export_timeout_secs))
                .build()?;
            let processor = BatchSpanProcessor::builder(exporter)
                .with_batch_config(batch_config(config))
                .build();
            builder = builder.with_span_processor(processor);
        }

        tracing::info!(
            service = %service_name,
            export_enabled = config.enabled,
            collector = %config.collector_url(),
            "Tracer initialized"
        );

        Ok(Self::from_provider(builder.build(), service_name))
    }

    /// Tracer whose spans are handed to `exporter` as each one ends.
    pub fn with_exporter<E>(service_name: impl Into<String>, exporter: E) -> Self
    where
        E: SpanExporter + 'static,
    {
        let service_name = service_name.into();
        let provider = SdkTracerProvider::builder()
            .with_resource(resource(&service_name))
            .with_simple_exporter(exporter)
            .build();
        Self::from_provider(provider, service_name)
    }

    /// Tracer that creates and propagates spans without exporting them.
    pub fn disabled(service_name: impl Into<String>) -> Self {
        let service_name = service_name.into();
        let provider = SdkTracerProvider::builder()
            .with_resource(resource(&service_name))
            .build();
        Self::from_provider(provider, service_name)
    }

    fn from_provider(provider: SdkTracerProvider, service_name: String) -> Self {
        let tracer = provider.tracer(service_name.clone());
        Self {
            provider,
            tracer,
            service_name: service_name.into(),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Start a span under `parent`. A parent without a span starts a new
    /// trace.
    pub fn start_span(
        &self,
        name: impl Into<Cow<'static, str>>,
        kind: SpanKind,
        parent: &Context,
    ) -> ActiveSpan {
        let span = SpanBuilder::from_name(name)
            .with_kind(kind)
            .start_with_context(&self.tracer, parent);
        ActiveSpan::new(parent.with_span(span))
    }

    /// Export every span completed so far.
    pub async fn force_flush(&self) {
        let provider = self.provider.clone();
        match tokio::task::spawn_blocking(move || provider.force_flush()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "Span flush failed"),
            Err(e) => tracing::warn!(error = %e, "Span flush task failed"),
        }
    }

    /// Flush and stop exporting.
    pub async fn shutdown(&self) {
        let provider = self.provider.clone();
        match tokio::task::spawn_blocking(move || provider.shutdown()).await {
            Ok(Ok(())) => tracing::debug!(service = %self.service_name, "Tracer shut down"),
            Ok(Err(e)) => tracing::warn!(error = %e, "Tracer shutdown failed"),
            Err(e) => tracing::warn!(error = %e, "Tracer shutdown task failed"),
        }
    }
}

impl std::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracer")
            .field("service_name", &self.service_name)
            .finish()
    }
}

fn resource(service_name: &str) -> Resource {
    Resource::builder()
        .with_service_name(service_name.to_string())
        .build()
}

fn batch_config(config: &TracingConfig) -> BatchConfig {
    BatchConfigBuilder::default()
        .with_max_queue_size(config.max_queue_size)
        .with_max_export_batch_size(config.max_export_batch_size)
        .with_scheduled_delay(Duration::from_millis(config.scheduled_delay_ms))
        .build()
}
