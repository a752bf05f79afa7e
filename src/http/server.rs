//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Wrap a service router in the middleware every service shares
//!   (request id, access log, trace spans, timeout, body limit)
//! - Serve on a bound listener until the shutdown signal fires

use std::time::Duration;

use axum::{extract::DefaultBodyLimit, middleware, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::telemetry::{trace_requests, Tracer};

/// Apply the shared middleware stack. The last layer added runs first.
#[allow(deprecated)]
pub fn with_common_layers(router: Router, config: &AppConfig, tracer: Tracer) -> Router {
    router
        .layer(DefaultBodyLimit::max(config.listener.max_body_size))
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
        .layer(middleware::from_fn_with_state(tracer, trace_requests))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

/// Serve `router` until a shutdown signal arrives, then drain in-flight
/// requests.
pub async fn serve(
    router: Router,
    listener: TcpListener,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "HTTP server starting");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}
