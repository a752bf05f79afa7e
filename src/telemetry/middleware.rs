//! Inbound HTTP instrumentation.
//!
//! Wraps every request in a server span. A valid `traceparent` header makes
//! the span a child of the caller's span; otherwise a new trace starts. The
//! span's [`Context`] is stored in the request extensions, where handlers
//! pick it up with `Extension<Context>`.

use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use opentelemetry::trace::TraceContextExt;
use opentelemetry::KeyValue;
use tracing::Instrument;

use super::{propagation, SpanKind, Tracer};
use crate::observability::metrics;

/// Axum middleware; install with `middleware::from_fn_with_state(tracer, trace_requests)`.
pub async fn trace_requests(
    State(tracer): State<Tracer>,
    mut request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let parent = propagation::extract(request.headers());
    let remote_parent = parent.has_active_span();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let mut span = tracer.start_span(format!("{} {}", method, path), SpanKind::Server, &parent);
    span.set_attribute(KeyValue::new("http.method", method.to_string()));
    span.set_attribute(KeyValue::new("http.target", path));

    let cx = span.context().clone();
    let log_span = {
        let span_ref = cx.span();
        let ids = span_ref.span_context();
        tracing::info_span!(
            "request",
            trace_id = %ids.trace_id(),
            span_id = %ids.span_id(),
            remote_parent,
        )
    };
    request.extensions_mut().insert(cx);
    let response = next.run(request).instrument(log_span).await;

    let status = response.status();
    span.set_attribute(KeyValue::new("http.status_code", i64::from(status.as_u16())));
    if status.is_server_error() || status == StatusCode::REQUEST_TIMEOUT {
        span.record_error(&status);
    }
    span.end();

    metrics::record_request(tracer.service_name(), method.as_str(), status.as_u16(), started);
    response
}
