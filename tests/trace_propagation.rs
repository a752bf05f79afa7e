//! One user action produces one trace across both services.

mod common;

use kv_trace::telemetry::{SpanKind, TRACEPARENT};
use opentelemetry::trace::{SpanId, TraceId};

#[tokio::test]
async fn test_frontend_post_yields_single_trace() {
    let api = common::spawn_api().await;
    let frontend = common::spawn_frontend(&format!("http://{}", api.addr)).await;

    let res = common::client()
        .post(frontend.url("/"))
        .form(&[("key", "color"), ("value", "blue")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 303);
    assert_eq!(res.headers()["location"], "/");

    frontend.tracer.force_flush().await;
    api.tracer.force_flush().await;
    let frontend_spans = frontend.exporter.get_finished_spans().unwrap();
    let api_spans = api.exporter.get_finished_spans().unwrap();

    let inbound = common::find_span(&frontend_spans, "POST /");
    let outbound = common::find_span(&frontend_spans, "POST /add");
    let backend = api_spans
        .iter()
        .find(|s| s.span_kind == SpanKind::Server && s.name == "POST /add")
        .unwrap();

    assert_eq!(inbound.span_kind, SpanKind::Server);
    assert_eq!(outbound.span_kind, SpanKind::Client);
    assert_eq!(outbound.parent_span_id, inbound.span_context.span_id());

    let trace_id = inbound.span_context.trace_id();
    assert_eq!(backend.span_context.trace_id(), trace_id);
    assert_eq!(backend.parent_span_id, outbound.span_context.span_id());
    assert!(backend.parent_span_is_remote);

    // Store spans hang off the same trace
    let query = common::find_span(&api_spans, "INSERT kv_store");
    assert_eq!(query.span_context.trace_id(), trace_id);

    assert_eq!(inbound.instrumentation_scope.name(), "kv-frontend");
    assert_eq!(backend.instrumentation_scope.name(), "kv-api-service");
    for span in frontend_spans.iter().chain(api_spans.iter()) {
        assert!(span.end_time >= span.start_time);
        assert!(!common::is_error(span), "unexpected error span {}", span.name);
    }
}

#[tokio::test]
async fn test_frontend_get_continues_browser_trace() {
    let api = common::spawn_api().await;
    let frontend = common::spawn_frontend(&format!("http://{}", api.addr)).await;
    let remote = "00-0af7651916cd43dd8448eb211c80319c-b7ad6b7169203331-01";

    let res = common::client()
        .get(frontend.url("/"))
        .header(TRACEPARENT, remote)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    frontend.tracer.force_flush().await;
    api.tracer.force_flush().await;

    let remote_trace = TraceId::from_hex("0af7651916cd43dd8448eb211c80319c").unwrap();
    let frontend_spans = frontend.exporter.get_finished_spans().unwrap();
    let inbound = common::find_span(&frontend_spans, "GET /");
    assert_eq!(inbound.span_context.trace_id(), remote_trace);
    assert_eq!(inbound.parent_span_id, SpanId::from_hex("b7ad6b7169203331").unwrap());

    let api_spans = api.exporter.get_finished_spans().unwrap();
    let select = common::find_span(&api_spans, "SELECT kv_store");
    assert_eq!(select.span_context.trace_id(), remote_trace);
}

#[tokio::test]
async fn test_unsampled_request_exports_nothing() {
    let api = common::spawn_api().await;

    let res = common::client()
        .get(api.url("/get_all"))
        .header(TRACEPARENT, "00-0af7651916cd43dd8448eb211c80319c-b7ad6b7169203331-00")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    api.tracer.force_flush().await;
    assert!(api.exporter.get_finished_spans().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_traceparent_starts_new_trace() {
    let api = common::spawn_api().await;

    let res = common::client()
        .get(api.url("/get_all"))
        .header(TRACEPARENT, "not-a-traceparent")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let spans = api.exporter.get_finished_spans().unwrap();
    let inbound = common::find_span(&spans, "GET /get_all");
    assert_eq!(inbound.parent_span_id, SpanId::INVALID);
    assert!(!inbound.parent_span_is_remote);
}
