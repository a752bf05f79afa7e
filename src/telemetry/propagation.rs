//! W3C Trace Context over HTTP headers.
//!
//! The wire form is the `traceparent` header:
//!
//! ```text
//! 00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01
//! ^  ^                                ^                ^
//! |  trace id (16 bytes)              span id (8)      flags (bit 0 = sampled)
//! version
//! ```

use std::collections::HashMap;

use axum::http::HeaderMap;
use opentelemetry::propagation::TextMapPropagator;
use opentelemetry::Context;
use opentelemetry_http::{HeaderExtractor, HeaderInjector};
use opentelemetry_sdk::propagation::TraceContextPropagator;

/// Header carrying the trace context between services.
pub const TRACEPARENT: &str = "traceparent";

/// Remote parent described by inbound headers. Missing or malformed headers
/// yield an empty context, which starts a new trace.
pub fn extract(headers: &HeaderMap) -> Context {
    TraceContextPropagator::new().extract_with_context(&Context::new(), &HeaderExtractor(headers))
}

/// Write the context's span into outbound headers. No-op without a valid
/// span.
pub fn inject(cx: &Context, headers: &mut HeaderMap) {
    TraceContextPropagator::new().inject_context(cx, &mut HeaderInjector(headers));
}

/// The `traceparent` value for the context's span.
pub fn traceparent(cx: &Context) -> Option<String> {
    let mut carrier: HashMap<String, String> = HashMap::new();
    TraceContextPropagator::new().inject_context(cx, &mut carrier);
    carrier.remove(TRACEPARENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use opentelemetry::trace::TraceContextExt;

    const REMOTE: &str = "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01";

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(TRACEPARENT, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_extract_then_inject_preserves_traceparent() {
        let cx = extract(&headers(REMOTE));
        let span = cx.span();
        let remote = span.span_context();
        assert!(remote.is_valid());
        assert!(remote.is_remote());
        assert!(remote.is_sampled());
        assert_eq!(remote.trace_id().to_string(), "4bf92f3577b34da6a3ce929d0e0e4736");

        let mut out = HeaderMap::new();
        inject(&cx, &mut out);
        assert_eq!(out[TRACEPARENT], REMOTE);
        assert_eq!(traceparent(&cx).as_deref(), Some(REMOTE));
    }

    #[test]
    fn test_malformed_headers_start_fresh() {
        for bad in [
            "",
            "garbage",
            "00-00000000000000000000000000000000-00f067aa0ba902b7-01",
            "00-4bf92f3577b34da6a3ce929d0e0e4736-0000000000000000-01",
            "00-4BF92F3577B34DA6A3CE929D0E0E4736-00f067aa0ba902b7-01",
        ] {
            let cx = extract(&headers(bad));
            assert!(!cx.span().span_context().is_valid(), "accepted {:?}", bad);
        }
        assert!(!extract(&HeaderMap::new()).has_active_span());
    }

    #[test]
    fn test_empty_context_injects_nothing() {
        let mut out = HeaderMap::new();
        inject(&Context::new(), &mut out);
        assert!(out.get(TRACEPARENT).is_none());
        assert_eq!(traceparent(&Context::new()), None);
    }
}
