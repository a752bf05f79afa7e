//! Span lifecycle.
//!
//! An [`ActiveSpan`] is started by [`Tracer::start_span`](super::Tracer::start_span)
//! and ends exactly once: explicitly through [`ActiveSpan::end`], or on drop
//! when the owning future returns early or is cancelled. A span dropped
//! without an end and without a recorded error is marked `cancelled`.

use std::fmt;

use opentelemetry::trace::{Status, TraceContextExt, TraceId};
use opentelemetry::{Context, KeyValue};

/// Description recorded on spans abandoned before they ended.
pub const CANCELLED: &str = "cancelled";

/// A span in progress, carried inside the [`Context`] handed to children.
pub struct ActiveSpan {
    cx: Context,
    errored: bool,
    ended: bool,
}

impl ActiveSpan {
    pub(super) fn new(cx: Context) -> Self {
        Self {
            cx,
            errored: false,
            ended: false,
        }
    }

    /// Context to hand to child spans and outbound requests.
    pub fn context(&self) -> &Context {
        &self.cx
    }

    pub fn trace_id(&self) -> TraceId {
        self.cx.span().span_context().trace_id()
    }

    pub fn set_attribute(&self, attribute: KeyValue) {
        self.cx.span().set_attribute(attribute);
    }

    /// Mark the span failed with a description of the fault. The first
    /// recorded error wins.
    pub fn record_error(&mut self, error: &dyn fmt::Display) {
        if self.errored {
            return;
        }
        self.errored = true;

        let description = error.to_string();
        let span = self.cx.span();
        span.add_event(
            "exception",
            vec![KeyValue::new("exception.message", description.clone())],
        );
        span.set_status(Status::error(description));
    }

    /// End the span and hand it to the export pipeline.
    pub fn end(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        if self.ended {
            return;
        }
        self.ended = true;
        self.cx.span().end();
    }
}

impl Drop for ActiveSpan {
    fn drop(&mut self) {
        if !self.ended {
            self.record_error(&CANCELLED);
            self.finish();
        }
    }
}

impl fmt::Debug for ActiveSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveSpan")
            .field("span_context", self.cx.span().span_context())
            .field("errored", &self.errored)
            .field("ended", &self.ended)
            .finish()
    }
}
