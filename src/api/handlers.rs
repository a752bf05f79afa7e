//! Backend request handlers.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use opentelemetry::KeyValue;
use serde::Deserialize;

use super::{error::ApiError, ApiState};
use crate::http::StatusBody;
use crate::store::Entry;
use crate::telemetry::{Context, SpanKind};

/// Body of `POST /add`. Both fields are required strings.
#[derive(Debug, Clone, Deserialize)]
pub struct AddEntryRequest {
    pub key: String,
    pub value: String,
}

/// `POST /add`: persist one entry.
pub async fn add_entry(
    State(state): State<ApiState>,
    Extension(cx): Extension<Context>,
    body: Result<Json<AddEntryRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<StatusBody>), ApiError> {
    let mut span = state.tracer.start_span("add_entry", SpanKind::Internal, &cx);

    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let err = ApiError::BadRequest(rejection.body_text());
            span.record_error(&err);
            return Err(err);
        }
    };
    span.set_attribute(KeyValue::new("kv.key", request.key.clone()));

    if let Err(e) = state.store.insert(span.context(), &request.key, &request.value).await {
        span.record_error(&e);
        return Err(e.into());
    }

    span.end();
    tracing::debug!(key = %request.key, "Entry added");
    Ok((StatusCode::CREATED, Json(StatusBody::success())))
}

/// `GET /get_all`: every entry as `[id, key, value]`.
pub async fn get_all(
    State(state): State<ApiState>,
    Extension(cx): Extension<Context>,
) -> Result<Json<Vec<Entry>>, ApiError> {
    let mut span = state.tracer.start_span("get_all", SpanKind::Internal, &cx);

    let result = state.store.list_all(span.context()).await;
    match &result {
        Ok(entries) => span.set_attribute(KeyValue::new("kv.entries", entries.len() as i64)),
        Err(e) => span.record_error(e),
    }
    span.end();

    Ok(Json(result?))
}
