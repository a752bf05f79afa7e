//! Frontend request handlers.

use axum::{
    extract::{rejection::FormRejection, State},
    response::{Html, Redirect},
    Extension, Form,
};
use serde::Deserialize;

use super::{error::FrontendError, FrontendState};
use crate::telemetry::Context;

/// Fields of the submission form.
#[derive(Debug, Clone, Deserialize)]
pub struct EntryForm {
    pub key: String,
    pub value: String,
}

/// `GET /`: render every entry the backend holds.
pub async fn index(
    State(state): State<FrontendState>,
    Extension(cx): Extension<Context>,
) -> Result<Html<String>, FrontendError> {
    let entries = state.client.list_entries(&cx).await?;
    Ok(Html(state.renderer.render_index(&entries)))
}

/// `POST /`: forward the form to the backend, then redirect to `GET /`.
pub async fn submit(
    State(state): State<FrontendState>,
    Extension(cx): Extension<Context>,
    form: Result<Form<EntryForm>, FormRejection>,
) -> Result<Redirect, FrontendError> {
    let Form(form) = form.map_err(|rejection| FrontendError::BadRequest(rejection.body_text()))?;

    state.client.add_entry(&cx, &form.key, &form.value).await?;
    tracing::debug!(key = %form.key, "Entry submitted");

    Ok(Redirect::to("/"))
}
