//! Error types for the frontend.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use super::render::error_page;

/// Errors surfaced by frontend handlers.
#[derive(Debug, Error)]
pub enum FrontendError {
    /// Form submission missing `key` or `value`.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The backend could not be reached or answered with a failure.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
}

impl FrontendError {
    pub fn status(&self) -> StatusCode {
        match self {
            FrontendError::BadRequest(_) => StatusCode::BAD_REQUEST,
            FrontendError::BackendUnavailable(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for FrontendError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, Html(error_page(status, &self.to_string()))).into_response()
    }
}
