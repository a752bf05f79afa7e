//! Error types for the backend api.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::http::StatusBody;
use crate::store::StoreError;

/// Errors surfaced by api handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body missing, malformed, or lacking a required field.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The store could not complete the operation.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Rejected request");
        }
        (status, Json(StatusBody::error(self.to_string()))).into_response()
    }
}
