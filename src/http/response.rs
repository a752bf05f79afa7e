//! Small JSON status bodies used by both services.

use axum::Json;
use serde::{Deserialize, Serialize};

/// `{"status": "...", "message": "..."}`; `message` is omitted when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusBody {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StatusBody {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: Some(message.into()),
        }
    }
}

/// Liveness probe.
pub async fn health() -> Json<StatusBody> {
    Json(StatusBody {
        status: "ok".to_string(),
        message: None,
    })
}
