//! Backend api service.
//!
//! # Routes
//! - `POST /add`: `{"key": .., "value": ..}` → `201 {"status":"success"}`
//! - `GET /get_all`: `[[id, key, value], ...]`
//! - `GET /health`
//!
//! Every request gets a server span from the telemetry middleware; each
//! handler opens an internal child span and passes its context to the store.

pub mod error;
pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::AppConfig;
use crate::http::{response::health, serve, with_common_layers};
use crate::store::Store;
use crate::telemetry::Tracer;

pub use error::ApiError;

/// Default service name reported on backend spans.
pub const API_SERVICE_NAME: &str = "kv-api-service";

/// Shared handler state.
#[derive(Debug, Clone)]
pub struct ApiState {
    pub store: Store,
    pub tracer: Tracer,
}

pub struct ApiServer {
    config: AppConfig,
    state: ApiState,
}

impl ApiServer {
    pub fn new(config: AppConfig, store: Store, tracer: Tracer) -> Self {
        Self {
            config,
            state: ApiState { store, tracer },
        }
    }

    /// The fully layered router.
    pub fn router(&self) -> Router {
        let routes = Router::new()
            .route("/add", post(handlers::add_entry))
            .route("/get_all", get(handlers::get_all))
            .route("/health", get(health))
            .with_state(self.state.clone());

        with_common_layers(routes, &self.config, self.state.tracer.clone())
    }

    /// Serve until `shutdown` fires.
    pub async fn run(
        &self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        serve(self.router(), listener, shutdown).await
    }
}
