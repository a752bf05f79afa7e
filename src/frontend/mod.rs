//! User-facing frontend service.
//!
//! # Routes
//! - `GET /`: page listing every entry, fetched from the backend
//! - `POST /`: form fields `key`, `value`; forwarded to the backend, then
//!   `303` back to `GET /`
//! - `GET /health`
//!
//! Backend failures surface as `502` with an error page; no entries are
//! rendered in that case.

pub mod client;
pub mod error;
pub mod handlers;
pub mod render;

use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::AppConfig;
use crate::http::{response::health, serve, with_common_layers};
use crate::telemetry::Tracer;

pub use client::{BackendClient, ClientBuildError};
pub use error::FrontendError;
pub use render::{HtmlRenderer, Renderer};

/// Default service name reported on frontend spans.
pub const FRONTEND_SERVICE_NAME: &str = "kv-frontend";

#[derive(Clone)]
pub struct FrontendState {
    pub client: BackendClient,
    pub renderer: Arc<dyn Renderer>,
}

pub struct FrontendServer {
    config: AppConfig,
    state: FrontendState,
    tracer: Tracer,
}

impl FrontendServer {
    pub fn new(config: AppConfig, client: BackendClient, tracer: Tracer) -> Self {
        Self::with_renderer(config, client, tracer, Arc::new(HtmlRenderer))
    }

    pub fn with_renderer(
        config: AppConfig,
        client: BackendClient,
        tracer: Tracer,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        Self {
            config,
            state: FrontendState { client, renderer },
            tracer,
        }
    }

    pub fn router(&self) -> Router {
        let routes = Router::new()
            .route("/", get(handlers::index).post(handlers::submit))
            .route("/health", get(health))
            .with_state(self.state.clone());

        with_common_layers(routes, &self.config, self.tracer.clone())
    }

    pub async fn run(
        &self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        serve(self.router(), listener, shutdown).await
    }
}
