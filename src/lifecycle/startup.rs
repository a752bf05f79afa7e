//! Startup orchestration.
//!
//! Each entry point builds its service from configuration, binds, and
//! serves until a signal arrives. Logging and metrics are installed by the
//! caller beforehand.

use thiserror::Error;
use tokio::net::TcpListener;

use super::{signals::shutdown_on_signal, Shutdown};
use crate::api::{ApiServer, API_SERVICE_NAME};
use crate::config::AppConfig;
use crate::frontend::{BackendClient, ClientBuildError, FrontendServer, FRONTEND_SERVICE_NAME};
use crate::store::{Store, StoreError};
use crate::telemetry::{TelemetryError, Tracer};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to initialize tracer: {0}")]
    Tracer(#[from] TelemetryError),

    #[error("store not ready: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Client(#[from] ClientBuildError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

async fn bind(address: &str) -> Result<TcpListener, StartupError> {
    TcpListener::bind(address).await.map_err(|source| StartupError::Bind {
        address: address.to_string(),
        source,
    })
}

/// Run the backend api until shutdown.
pub async fn start_api(config: AppConfig) -> Result<(), StartupError> {
    let tracer = Tracer::from_config(&config.tracing, API_SERVICE_NAME)?;

    let store = Store::new(&config.database, tracer.clone());
    store.ensure_schema().await?;

    let listener = bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        database = %store.path().display(),
        "Backend api ready"
    );

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(shutdown_on_signal(shutdown));

    let result = ApiServer::new(config, store, tracer.clone()).run(listener, rx).await;
    tracer.shutdown().await;
    result?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Run the frontend until shutdown.
pub async fn start_frontend(config: AppConfig) -> Result<(), StartupError> {
    let tracer = Tracer::from_config(&config.tracing, FRONTEND_SERVICE_NAME)?;
    let client = BackendClient::new(&config.backend, tracer.clone())?;

    let listener = bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        backend = %client.base_url(),
        "Frontend ready"
    );

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(shutdown_on_signal(shutdown));

    let result = FrontendServer::new(config, client, tracer.clone()).run(listener, rx).await;
    tracer.shutdown().await;
    result?;

    tracing::info!("Shutdown complete");
    Ok(())
}
