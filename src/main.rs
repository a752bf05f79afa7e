//! kv-trace service binary.
//!
//! ```text
//!   browser ──▶ frontend (GET/POST /) ──HTTP + traceparent──▶ api (/add, /get_all) ──▶ SQLite
//!                  │                                             │
//!                  └────────────── spans ──▶ collector ◀─────────┘
//! ```
//!
//! Run one service per process:
//!
//! ```text
//! kv-trace api [--config kv.toml]
//! kv-trace frontend [--config kv.toml]
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use kv_trace::config::load_config;
use kv_trace::lifecycle::{start_api, start_frontend};
use kv_trace::observability::{logging::init_logging, metrics::init_metrics};

#[derive(Parser)]
#[command(name = "kv-trace")]
#[command(about = "Traced key/value frontend and backend services", long_about = None)]
struct Cli {
    /// TOML configuration file; environment variables override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    service: Service,
}

#[derive(Subcommand)]
enum Service {
    /// Backend api: POST /add, GET /get_all
    Api,
    /// User-facing frontend: GET /, POST /
    Frontend,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        tracing_enabled = config.tracing.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    match cli.service {
        Service::Api => start_api(config).await?,
        Service::Frontend => start_frontend(config).await?,
    }

    Ok(())
}
