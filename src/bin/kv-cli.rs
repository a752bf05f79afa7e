use clap::{Parser, Subcommand};
use serde_json::Value;

use kv_trace::config::BackendConfig;
use kv_trace::frontend::BackendClient;
use kv_trace::telemetry::{Context, SpanKind, Tracer};

#[derive(Parser)]
#[command(name = "kv-cli")]
#[command(about = "Command-line client for the kv-trace backend api", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:5000")]
    url: String,

    /// Request timeout in seconds
    #[arg(short, long, default_value_t = 5)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add one entry
    Add { key: String, value: String },
    /// List every entry
    List,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let tracer = Tracer::disabled("kv-cli");
    let config = BackendConfig {
        api_url: cli.url,
        request_timeout_secs: cli.timeout,
    };
    let client = BackendClient::new(&config, tracer.clone())?;

    let span = tracer.start_span("kv-cli", SpanKind::Internal, &Context::new());
    let cx = span.context().clone();
    eprintln!("trace id: {}", span.trace_id());

    let output: Value = match cli.command {
        Commands::Add { key, value } => {
            client.add_entry(&cx, &key, &value).await?;
            serde_json::json!({ "status": "success" })
        }
        Commands::List => serde_json::to_value(client.list_entries(&cx).await?)?,
    };
    span.end();

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
