//! Shared utilities for integration and load testing.
#![allow(dead_code)]

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use kv_trace::api::{ApiServer, API_SERVICE_NAME};
use kv_trace::config::{AppConfig, BackendConfig, DatabaseConfig};
use kv_trace::frontend::{BackendClient, FrontendServer, FRONTEND_SERVICE_NAME};
use kv_trace::store::Store;
use kv_trace::telemetry::{Status, Tracer};
use opentelemetry::KeyValue;
use opentelemetry_sdk::trace::{InMemorySpanExporter, SpanData};
use kv_trace::Shutdown;

/// A running backend api backed by a temporary SQLite file.
pub struct TestApi {
    pub addr: SocketAddr,
    pub tracer: Tracer,
    shutdown: Shutdown,
    _dir: TempDir,
}

impl TestApi {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestApi {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// A running frontend pointed at some backend.
pub struct TestFrontend {
    pub addr: SocketAddr,
    pub tracer: Tracer,
    pub exporter: InMemorySpanExporter,
    shutdown: Shutdown,
}

impl TestFrontend {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestFrontend {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// A running api whose spans land in an in-memory exporter.
pub struct TracedApi {
    pub api: TestApi,
    pub exporter: InMemorySpanExporter,
}

impl std::ops::Deref for TracedApi {
    type Target = TestApi;

    fn deref(&self) -> &TestApi {
        &self.api
    }
}

/// Start an api whose spans land in an in-memory exporter.
pub async fn spawn_api() -> TracedApi {
    let exporter = InMemorySpanExporter::default();
    let tracer = Tracer::with_exporter(API_SERVICE_NAME, exporter.clone());
    TracedApi {
        api: spawn_api_with_tracer(tracer).await,
        exporter,
    }
}

/// Start an api that reports spans through `tracer`.
pub async fn spawn_api_with_tracer(tracer: Tracer) -> TestApi {
    let dir = tempfile::tempdir().unwrap();

    let database = DatabaseConfig {
        path: dir.path().join("kv.db").to_string_lossy().into_owned(),
        query_timeout_secs: 5,
    };
    let store = Store::new(&database, tracer.clone());
    store.ensure_schema().await.unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    let server = ApiServer::new(AppConfig::default(), store, tracer.clone());
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    TestApi {
        addr,
        tracer,
        shutdown,
        _dir: dir,
    }
}

/// Start a frontend that forwards to `api_url`.
pub async fn spawn_frontend(api_url: &str) -> TestFrontend {
    let exporter = InMemorySpanExporter::default();
    let tracer = Tracer::with_exporter(FRONTEND_SERVICE_NAME, exporter.clone());

    let backend = BackendConfig {
        api_url: api_url.to_string(),
        request_timeout_secs: 2,
    };
    let client = BackendClient::new(&backend, tracer.clone()).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    let server = FrontendServer::new(AppConfig::default(), client, tracer.clone());
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    TestFrontend {
        addr,
        tracer,
        exporter,
        shutdown,
    }
}

/// The finished span called `name`.
pub fn find_span<'a>(spans: &'a [SpanData], name: &str) -> &'a SpanData {
    spans
        .iter()
        .find(|s| s.name == name)
        .unwrap_or_else(|| panic!("no span named {:?}", name))
}

pub fn is_error(span: &SpanData) -> bool {
    matches!(span.status, Status::Error { .. })
}

pub fn has_attribute(span: &SpanData, attribute: KeyValue) -> bool {
    span.attributes.contains(&attribute)
}

/// HTTP client that does not follow redirects.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}

/// An address nothing is listening on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Start a programmable mock backend on an ephemeral port.
pub async fn start_programmable_backend<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = (u16, String)> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let mut request = [0u8; 4096];
                        let _ = socket.read(&mut request).await;
                        let (status, body) = f().await;
                        let status_text = match status {
                            200 => "200 OK",
                            201 => "201 Created",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}
