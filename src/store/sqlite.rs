//! SQLite implementation of the store.
//!
//! rusqlite is synchronous, so every operation runs on the blocking pool via
//! `tokio::task::spawn_blocking` and is raced against the query timeout. An
//! operation that loses the race is interrupted, so an abandoned write rolls
//! back instead of committing later.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use opentelemetry::KeyValue;
use rusqlite::{ffi, params, Connection, InterruptHandle};

use crate::config::DatabaseConfig;
use crate::observability::metrics;
use crate::store::entry::Entry;
use crate::store::error::{StoreError, StoreResult};
use crate::telemetry::{propagation, ActiveSpan, Context, SpanKind, Tracer};

const TABLE: &str = "kv_store";

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS kv_store (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    key TEXT NOT NULL,
    value TEXT NOT NULL
)";

const INSERT_ENTRY: &str = "INSERT INTO kv_store (key, value) VALUES (?1, ?2)";

// No ORDER BY: rows come back in whatever order the store returns them.
const SELECT_ALL: &str = "SELECT id, key, value FROM kv_store";

/// Factory for short-lived store connections.
///
/// Cloning is cheap; no connection is held between operations.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
    query_timeout: Duration,
    tracer: Tracer,
}

/// A connection scoped to a single operation. Closed on drop.
struct StoreConnection {
    conn: Connection,
}

impl StoreConnection {
    fn open(path: &Path, busy_timeout: Duration) -> rusqlite::Result<Self> {
        let conn = Connection::open(path)?;
        // Concurrent writers wait for the lock instead of failing with SQLITE_BUSY
        conn.busy_timeout(busy_timeout)?;
        Ok(Self { conn })
    }
}

/// Lets the async side abandon an operation running on the blocking pool.
#[derive(Default)]
struct Interrupt {
    cancelled: AtomicBool,
    handle: Mutex<Option<InterruptHandle>>,
}

impl Interrupt {
    /// Register the operation's connection. Fails if the operation was
    /// abandoned before the connection opened.
    fn attach(&self, conn: &Connection) -> rusqlite::Result<()> {
        let mut handle = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        self.check()?;
        *handle = Some(conn.get_interrupt_handle());
        Ok(())
    }

    /// Fails once the operation has been abandoned.
    fn check(&self) -> rusqlite::Result<()> {
        if self.cancelled.load(Ordering::SeqCst) {
            return Err(rusqlite::Error::SqliteFailure(
                ffi::Error::new(ffi::SQLITE_INTERRUPT),
                Some("operation abandoned".to_string()),
            ));
        }
        Ok(())
    }

    /// Abandon the operation and interrupt any statement in flight.
    fn cancel(&self) {
        let handle = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        self.cancelled.store(true, Ordering::SeqCst);
        if let Some(handle) = handle.as_ref() {
            handle.interrupt();
        }
    }
}

impl Store {
    pub fn new(config: &DatabaseConfig, tracer: Tracer) -> Self {
        Self {
            path: PathBuf::from(&config.path),
            query_timeout: Duration::from_secs(config.query_timeout_secs),
            tracer,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the `kv_store` table if it does not exist. Safe to call on
    /// every start.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        let span = self.query_span("CREATE TABLE", CREATE_TABLE, &Context::new());
        let sql = annotate(CREATE_TABLE, span.context());

        self.run("ensure_schema", span, move |conn, _| {
            conn.execute(&sql, [])?;
            Ok(())
        })
        .await
        .map_err(StoreError::Unavailable)?;

        tracing::info!(path = %self.path.display(), table = TABLE, "Store schema ready");
        Ok(())
    }

    /// Insert one entry in its own transaction.
    pub async fn insert(&self, cx: &Context, key: &str, value: &str) -> StoreResult<()> {
        let span = self.query_span("INSERT", INSERT_ENTRY, cx);
        let sql = annotate(INSERT_ENTRY, span.context());
        let (key, value) = (key.to_owned(), value.to_owned());

        self.run("insert", span, move |conn, interrupt| {
            let tx = conn.transaction()?;
            tx.execute(&sql, params![key, value])?;
            interrupt.check()?;
            tx.commit()
        })
        .await
        .map_err(StoreError::Write)
    }

    /// Every entry in the table.
    pub async fn list_all(&self, cx: &Context) -> StoreResult<Vec<Entry>> {
        let span = self.query_span("SELECT", SELECT_ALL, cx);
        let sql = annotate(SELECT_ALL, span.context());

        self.run("list_all", span, move |conn, _| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], |row| {
                Ok(Entry {
                    id: row.get(0)?,
                    key: row.get(1)?,
                    value: row.get(2)?,
                })
            })?;
            let entries = rows.collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(entries)
        })
        .await
        .map_err(StoreError::Read)
    }

    fn query_span(&self, operation: &'static str, statement: &'static str, parent: &Context) -> ActiveSpan {
        let span = self
            .tracer
            .start_span(format!("{} {}", operation, TABLE), SpanKind::Client, parent);
        span.set_attribute(KeyValue::new("db.system", "sqlite"));
        span.set_attribute(KeyValue::new("db.name", self.path.display().to_string()));
        span.set_attribute(KeyValue::new("db.operation", operation));
        span.set_attribute(KeyValue::new("db.statement", statement));
        span
    }

    /// Open a connection, run `f` on it, and close it, on the blocking pool.
    async fn run<T, F>(&self, operation: &'static str, mut span: ActiveSpan, f: F) -> Result<T, String>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection, &Interrupt) -> rusqlite::Result<T> + Send + 'static,
    {
        let started = Instant::now();
        let path = self.path.clone();
        let busy_timeout = self.query_timeout;
        let interrupt = Arc::new(Interrupt::default());

        let task = tokio::task::spawn_blocking({
            let interrupt = interrupt.clone();
            move || {
                let mut connection = StoreConnection::open(&path, busy_timeout)?;
                interrupt.attach(&connection.conn)?;
                f(&mut connection.conn, &interrupt)
            }
        });

        let outcome = match tokio::time::timeout(self.query_timeout, task).await {
            Ok(Ok(Ok(value))) => Ok(value),
            Ok(Ok(Err(e))) => Err(e.to_string()),
            Ok(Err(e)) => Err(format!("store task failed: {}", e)),
            Err(_) => {
                interrupt.cancel();
                Err(format!("timed out after {:?}", self.query_timeout))
            }
        };

        metrics::record_store_query(operation, outcome.is_ok(), started);
        if let Err(message) = &outcome {
            tracing::warn!(operation, error = %message, "Store operation failed");
            span.record_error(message);
        }
        span.end();

        outcome
    }
}

/// Attach the trace context to a statement as a trailing SQL comment.
fn annotate(sql: &str, cx: &Context) -> String {
    match propagation::traceparent(cx) {
        Some(traceparent) => format!("{} /*traceparent='{}'*/", sql, traceparent),
        None => sql.to_string(),
    }
}
