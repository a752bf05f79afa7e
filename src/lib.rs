//! kv-trace library.
//!
//! A two-tier key/value service with distributed trace propagation: a
//! frontend that renders and accepts entries, and a backend api that stores
//! them in SQLite.

// Core subsystems
pub mod config;
pub mod http;
pub mod store;
pub mod telemetry;

// Services
pub mod api;
pub mod frontend;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::schema::AppConfig;
pub use lifecycle::Shutdown;
