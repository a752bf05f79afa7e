//! Relational store for key/value entries.
//!
//! # Data Flow
//! ```text
//! handler (Context)
//!     → Store::{insert, list_all}
//!     → spawn_blocking: open connection → one statement → commit → close
//!     → Entry rows / StoreError
//! ```
//!
//! # Design Decisions
//! - No pooling: a connection lives exactly as long as one operation
//! - Every statement runs under a client span and carries its traceparent
//!   as a trailing SQL comment
//! - Statements are bounded by `database.query_timeout_secs`; a statement
//!   still running at the deadline is interrupted and its transaction
//!   rolled back

pub mod entry;
pub mod error;
pub mod sqlite;

pub use entry::Entry;
pub use error::{StoreError, StoreResult};
pub use sqlite::Store;
