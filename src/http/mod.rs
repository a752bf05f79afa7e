//! HTTP plumbing shared by the api and frontend services.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (request id, access log, trace middleware, timeout, body limit)
//!     → service router (api::routes / frontend::routes)
//!     → response.rs (status bodies)
//!     → Send to client
//! ```

pub mod response;
pub mod server;

pub use response::StatusBody;
pub use server::{serve, with_common_layers};
