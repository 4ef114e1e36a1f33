//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (reconstruct source URL, client address)
//!     → [routing decides rule and destination]
//!     → response.rs (redirect, 404 or 400)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{request_source, RequestSource};
pub use server::{AppState, HttpServer, ServerError};
