//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! server.toml (optional) + CLI flags
//!     → loader.rs (parse & deserialize)
//!     → ServerConfig
//!
//! routes.json
//!     → loader.rs (parse & deserialize)
//!     → Vec<RouteConfig> (raw, unvalidated)
//!     → routing::index (compile, skip invalid, freeze)
//! ```
//!
//! # Design Decisions
//! - Loaded once at startup; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - I/O and syntax errors are fatal; per-rule semantic errors are not

pub mod loader;
pub mod schema;

pub use loader::{load_routes, load_server_config, ConfigError};
pub use schema::{RouteConfig, ServerConfig};
