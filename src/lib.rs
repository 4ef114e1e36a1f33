//! HTTP redirect router library.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::{RouteConfig, ServerConfig};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::Router;
