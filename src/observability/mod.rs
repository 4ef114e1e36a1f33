//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Rule loading and request handling produce:
//!     → logging.rs (structured log events, optional access log)
//!     → metrics.rs (counters behind the RedirectMetrics trait)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape), when configured
//! ```
//!
//! # Design Decisions
//! - Structured logging for machine parsing
//! - Metrics are cheap (atomic increments)
//! - Diagnostics stay in local logs, never in response bodies

pub mod logging;
pub mod metrics;

pub use metrics::{CountingMetrics, PrometheusMetrics, RedirectMetrics};
