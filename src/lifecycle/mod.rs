//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Settings → Route file → Build rule index → Metrics listener → Redirect listener
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C or trigger() → Stop accepting → Drain connections → Exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: rules are fully loaded before any listener starts
//! - Fail fast: a missing or unparsable route file is fatal
//! - No reload: configuration changes require a restart

pub mod shutdown;

pub use shutdown::Shutdown;
