//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Rule Compilation (at startup):
//!     RouteConfig[]
//!     → rule.rs (validate, compile regexes once per raw pattern)
//!     → index.rs (flat groups by URL pattern, trie by component patterns)
//!     → Freeze as immutable Router
//!
//! Incoming Request:
//!     SourceUrl (scheme, host, port, path, query)
//!     → index.rs (candidate rules)
//!     → router.rs (highest priority, first loaded on ties)
//!     → destination.rs (substitute captures, validate URL)
//!     → Redirect | NotFound | MalformedDestination
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - One bad rule never prevents the others from loading
//! - Deterministic: same input always matches same route

pub mod destination;
pub mod index;
pub mod matcher;
pub mod router;
pub mod rule;
pub mod source;

pub use destination::DestinationError;
pub use index::{LoadDiagnostic, RuleId, RuleIndex};
pub use router::{RouteOutcome, Router};
pub use rule::{Rule, RuleError};
pub use source::{Component, SourceUrl};
