//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Own the frozen [`RuleIndex`]
//! - Pick the single best rule for a source URL
//! - Turn the pick into a redirect, a no-match, or a malformed destination
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Highest `priority` wins; equal priorities go to the rule loaded first
//! - Explicit NotFound rather than silent default

use crate::config::RouteConfig;
use crate::routing::destination::{self, DestinationError};
use crate::routing::index::{LoadDiagnostic, RuleIndex};
use crate::routing::rule::Rule;
use crate::routing::source::SourceUrl;

/// Result of routing one source URL.
#[derive(Debug)]
pub enum RouteOutcome<'a> {
    Redirect { rule: &'a Rule, location: String },
    NotFound,
    MalformedDestination { rule: &'a Rule, error: DestinationError },
}

/// The redirect routing engine.
#[derive(Debug, Default)]
pub struct Router {
    index: RuleIndex,
}

impl Router {
    pub fn new(index: RuleIndex) -> Self {
        Self { index }
    }

    /// Build the router from raw records, returning rejected rules alongside.
    pub fn from_config(records: &[RouteConfig]) -> (Self, Vec<LoadDiagnostic>) {
        let (index, diagnostics) = RuleIndex::build(records);
        (Self::new(index), diagnostics)
    }

    pub fn index(&self) -> &RuleIndex {
        &self.index
    }

    /// The best matching rule, if any.
    pub fn resolve(&self, source: &SourceUrl) -> Option<&Rule> {
        // Candidates come in load order; max_by keeps the last maximum,
        // so compare ids in reverse to keep the first one.
        self.index
            .candidates(source)
            .into_iter()
            .max_by(|&a, &b| {
                self.index
                    .rule(a)
                    .priority
                    .cmp(&self.index.rule(b).priority)
                    .then(b.cmp(&a))
            })
            .map(|id| self.index.rule(id))
    }

    /// Resolve the best rule and build its destination.
    pub fn route(&self, source: &SourceUrl) -> RouteOutcome<'_> {
        let Some(rule) = self.resolve(source) else {
            return RouteOutcome::NotFound;
        };

        match destination::resolve(rule, source) {
            Ok(location) => RouteOutcome::Redirect { rule, location },
            Err(error) => RouteOutcome::MalformedDestination { rule, error },
        }
    }

    /// Log every loaded rule at debug level.
    pub fn log_rules(&self) {
        for (i, rule) in self.index.rules().iter().enumerate() {
            tracing::debug!(
                rule = %rule.id,
                source = %rule.source,
                destination = %rule.destination,
                redirect_status = rule.redirect_status,
                priority = rule.priority,
                "Rule {}",
                i
            );
        }
    }
}
