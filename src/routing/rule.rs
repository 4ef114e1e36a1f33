//! Rule compilation.
//!
//! # Responsibilities
//! - Validate a raw [`RouteConfig`] record
//! - Compile its source regex(es), reusing identical raw patterns
//! - Produce an immutable [`Rule`] or a descriptive [`RuleError`]
//!
//! Checks run in a fixed order (id, source form, patterns, destination,
//! status) and the first failure is reported.

use std::collections::HashMap;

use regex::Regex;
use thiserror::Error;

use crate::config::RouteConfig;
use crate::routing::matcher::{CompositePattern, SourcePattern};
use crate::routing::source::Component;

/// Status used when a record leaves `redirect_status` at 0.
pub const DEFAULT_REDIRECT_STATUS: u16 = 302;

/// Load-time rule error. The offending rule is skipped; loading continues.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("rule ID {0:?} is empty or contains illegal characters")]
    InvalidId(String),

    #[error("missing source URL or composite")]
    MissingSource,

    #[error("rule can't contain both a source URL and any of the source composite fields")]
    AmbiguousSource,

    #[error("{field} regexp won't compile: {source}")]
    Pattern {
        field: &'static str,
        #[source]
        source: regex::Error,
    },

    #[error("missing destination URL")]
    MissingDestination,

    #[error("invalid redirect status {0} (expected 300-399)")]
    InvalidStatus(i64),
}

/// A validated, compiled rule.
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: String,
    pub source: SourcePattern,
    /// Destination template; only checked to be a URL after substitution.
    pub destination: String,
    pub priority: i64,
    pub redirect_status: u16,
}

/// Compiled regexes keyed by raw pattern string.
///
/// The same raw pattern always compiles to the same regex, whatever URL
/// component it is used for, so one cache serves the whole load pass.
#[derive(Debug, Default)]
pub struct PatternCache {
    compiled: HashMap<String, Regex>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `raw`, or hand back the regex compiled earlier for it.
    pub fn compile(&mut self, field: &'static str, raw: &str) -> Result<Regex, RuleError> {
        if let Some(regex) = self.compiled.get(raw) {
            return Ok(regex.clone());
        }
        let regex = Regex::new(raw).map_err(|source| RuleError::Pattern { field, source })?;
        self.compiled.insert(raw.to_string(), regex.clone());
        Ok(regex)
    }

    /// Number of distinct raw patterns compiled so far.
    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }
}

/// Returns true for a non-empty id made only of `[0-9A-Za-z_-]`.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// Compile a raw record into a [`Rule`].
///
/// Disabled records are the caller's concern; this never looks at `disabled`.
pub fn compile(record: &RouteConfig, patterns: &mut PatternCache) -> Result<Rule, RuleError> {
    if !is_valid_id(&record.id) {
        return Err(RuleError::InvalidId(record.id.clone()));
    }

    let has_url = !record.source_url.is_empty();
    let has_composite = record.has_composite_source();
    let source = match (has_url, has_composite) {
        (false, false) => return Err(RuleError::MissingSource),
        (true, true) => return Err(RuleError::AmbiguousSource),
        (true, false) => SourcePattern::Url(patterns.compile("source_url", &record.source_url)?),
        (false, true) => SourcePattern::Composite(CompositePattern::new([
            patterns.compile(Component::Scheme.field_name(), &record.source_scheme)?,
            patterns.compile(Component::Host.field_name(), &record.source_host)?,
            patterns.compile(Component::Port.field_name(), &record.source_port)?,
            patterns.compile(Component::Path.field_name(), &record.source_path)?,
            patterns.compile(Component::Query.field_name(), &record.source_query)?,
        ])),
    };

    if record.destination_url.is_empty() {
        return Err(RuleError::MissingDestination);
    }

    let redirect_status = match record.redirect_status {
        0 => DEFAULT_REDIRECT_STATUS,
        status @ 300..=399 => status as u16,
        status => return Err(RuleError::InvalidStatus(status)),
    };

    Ok(Rule {
        id: record.id.clone(),
        source,
        destination: record.destination_url.clone(),
        priority: record.priority,
        redirect_status,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url_record(id: &str, source: &str) -> RouteConfig {
        RouteConfig {
            id: id.into(),
            source_url: source.into(),
            destination_url: "https://example.com/".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_compile_defaults() {
        let rule = compile(&url_record("home", "^http://x/$"), &mut PatternCache::new()).unwrap();

        assert_eq!(rule.id, "home");
        assert_eq!(rule.redirect_status, 302);
        assert_eq!(rule.priority, 0);
        assert!(matches!(rule.source, SourcePattern::Url(_)));
    }

    #[test]
    fn test_id_validation() {
        assert!(is_valid_id("a-B_9"));
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("has space"));
        assert!(!is_valid_id("dot.ted"));

        let err = compile(&url_record("bad id", "^x$"), &mut PatternCache::new()).unwrap_err();
        assert!(matches!(err, RuleError::InvalidId(_)));
    }

    #[test]
    fn test_source_form() {
        let mut cache = PatternCache::new();

        let mut missing = url_record("a", "");
        let err = compile(&missing, &mut cache).unwrap_err();
        assert!(matches!(err, RuleError::MissingSource));

        missing.source_url = "^x$".into();
        missing.source_path = "^/$".into();
        let err = compile(&missing, &mut cache).unwrap_err();
        assert!(matches!(err, RuleError::AmbiguousSource));
    }

    #[test]
    fn test_pattern_error_names_field() {
        let record = RouteConfig {
            id: "a".into(),
            source_host: "(".into(),
            destination_url: "https://example.com/".into(),
            ..Default::default()
        };

        match compile(&record, &mut PatternCache::new()).unwrap_err() {
            RuleError::Pattern { field, .. } => assert_eq!(field, "source_host"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_composite_absent_components_match_anything() {
        let record = RouteConfig {
            id: "a".into(),
            source_path: "^/docs".into(),
            destination_url: "https://example.com/".into(),
            ..Default::default()
        };

        let rule = compile(&record, &mut PatternCache::new()).unwrap();
        let SourcePattern::Composite(composite) = &rule.source else {
            panic!("expected composite source");
        };
        assert_eq!(composite.pattern(Component::Scheme).as_str(), "");
        assert!(composite.pattern(Component::Query).is_match("anything"));
    }

    #[test]
    fn test_destination_and_status_checks() {
        let mut cache = PatternCache::new();

        let mut record = url_record("a", "^x$");
        record.destination_url.clear();
        assert!(matches!(compile(&record, &mut cache).unwrap_err(), RuleError::MissingDestination));

        // destination is a template; URL shape is not checked at load time
        record.destination_url = "${whatever}".into();
        assert!(compile(&record, &mut cache).is_ok());

        for status in [299, 400, -1, 1000] {
            record.redirect_status = status;
            assert!(matches!(compile(&record, &mut cache).unwrap_err(), RuleError::InvalidStatus(s) if s == status));
        }
        for status in [300, 301, 308, 399] {
            record.redirect_status = status;
            assert_eq!(compile(&record, &mut cache).unwrap().redirect_status, status as u16);
        }
    }

    #[test]
    fn test_pattern_cache_reuses_raw_patterns() {
        let mut cache = PatternCache::new();
        compile(&url_record("a", "^x$"), &mut cache).unwrap();
        compile(&url_record("b", "^x$"), &mut cache).unwrap();
        compile(&url_record("c", "^y$"), &mut cache).unwrap();

        assert_eq!(cache.len(), 2);
    }
}
