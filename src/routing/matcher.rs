//! Rule source patterns and how they are evaluated against a source URL.
//!
//! # Design Decisions
//! - Regexes are unanchored; anchor in the pattern when needed (`^...$`)
//! - An empty composite component pattern matches anything
//! - Only named groups are exposed as captures; unnamed ones are ignored

use std::collections::HashMap;
use std::fmt;

use regex::Regex;

use crate::routing::source::{Component, SourceUrl};

/// Named capture group → matched text.
///
/// Every group declared by the pattern is present; groups that did not take
/// part in the match map to an empty string.
pub type Captures = HashMap<String, String>;

/// Trait for matching source URLs against a rule's pattern(s).
pub trait Matcher: Send + Sync + fmt::Debug {
    /// Returns true if the source URL matches.
    fn matches(&self, source: &SourceUrl) -> bool;

    /// Returns the named captures of a match, or `None` if there is no match.
    fn captures(&self, source: &SourceUrl) -> Option<Captures>;
}

/// A rule's compiled source: one full-URL regex, or one regex per component.
#[derive(Debug, Clone)]
pub enum SourcePattern {
    Url(Regex),
    Composite(CompositePattern),
}

impl Matcher for SourcePattern {
    fn matches(&self, source: &SourceUrl) -> bool {
        match self {
            SourcePattern::Url(regex) => regex.is_match(source.as_str()),
            SourcePattern::Composite(composite) => composite.matches(source),
        }
    }

    fn captures(&self, source: &SourceUrl) -> Option<Captures> {
        match self {
            SourcePattern::Url(regex) => {
                let mut captures = Captures::new();
                collect_captures(regex, source.as_str(), &mut captures).then_some(captures)
            }
            SourcePattern::Composite(composite) => composite.captures(source),
        }
    }
}

impl fmt::Display for SourcePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourcePattern::Url(regex) => write!(f, "{}", regex.as_str()),
            SourcePattern::Composite(composite) => {
                for (i, (component, regex)) in composite.components().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}={:?}", component.field_name(), regex.as_str())?;
                }
                Ok(())
            }
        }
    }
}

/// Per-component patterns of a composite rule, in [`Component::ALL`] order.
#[derive(Debug, Clone)]
pub struct CompositePattern {
    patterns: [Regex; 5],
}

impl CompositePattern {
    pub fn new(patterns: [Regex; 5]) -> Self {
        Self { patterns }
    }

    pub fn pattern(&self, component: Component) -> &Regex {
        &self.patterns[component as usize]
    }

    fn components(&self) -> impl Iterator<Item = (Component, &Regex)> {
        Component::ALL.into_iter().zip(self.patterns.iter())
    }
}

impl Matcher for CompositePattern {
    fn matches(&self, source: &SourceUrl) -> bool {
        // All components must pass (AND)
        self.components()
            .all(|(component, regex)| regex.is_match(source.component(component)))
    }

    /// Later components overwrite earlier ones on duplicate group names.
    fn captures(&self, source: &SourceUrl) -> Option<Captures> {
        let mut captures = Captures::new();
        for (component, regex) in self.components() {
            if !collect_captures(regex, source.component(component), &mut captures) {
                return None;
            }
        }
        Some(captures)
    }
}

/// Adds the named groups of `regex` matched against `text`. False on no match.
fn collect_captures(regex: &Regex, text: &str, out: &mut Captures) -> bool {
    let Some(caps) = regex.captures(text) else {
        return false;
    };

    for name in regex.capture_names().flatten() {
        let value = caps.name(name).map_or("", |m| m.as_str());
        out.insert(name.to_string(), value.to_string());
    }
    true
}
