//! Destination resolution.
//!
//! # Responsibilities
//! - Re-run the chosen rule's pattern(s) to collect named captures
//! - Substitute `${name}` tokens in the destination template
//! - Validate the result as an absolute URL usable as a `Location` value
//!
//! # Design Decisions
//! - Only names declared as named groups are substituted; any other
//!   `${...}` text is kept verbatim
//! - One left-to-right pass; substituted text is never re-scanned
//! - The `Location` value is the substituted string itself, not a
//!   re-serialized URL

use axum::http::HeaderValue;
use thiserror::Error;
use url::Url;

use crate::routing::matcher::{Captures, Matcher};
use crate::routing::rule::Rule;
use crate::routing::source::SourceUrl;

/// Per-request failure to produce a usable destination.
#[derive(Debug, Error)]
pub enum DestinationError {
    /// The rule no longer matches the source it was chosen for.
    #[error("rule {rule:?} does not match {source_url:?}")]
    NoMatch { rule: String, source_url: String },

    #[error("destination {destination:?} is not an absolute URL: {reason}")]
    Malformed { destination: String, reason: String },
}

/// Build the destination URL for `rule` from `source`.
pub fn resolve(rule: &Rule, source: &SourceUrl) -> Result<String, DestinationError> {
    let captures = rule
        .source
        .captures(source)
        .ok_or_else(|| DestinationError::NoMatch {
            rule: rule.id.clone(),
            source_url: source.as_str().to_string(),
        })?;

    let destination = substitute(&rule.destination, &captures);
    validate(&destination)?;
    Ok(destination)
}

/// Replace `${name}` with the captured value for every declared `name`.
pub fn substitute(template: &str, captures: &Captures) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let token = &rest[start..];

        let replaced = token[2..].find('}').and_then(|end| {
            let name = &token[2..2 + end];
            captures.get(name).map(|value| (value, 2 + end + 1))
        });

        match replaced {
            Some((value, consumed)) => {
                out.push_str(value);
                rest = &token[consumed..];
            }
            None => {
                out.push_str("${");
                rest = &token[2..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn validate(destination: &str) -> Result<(), DestinationError> {
    let malformed = |reason: String| DestinationError::Malformed {
        destination: destination.to_string(),
        reason,
    };

    Url::parse(destination).map_err(|e| malformed(e.to_string()))?;
    // url strips tabs and newlines while parsing; a header value can't hold them
    HeaderValue::from_str(destination).map_err(|e| malformed(e.to_string()))?;
    Ok(())
}
