//! Request inspection.
//!
//! # Responsibilities
//! - Reconstruct the logical request URL as seen by the client
//! - Determine the client address for logging
//!
//! # Design Decisions
//! - `X-Forwarded-*` headers win over transport-level values
//! - Only the first value of a repeated header is used
//! - Non-UTF-8 header values are treated as absent

use std::net::SocketAddr;

use axum::http::{header, HeaderMap, HeaderName, Uri};

use crate::routing::SourceUrl;

pub const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");
pub const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
pub const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

const DEFAULT_SCHEME: &str = "http";

/// What the router needs to know about an inbound request.
#[derive(Debug, Clone)]
pub struct RequestSource {
    /// Client address (forwarded or peer), for logging only.
    pub client: String,
    pub source: SourceUrl,
}

fn first_value<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Build the [`RequestSource`] from request headers, URI and peer address.
pub fn request_source(headers: &HeaderMap, uri: &Uri, peer: Option<SocketAddr>) -> RequestSource {
    let client = first_value(headers, &X_FORWARDED_FOR)
        .map(str::to_string)
        .or_else(|| peer.map(|addr| addr.to_string()))
        .unwrap_or_default();

    let scheme = first_value(headers, &X_FORWARDED_PROTO).unwrap_or(DEFAULT_SCHEME);

    let host = first_value(headers, &X_FORWARDED_HOST)
        .or_else(|| first_value(headers, &header::HOST))
        .or_else(|| uri.authority().map(|authority| authority.as_str()))
        .unwrap_or("");

    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    RequestSource {
        client,
        source: SourceUrl::new(scheme, host, target),
    }
}
