//! Logical source URL of a request, and its matchable components.

use std::fmt;

/// The URL components a composite rule can match against, in trie order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    Scheme,
    Host,
    Port,
    Path,
    Query,
}

impl Component {
    /// All components, in the order they are tested and captured.
    pub const ALL: [Component; 5] = [
        Component::Scheme,
        Component::Host,
        Component::Port,
        Component::Path,
        Component::Query,
    ];

    /// Name of the route file field holding this component's pattern.
    pub fn field_name(self) -> &'static str {
        match self {
            Component::Scheme => "source_scheme",
            Component::Host => "source_host",
            Component::Port => "source_port",
            Component::Path => "source_path",
            Component::Query => "source_query",
        }
    }
}

/// A reconstructed request URL, e.g. `https://example.com:8443/a?b=c`.
///
/// The full string is what flat rules match; the split components are what
/// composite rules match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUrl {
    url: String,
    scheme: String,
    host: String,
    port: String,
    path: String,
    query: String,
}

impl SourceUrl {
    /// Build from a scheme, an authority (`host[:port]`) and a request target
    /// (`/path[?query]`).
    pub fn new(scheme: &str, authority: &str, path_and_query: &str) -> Self {
        let (host, port) = split_authority(authority);
        let (path, query) = path_and_query
            .split_once('?')
            .unwrap_or((path_and_query, ""));

        Self {
            url: format!("{}://{}{}", scheme, authority, path_and_query),
            scheme: scheme.to_string(),
            host: host.to_string(),
            port: port.to_string(),
            path: path.to_string(),
            query: query.to_string(),
        }
    }

    /// Split an already-assembled `scheme://authority/target` string.
    pub fn parse(url: &str) -> Option<Self> {
        let (scheme, rest) = url.split_once("://")?;
        let end = rest.find(['/', '?']).unwrap_or(rest.len());
        let (authority, target) = rest.split_at(end);
        Some(Self::new(scheme, authority, target))
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }

    pub fn component(&self, component: Component) -> &str {
        match component {
            Component::Scheme => &self.scheme,
            Component::Host => &self.host,
            Component::Port => &self.port,
            Component::Path => &self.path,
            Component::Query => &self.query,
        }
    }
}

impl fmt::Display for SourceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Split `host[:port]`, keeping IPv6 literals (`[::1]:80`) intact.
fn split_authority(authority: &str) -> (&str, &str) {
    if authority.starts_with('[') {
        return match authority.find(']') {
            Some(end) => {
                let (host, rest) = authority.split_at(end + 1);
                (host, rest.strip_prefix(':').unwrap_or(""))
            }
            None => (authority, ""),
        };
    }

    match authority.rsplit_once(':') {
        Some((host, port)) if port.bytes().all(|b| b.is_ascii_digit()) => (host, port),
        _ => (authority, ""),
    }
}
