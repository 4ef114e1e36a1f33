//! Configuration schema definitions.
//!
//! Two documents feed the router at startup: the route file (a JSON array of
//! [`RouteConfig`] records) and the server settings ([`ServerConfig`]), which
//! may come from a TOML file and are then overridden by CLI flags.

use serde::{Deserialize, Serialize};

/// Server settings for the redirect router.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address-port endpoint the redirect listener binds to.
    pub endpoint: String,

    /// Path to the JSON route file.
    pub route_file: String,

    /// Address-port endpoint for the Prometheus listener. Disabled if unset.
    pub metrics_endpoint: Option<String>,

    /// Show debug messages (loaded rules, malformed destination details).
    pub debug: bool,

    /// Emit one access log line per request.
    pub log_requests: bool,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            endpoint: "0.0.0.0:8080".to_string(),
            route_file: "routes.json".to_string(),
            metrics_endpoint: None,
            debug: false,
            log_requests: false,
            request_timeout_secs: 30,
        }
    }
}

/// A raw rule record as it appears in the route file.
///
/// Nothing here is validated; see [`crate::routing::rule::compile`].
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Rule identifier, used in logs and metric labels.
    pub id: String,

    /// Disabled rules are never compiled nor indexed.
    pub disabled: bool,

    /// Full-URL source pattern. Exclusive with the composite fields below.
    pub source_url: String,

    pub source_scheme: String,
    pub source_host: String,
    pub source_port: String,
    pub source_path: String,
    pub source_query: String,

    /// Destination template, may reference named captures as `${name}`.
    pub destination_url: String,

    /// Higher priority wins when several rules match.
    pub priority: i64,

    /// Redirect status code; 0 means the default (302).
    pub redirect_status: i64,
}

impl RouteConfig {
    /// True if any of the composite source fields is set.
    pub fn has_composite_source(&self) -> bool {
        [
            &self.source_scheme,
            &self.source_host,
            &self.source_port,
            &self.source_path,
            &self.source_query,
        ]
        .iter()
        .any(|field| !field.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_defaults_and_unknown_fields() {
        let json = r#"{"id": "a", "source_url": "^x$", "destination_url": "https://y", "comment": "ignored"}"#;
        let route: RouteConfig = serde_json::from_str(json).unwrap();

        assert_eq!(route.id, "a");
        assert!(!route.disabled);
        assert_eq!(route.priority, 0);
        assert_eq!(route.redirect_status, 0);
        assert!(!route.has_composite_source());
    }

    #[test]
    fn test_composite_detection() {
        let route = RouteConfig {
            source_port: "^8080$".into(),
            ..Default::default()
        };
        assert!(route.has_composite_source());
    }

    #[test]
    fn test_server_config_partial_toml() {
        let config: ServerConfig = toml::from_str("endpoint = \"127.0.0.1:9000\"\nlog_requests = true\n").unwrap();

        assert_eq!(config.endpoint, "127.0.0.1:9000");
        assert!(config.log_requests);
        assert_eq!(config.route_file, "routes.json");
        assert!(config.metrics_endpoint.is_none());
        assert_eq!(config.request_timeout_secs, 30);
    }
}
