//! Structured logging.
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` wins over the `--debug` default
//! - Access log lines go to their own target so they can be filtered apart

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Target of access log events.
pub const ACCESS_TARGET: &str = "redirect_router::access";

/// Default filter directive when `RUST_LOG` is not set.
pub fn default_directive(debug: bool) -> &'static str {
    if debug {
        "redirect_router=debug,tower_http=debug"
    } else {
        "redirect_router=info"
    }
}

/// Initialize the global tracing subscriber.
pub fn init(debug: bool) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directive(debug).into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// One line per handled request: client, result status, rule, source and
/// destination. Absent values are logged as empty strings.
pub fn log_request(
    client: &str,
    status: u16,
    rule_id: Option<&str>,
    source: &str,
    destination: Option<&str>,
) {
    tracing::info!(
        target: ACCESS_TARGET,
        client = %client,
        status,
        rule = rule_id.unwrap_or(""),
        source = %source,
        destination = destination.unwrap_or(""),
        "Request"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert!(default_directive(true).contains("redirect_router=debug"));
        assert_eq!(default_directive(false), "redirect_router=info");
    }
}
