//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the redirect handler for every path and method
//! - Wire up middleware (tracing, timeout)
//! - Bind server to listener, stop on shutdown signal
//! - Drive one request from source reconstruction to response

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    response::Response,
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServerConfig;
use crate::http::request::{request_source, RequestSource};
use crate::http::response;
use crate::lifecycle::shutdown;
use crate::observability::logging::log_request;
use crate::observability::RedirectMetrics;
use crate::routing::{RouteOutcome, Router as RedirectRouter};

/// Error type for running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("error while running HTTP server: {0}")]
    Serve(#[from] std::io::Error),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<RedirectRouter>,
    pub metrics: Arc<dyn RedirectMetrics>,
    pub log_requests: bool,
}

/// HTTP server for the redirect router.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server around an already-built rule router.
    pub fn new(
        config: &ServerConfig,
        rules: RedirectRouter,
        metrics: Arc<dyn RedirectMetrics>,
    ) -> Self {
        let state = AppState {
            router: Arc::new(rules),
            metrics,
            log_requests: config.log_requests,
        };

        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .fallback(redirect_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// The Axum router, for embedding or driving directly.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Bind the configured endpoint.
    pub async fn bind(config: &ServerConfig) -> Result<TcpListener, ServerError> {
        TcpListener::bind(&config.endpoint)
            .await
            .map_err(|source| ServerError::Bind {
                address: config.endpoint.clone(),
                source,
            })
    }

    /// Run the server until a shutdown signal is received.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), ServerError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Redirect handler.
///
/// Received → SourceBuilt → NotFound (404)
///                        → Matched → MalformedDestination (400)
///                                  → Redirect (rule status)
async fn redirect_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    state.metrics.request();

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let RequestSource { client, source } = request_source(request.headers(), request.uri(), peer);

    match state.router.route(&source) {
        RouteOutcome::NotFound => {
            state.metrics.not_found();
            if state.log_requests {
                log_request(&client, 404, None, source.as_str(), None);
            }
            response::not_found()
        }
        RouteOutcome::MalformedDestination { rule, error } => {
            state.metrics.rule_chosen(&rule.id);
            state.metrics.malformed_destination(&rule.id);
            tracing::debug!(
                rule = %rule.id,
                source = %source,
                template = %rule.destination,
                error = %error,
                "Malformed destination"
            );
            if state.log_requests {
                log_request(&client, 400, Some(rule.id.as_str()), source.as_str(), None);
            }
            response::malformed_destination()
        }
        RouteOutcome::Redirect { rule, location } => {
            state.metrics.rule_chosen(&rule.id);
            if state.log_requests {
                log_request(
                    &client,
                    rule.redirect_status,
                    Some(rule.id.as_str()),
                    source.as_str(),
                    Some(location.as_str()),
                );
            }
            response::redirect(rule.redirect_status, &location)
        }
    }
}
