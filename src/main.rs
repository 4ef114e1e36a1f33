//! HTTP Redirect Router
//!
//! Matches every incoming request URL against the rules of a JSON route
//! file and answers with a redirect to the best rule's destination.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌──────────────────────────────────────────────────┐
//!                     │                 REDIRECT ROUTER                  │
//!                     │                                                  │
//!   Client Request    │  ┌─────────┐   ┌──────────┐   ┌──────────────┐   │
//!   ──────────────────┼─▶│  http   │──▶│ request  │──▶│   routing    │   │
//!                     │  │ server  │   │ (source) │   │ index+router │   │
//!                     │  └─────────┘   └──────────┘   └──────┬───────┘   │
//!                     │                                      │           │
//!   Client Response   │  ┌──────────┐          ┌─────────────▼────────┐  │
//!   ◀─────────────────┼──│ response │◀─────────│     destination      │  │
//!   302 / 404 / 400   │  └──────────┘          └──────────────────────┘  │
//!                     │                                                  │
//!                     │  config · observability · lifecycle              │
//!                     └──────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use redirect_router::config::{self, ConfigError, ServerConfig};
use redirect_router::observability::{logging, metrics, PrometheusMetrics};
use redirect_router::{HttpServer, Router, Shutdown};

#[derive(Parser)]
#[command(name = "redirect-router", version)]
#[command(about = "HTTP redirect router driven by regex rules", long_about = None)]
struct Cli {
    /// Server settings TOML file. Flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Show debug messages.
    #[arg(long)]
    debug: bool,

    /// Log requests.
    #[arg(long)]
    log: bool,

    /// The address-port endpoint to bind to.
    #[arg(long)]
    endpoint: Option<String>,

    /// The path to the routes JSON config file.
    #[arg(long)]
    route_file: Option<String>,

    /// Metrics address-port endpoint. Disabled if not set.
    #[arg(long)]
    metrics_endpoint: Option<String>,
}

impl Cli {
    fn settings(&self) -> Result<ServerConfig, ConfigError> {
        let mut settings = match &self.config {
            Some(path) => config::load_server_config(path)?,
            None => ServerConfig::default(),
        };

        settings.debug |= self.debug;
        settings.log_requests |= self.log;
        if let Some(endpoint) = &self.endpoint {
            settings.endpoint = endpoint.clone();
        }
        if let Some(route_file) = &self.route_file {
            settings.route_file = route_file.clone();
        }
        if let Some(metrics_endpoint) = &self.metrics_endpoint {
            settings.metrics_endpoint = Some(metrics_endpoint.clone());
        }
        Ok(settings)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = cli.settings();

    let debug = settings.as_ref().map_or(cli.debug, |s| s.debug);
    logging::init(debug);

    tracing::info!(
        "{} v{} starting",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let settings = settings.inspect_err(|e| tracing::error!(error = %e, "Failed to load settings"))?;

    // Rules are loaded once, before any listener starts
    let records = config::load_routes(settings.route_file.as_ref())
        .inspect_err(|e| tracing::error!(error = %e, "Failed to load route file"))?;
    let (router, _diagnostics) = Router::from_config(&records);
    router.log_rules();

    if let Some(metrics_endpoint) = &settings.metrics_endpoint {
        match metrics_endpoint.parse::<SocketAddr>() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics listener");
                }
            }
            Err(_) => tracing::error!(
                metrics_endpoint = %metrics_endpoint,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = HttpServer::bind(&settings)
        .await
        .inspect_err(|e| tracing::error!(error = %e, "Failed to bind"))?;

    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();

    let server = HttpServer::new(&settings, router, Arc::new(PrometheusMetrics));
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
