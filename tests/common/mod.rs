//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use redirect_router::observability::CountingMetrics;
use redirect_router::{HttpServer, RouteConfig, Router, ServerConfig, Shutdown};

/// A redirect router running on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub metrics: Arc<CountingMetrics>,
    pub shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, target: &str) -> String {
        format!("http://{}{}", self.addr, target)
    }
}

/// Start a server for the given rule records.
pub async fn start_server(records: &[RouteConfig]) -> TestServer {
    let mut settings = ServerConfig::default();
    settings.endpoint = "127.0.0.1:0".to_string();
    settings.log_requests = true;

    let (router, _) = Router::from_config(records);
    let metrics = Arc::new(CountingMetrics::new());
    let listener = HttpServer::bind(&settings).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&settings, router, metrics.clone());
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;

    TestServer {
        addr,
        metrics,
        shutdown,
    }
}

/// A client that reports redirects instead of following them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}

pub fn rule(id: &str, source: &str, destination: &str, priority: i64) -> RouteConfig {
    RouteConfig {
        id: id.into(),
        source_url: source.into(),
        destination_url: destination.into(),
        priority,
        ..Default::default()
    }
}

/// Write `content` to a per-process scratch file.
#[allow(dead_code)]
pub fn scratch_file(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("redirect-router-it-{}-{}", std::process::id(), name));
    std::fs::write(&path, content).unwrap();
    path
}
