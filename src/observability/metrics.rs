//! Metrics collection and exposition.
//!
//! # Metrics
//! - `redirect_router_info` (gauge): 1, labelled with the crate version
//! - `redirect_router_requests_total` (counter): all received requests
//! - `redirect_router_not_found_total` (counter): requests matching no rule
//! - `redirect_router_rule_chosen_total` (counter): by `rule`
//! - `redirect_router_rule_malformed_destination_total` (counter): by `rule`
//!
//! # Design Decisions
//! - Handlers only see the [`RedirectMetrics`] trait
//! - All increments are atomic; concurrent handlers never lose updates
//! - The Prometheus exporter runs its own listener, independent of the
//!   redirect listener

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Counters incremented while handling redirect requests.
pub trait RedirectMetrics: Send + Sync {
    /// A request was received.
    fn request(&self);

    /// No rule matched the request.
    fn not_found(&self);

    /// A rule was chosen as the best match.
    fn rule_chosen(&self, rule_id: &str);

    /// A chosen rule produced an unusable destination.
    fn malformed_destination(&self, rule_id: &str);
}

/// Records through the global `metrics` recorder.
///
/// Without an installed recorder every call is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrometheusMetrics;

impl RedirectMetrics for PrometheusMetrics {
    fn request(&self) {
        metrics::counter!("redirect_router_requests_total").increment(1);
    }

    fn not_found(&self) {
        metrics::counter!("redirect_router_not_found_total").increment(1);
    }

    fn rule_chosen(&self, rule_id: &str) {
        metrics::counter!("redirect_router_rule_chosen_total", "rule" => rule_id.to_string())
            .increment(1);
    }

    fn malformed_destination(&self, rule_id: &str) {
        metrics::counter!(
            "redirect_router_rule_malformed_destination_total",
            "rule" => rule_id.to_string()
        )
        .increment(1);
    }
}

/// Install the Prometheus recorder and its scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;

    metrics::describe_counter!(
        "redirect_router_requests_total",
        "The total number of received requests."
    );
    metrics::describe_counter!(
        "redirect_router_not_found_total",
        "The number of requests not matching any rules."
    );
    metrics::describe_counter!(
        "redirect_router_rule_chosen_total",
        "The number of times a rule has been chosen as the best match."
    );
    metrics::describe_counter!(
        "redirect_router_rule_malformed_destination_total",
        "The number of times a rule has resulted in an invalid destination URL."
    );
    metrics::gauge!("redirect_router_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);

    tracing::info!(address = %addr, "Metrics listener started");
    Ok(())
}

/// In-process counters, readable back by the embedding application.
#[derive(Debug, Default)]
pub struct CountingMetrics {
    requests: AtomicU64,
    not_found: AtomicU64,
    chosen: DashMap<String, AtomicU64>,
    malformed: DashMap<String, AtomicU64>,
}

impl CountingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::Relaxed)
    }

    pub fn not_found_count(&self) -> u64 {
        self.not_found.load(Ordering::Relaxed)
    }

    pub fn chosen_count(&self, rule_id: &str) -> u64 {
        read(&self.chosen, rule_id)
    }

    pub fn malformed_count(&self, rule_id: &str) -> u64 {
        read(&self.malformed, rule_id)
    }
}

fn read(counters: &DashMap<String, AtomicU64>, rule_id: &str) -> u64 {
    counters
        .get(rule_id)
        .map_or(0, |count| count.load(Ordering::Relaxed))
}

fn bump(counters: &DashMap<String, AtomicU64>, rule_id: &str) {
    if let Some(count) = counters.get(rule_id) {
        count.fetch_add(1, Ordering::Relaxed);
        return;
    }
    counters
        .entry(rule_id.to_string())
        .or_default()
        .fetch_add(1, Ordering::Relaxed);
}

impl RedirectMetrics for CountingMetrics {
    fn request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    fn not_found(&self) {
        self.not_found.fetch_add(1, Ordering::Relaxed);
    }

    fn rule_chosen(&self, rule_id: &str) {
        bump(&self.chosen, rule_id);
    }

    fn malformed_destination(&self, rule_id: &str) {
        bump(&self.malformed, rule_id);
    }
}
