//! Prometheus metrics for option-sync post views.
//!
//! All metrics follow the naming convention: `optsync_<area>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, IntGauge, Opts, Registry, TextEncoder};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // PAGING
    // =========================================================================

    /// Pages successfully fetched and merged
    pub static ref PAGES_FETCHED: Counter = Counter::new(
        "optsync_pages_fetched_total",
        "Total number of option pages fetched and merged"
    ).expect("metric creation failed");

    /// Page fetch failures by reason
    pub static ref PAGE_FAILURES: CounterVec = CounterVec::new(
        Opts::new("optsync_page_failures_total", "Total failed page fetches"),
        &["reason"]  // reason: transport/timeout/in_progress
    ).expect("metric creation failed");

    // =========================================================================
    // DELTA FEED
    // =========================================================================

    /// Deltas applied to an option store
    pub static ref DELTAS_APPLIED: CounterVec = CounterVec::new(
        Opts::new("optsync_deltas_applied_total", "Total deltas applied"),
        &["kind"]  // kind: upsert/deleted
    ).expect("metric creation failed");

    /// Deltas dropped before reaching an option store
    pub static ref DELTAS_DROPPED: CounterVec = CounterVec::new(
        Opts::new("optsync_deltas_dropped_total", "Total deltas dropped"),
        &["reason"]  // reason: decode/foreign_post/unknown_event/lagged
    ).expect("metric creation failed");

    // =========================================================================
    // RECONCILER
    // =========================================================================

    /// Local optimistic mutations applied
    pub static ref OPTIMISTIC_MUTATIONS: Counter = Counter::new(
        "optsync_optimistic_mutations_total",
        "Total optimistic local mutations applied"
    ).expect("metric creation failed");

    /// Ranking recomputations
    pub static ref RANKING_PASSES: Counter = Counter::new(
        "optsync_ranking_passes_total",
        "Total ranking recomputations"
    ).expect("metric creation failed");

    /// Feed gaps that forced a view to rebuild from page one
    pub static ref FEED_RESYNCS: Counter = Counter::new(
        "optsync_feed_resyncs_total",
        "Total view rebuilds after the feed lost deltas"
    ).expect("metric creation failed");

    /// Options held across all mounted views. Each view adds its own
    /// change in size and subtracts what it holds when dropped.
    pub static ref OPTION_STORE_SIZE: IntGauge = IntGauge::new(
        "optsync_option_store_size",
        "Number of options held across all mounted post views"
    ).expect("metric creation failed");
}

/// Handle to the metrics registry
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; already-registered collectors are skipped.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Paging
        Box::new(PAGES_FETCHED.clone()),
        Box::new(PAGE_FAILURES.clone()),
        // Delta feed
        Box::new(DELTAS_APPLIED.clone()),
        Box::new(DELTAS_DROPPED.clone()),
        // Reconciler
        Box::new(OPTIMISTIC_MUTATIONS.clone()),
        Box::new(RANKING_PASSES.clone()),
        Box::new(FEED_RESYNCS.clone()),
        Box::new(OPTION_STORE_SIZE.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all registered metrics in Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
