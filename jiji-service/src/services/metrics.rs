//! Metrics collection for jiji-service.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder. Safe to call more than once; only the
/// first call installs.
pub fn init_metrics() {
    METRICS_HANDLE.get_or_init(|| {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        if metrics::set_global_recorder(recorder).is_err() {
            tracing::warn!("A metrics recorder was already installed; /metrics will be empty");
        }
        handle
    });
}

/// Get metrics output in Prometheus text format.
pub fn get_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(|handle| handle.render())
        .unwrap_or_else(|| "# Metrics recorder not initialized\n".to_string())
}

/// Record the terminal outcome of an ask request.
pub fn record_ask(outcome: &'static str) {
    counter!("jiji_ask_requests_total", "outcome" => outcome).increment(1);
}

/// Record how long a pool acquire took and whether it succeeded.
pub fn record_pool_acquire(outcome: &'static str, elapsed: Duration) {
    histogram!("jiji_db_acquire_duration_seconds", "outcome" => outcome)
        .record(elapsed.as_secs_f64());
}
