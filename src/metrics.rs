use anyhow::{anyhow, Result};
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub const CALLS_TOTAL: &str = "entrypoint_calls_total";
pub const BILLED_UNITS_TOTAL: &str = "entrypoint_billed_units_total";
pub const FETCH_MS: &str = "upstream_fetch_ms";
pub const UPSTREAM_ERRORS_TOTAL: &str = "upstream_errors_total";
pub const UPSTREAM_FALLBACK_TOTAL: &str = "upstream_fallback_total";

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(CALLS_TOTAL, "Entrypoint calls by key and outcome.");
        describe_counter!(
            BILLED_UNITS_TOTAL,
            "Price units reported to the billing sink, by key."
        );
        describe_histogram!(FETCH_MS, "Upstream fetch latency in milliseconds.");
        describe_counter!(
            UPSTREAM_ERRORS_TOTAL,
            "Upstream fetches that failed without a fallback."
        );
        describe_counter!(
            UPSTREAM_FALLBACK_TOTAL,
            "Upstream failures replaced by fallback records."
        );
    });
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder. Safe to call more than once per
    /// process; later calls reuse the first handle.
    pub fn init() -> Result<Self> {
        static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();
        let handle = HANDLE
            .get_or_try_init(|| {
                PrometheusBuilder::new()
                    .install_recorder()
                    .map_err(|e| anyhow!("prometheus: install recorder: {e}"))
            })?
            .clone();
        ensure_described();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}
