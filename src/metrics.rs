// src/metrics.rs
use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics::{describe_counter, describe_gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "curate_candidates_total",
            "Candidate links returned by source loaders."
        );
        describe_counter!(
            "curate_verified_total",
            "Relevance verdicts, labelled relevant/irrelevant."
        );
        describe_counter!(
            "curate_search_errors_total",
            "GitHub search queries that failed and were skipped."
        );
        describe_counter!(
            "curate_stargazer_errors_total",
            "Stargazer lookups that failed and defaulted to 0."
        );
        describe_counter!(
            "curate_branch_errors_total",
            "Whole source branches that failed and contributed nothing."
        );
        describe_counter!("condense_calls_total", "Post condense generations.");
        describe_gauge!(
            "curate_pipeline_last_run_ts",
            "Unix ts when the curation pipeline last finished."
        );
    });
}

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the process-wide Prometheus recorder.
    pub fn init() -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        ensure_metrics_described();
        Ok(Self { handle })
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router<S>(&self) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
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
