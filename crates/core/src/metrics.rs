//! Prometheus metrics for the pipeline.
//!
//! The server registers these into its registry alongside the HTTP metrics.

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};

/// Pipeline runs by terminal outcome.
pub static PIPELINE_RUNS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("tubemux_pipeline_runs_total", "Total pipeline runs"),
        &["outcome"], // "success" or an error kind
    )
    .unwrap()
});

/// Duration of each pipeline stage.
pub static STAGE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "tubemux_stage_duration_seconds",
            "Duration of pipeline stages",
        )
        .buckets(vec![
            0.001, 0.01, 0.1, 0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 300.0, 900.0, 1800.0,
        ]),
        &["stage", "result"],
    )
    .unwrap()
});

/// Bytes written to disk while materializing streams.
pub static MATERIALIZED_BYTES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "tubemux_materialized_bytes_total",
            "Bytes drained from remote streams",
        ),
        &["stream"], // "video", "audio"
    )
    .unwrap()
});

/// Register all core metrics with the given registry.
pub fn register_core_metrics(registry: &Registry) {
    registry.register(Box::new(PIPELINE_RUNS.clone())).ok();
    registry.register(Box::new(STAGE_DURATION.clone())).ok();
    registry.register(Box::new(MATERIALIZED_BYTES.clone())).ok();
}
