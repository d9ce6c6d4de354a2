//! Prometheus metrics via the same `PrometheusBuilder` histogram-bucket
//! setup as `metrics::setup_metrics_recorder`/`Metrics`, with
//! counters/gauges renamed from Bitcoin-block/transaction concepts to
//! CoTA block/entry/sync-progress concepts.

use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

pub fn setup_metrics_recorder() -> PrometheusHandle {
    const EXPONENTIAL_SECONDS: &[f64] = &[
        0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
    ];

    PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("block_processing_time".to_string()),
            EXPONENTIAL_SECONDS,
        )
        .unwrap()
        .install_recorder()
        .unwrap()
}

#[derive(Clone)]
pub struct Metrics {
    pub prometheus_handle: PrometheusHandle,
}

impl Metrics {
    pub fn new(prometheus_handle: PrometheusHandle) -> Self {
        Self { prometheus_handle }
    }

    pub fn record_block_processed(&self) {
        metrics::increment_counter!("blocks_processed_total");
    }

    pub fn record_block_processing_time(&self, duration: Duration) {
        metrics::histogram!("block_processing_time", duration.as_secs_f64());
    }

    pub fn record_entry_decoded(&self) {
        metrics::increment_counter!("entries_decoded_total");
    }

    pub fn record_decode_failure(&self) {
        metrics::increment_counter!("entry_decode_failures_total");
    }

    pub fn record_fork_detected(&self) {
        metrics::increment_counter!("forks_detected_total");
    }

    pub fn record_sync_progress(&self, current_height: i64, target_height: i64) {
        metrics::gauge!("sync_current_height", current_height as f64);
        metrics::gauge!("sync_target_height", target_height as f64);

        let progress = if target_height > 0 {
            (current_height as f64 / target_height as f64) * 100.0
        } else {
            0.0
        };
        metrics::gauge!("sync_progress_percentage", progress);
    }
}
