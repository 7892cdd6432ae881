//! Observability infrastructure for interval reconstruction
//!
//! Provides:
//! - Prometheus metrics (instants processed, intervals emitted and synthesized, latency)
//! - Structured logging with tracing

use crate::reconstruct::ReconstructionSummary;
use chrono::{DateTime, Utc};
use prometheus::{
    register_histogram, register_int_counter, register_int_gauge, Encoder, Histogram, IntCounter,
    IntGauge, TextEncoder,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for reconstruction latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 5.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<TimelineMetricsInner> = OnceLock::new();

struct TimelineMetricsInner {
    reconstruction_latency_seconds: Histogram,
    instants_processed: IntCounter,
    intervals_emitted: IntCounter,
    intervals_synthesized: IntCounter,
    locators_reconstructed: IntGauge,
}

impl TimelineMetricsInner {
    fn new() -> Self {
        Self {
            reconstruction_latency_seconds: register_histogram!(
                "pod_timeline_reconstruction_latency_seconds",
                "Time spent reconstructing intervals from instants",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register reconstruction_latency_seconds"),

            instants_processed: register_int_counter!(
                "pod_timeline_instants_processed_total",
                "Total number of instants fed into reconstruction"
            )
            .expect("Failed to register instants_processed"),

            intervals_emitted: register_int_counter!(
                "pod_timeline_intervals_emitted_total",
                "Total number of intervals produced by reconstruction"
            )
            .expect("Failed to register intervals_emitted"),

            intervals_synthesized: register_int_counter!(
                "pod_timeline_intervals_synthesized_total",
                "Total number of intervals synthesized for missed observations"
            )
            .expect("Failed to register intervals_synthesized"),

            locators_reconstructed: register_int_gauge!(
                "pod_timeline_locators_reconstructed",
                "Number of distinct locators in the last reconstruction"
            )
            .expect("Failed to register locators_reconstructed"),
        }
    }
}

/// Handle to the process-wide reconstruction metrics
///
/// Clones share the same underlying registrations.
#[derive(Clone)]
pub struct TimelineMetrics {
    _private: (),
}

impl Default for TimelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl TimelineMetrics {
    /// Create a handle, registering the metrics on first use
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(TimelineMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &TimelineMetricsInner {
        GLOBAL_METRICS.get_or_init(TimelineMetricsInner::new)
    }

    /// Record one reconstruction run
    pub fn record_run(&self, instants: usize, summary: &ReconstructionSummary, elapsed_secs: f64) {
        let inner = self.inner();
        inner.reconstruction_latency_seconds.observe(elapsed_secs);
        inner.instants_processed.inc_by(instants as u64);
        inner.intervals_emitted.inc_by(summary.intervals as u64);
        inner.intervals_synthesized.inc_by(summary.synthesized as u64);
        inner.locators_reconstructed.set(summary.locators as i64);
    }

    pub fn intervals_synthesized(&self) -> u64 {
        self.inner().intervals_synthesized.get()
    }

    /// Text exposition of every registered metric
    pub fn render(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&prometheus::gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

/// Structured logger for reconstruction runs
///
/// Every event carries the input source so that logs from several runs
/// can be told apart.
#[derive(Clone)]
pub struct StructuredLogger {
    source: String,
}

impl StructuredLogger {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn log_run_started(&self, instants: usize, start: DateTime<Utc>, end: DateTime<Utc>) {
        info!(
            event = "reconstruction_started",
            source = %self.source,
            instants = instants,
            window_start = %start,
            window_end = %end,
            "Reconstructing intervals"
        );
    }

    pub fn log_reconstruction(&self, summary: &ReconstructionSummary, elapsed_secs: f64) {
        info!(
            event = "reconstruction_finished",
            source = %self.source,
            intervals = summary.intervals,
            synthesized = summary.synthesized,
            zero_width = summary.zero_width,
            locators = summary.locators,
            elapsed_secs = elapsed_secs,
            "Reconstructed intervals"
        );
        if summary.intervals > 0 && summary.synthesized * 2 > summary.intervals {
            warn!(
                event = "sparse_lifecycle",
                source = %self.source,
                synthesized = summary.synthesized,
                intervals = summary.intervals,
                "More than half of the intervals were synthesized"
            );
        }
    }

    pub fn log_output_written(&self, destination: &str, items: usize, skip_instants: bool) {
        info!(
            event = "output_written",
            source = %self.source,
            destination = %destination,
            items = items,
            skip_instants = skip_instants,
            "Wrote interval document"
        );
    }

    pub fn log_exclusion(&self, locator: &str, excluded: bool) {
        info!(
            event = "exclusion_checked",
            source = %self.source,
            locator = %locator,
            excluded = excluded,
            "Checked locator against exclusion list"
        );
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeline_metrics_record_run() {
        let metrics = TimelineMetrics::new();
        let before = metrics.intervals_synthesized();

        let summary = ReconstructionSummary {
            intervals: 6,
            synthesized: 2,
            zero_width: 2,
            locators: 2,
        };
        metrics.record_run(4, &summary, 0.002);

        assert!(metrics.intervals_synthesized() >= before + 2);
        let text = metrics.render().unwrap();
        assert!(text.contains("pod_timeline_intervals_emitted_total"));
        assert!(text.contains("pod_timeline_reconstruction_latency_seconds_bucket"));
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("pod_test_01_simple.json");
        assert_eq!(logger.source(), "pod_test_01_simple.json");
    }
}
