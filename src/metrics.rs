//! Metrics collection and export module

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::time::Instant;

/// Global metrics registry
pub struct Metrics {
    registry: Registry,

    // Dispatch
    pub operations_total: IntCounterVec,

    // Submission
    pub transactions_sent: IntCounter,
    pub transactions_confirmed: IntCounter,
    pub transactions_failed: IntCounter,
    pub transactions_unconfirmed: IntCounter,

    // Reads
    pub json_fetch_failures: IntCounter,

    // Histograms
    pub operation_latency: Histogram,
    pub confirmation_latency: Histogram,
}

impl Metrics {
    /// Create new metrics instance
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let operations_total = IntCounterVec::new(
            Opts::new(
                "mplx_operations_total",
                "Dispatched operations by kind and outcome",
            ),
            &["kind", "outcome"],
        )?;

        let transactions_sent = IntCounter::with_opts(Opts::new(
            "mplx_transactions_sent_total",
            "Transactions accepted by the RPC node",
        ))?;

        let transactions_confirmed = IntCounter::with_opts(Opts::new(
            "mplx_transactions_confirmed_total",
            "Transactions observed at the requested confirmation level",
        ))?;

        let transactions_failed = IntCounter::with_opts(Opts::new(
            "mplx_transactions_failed_total",
            "Transactions the cluster executed with an error",
        ))?;

        let transactions_unconfirmed = IntCounter::with_opts(Opts::new(
            "mplx_transactions_unconfirmed_total",
            "Confirmation waits that timed out or were cancelled",
        ))?;

        let json_fetch_failures = IntCounter::with_opts(Opts::new(
            "mplx_json_fetch_failures_total",
            "Off-chain JSON metadata fetches that failed",
        ))?;

        let operation_latency = Histogram::with_opts(
            HistogramOpts::new(
                "mplx_operation_latency_seconds",
                "Handler execution time",
            )
            .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        )?;

        let confirmation_latency = Histogram::with_opts(
            HistogramOpts::new(
                "mplx_confirmation_latency_seconds",
                "Time from send to observed confirmation",
            )
            .buckets(vec![0.25, 0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 30.0, 60.0, 90.0]),
        )?;

        registry.register(Box::new(operations_total.clone()))?;
        registry.register(Box::new(transactions_sent.clone()))?;
        registry.register(Box::new(transactions_confirmed.clone()))?;
        registry.register(Box::new(transactions_failed.clone()))?;
        registry.register(Box::new(transactions_unconfirmed.clone()))?;
        registry.register(Box::new(json_fetch_failures.clone()))?;
        registry.register(Box::new(operation_latency.clone()))?;
        registry.register(Box::new(confirmation_latency.clone()))?;

        Ok(Self {
            registry,
            operations_total,
            transactions_sent,
            transactions_confirmed,
            transactions_failed,
            transactions_unconfirmed,
            json_fetch_failures,
            operation_latency,
            confirmation_latency,
        })
    }

    /// Get the registry for exporting
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Count one dispatched operation
    pub fn record_operation(&self, kind: &str, outcome: &str) {
        self.operations_total
            .with_label_values(&[kind, outcome])
            .inc();
    }

    /// Render all metrics in the Prometheus text exposition format
    pub fn gather_text(&self) -> String {
        let mut buffer = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buffer) {
            tracing::warn!(error = %e, "Failed to encode metrics");
            return String::new();
        }
        String::from_utf8(buffer).unwrap_or_default()
    }
}

/// Global metrics instance
pub fn metrics() -> &'static Metrics {
    static METRICS: once_cell::sync::Lazy<Metrics> =
        once_cell::sync::Lazy::new(|| Metrics::new().expect("Failed to initialize metrics"));
    &METRICS
}

/// Timer helper for measuring operation duration
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn observe_duration(&self, histogram: &Histogram) {
        histogram.observe(self.elapsed_secs());
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_operation_counts_by_label() {
        let m = Metrics::new().unwrap();
        m.record_operation("Echo", "success");
        m.record_operation("Echo", "success");
        m.record_operation("Echo", "dispatch");

        assert_eq!(
            m.operations_total
                .with_label_values(&["Echo", "success"])
                .get(),
            2
        );
        assert_eq!(
            m.operations_total
                .with_label_values(&["Echo", "dispatch"])
                .get(),
            1
        );
    }

    #[test]
    fn test_gather_text_contains_metric_names() {
        let m = Metrics::new().unwrap();
        m.transactions_sent.inc();
        m.record_operation("Echo", "success");

        let text = m.gather_text();
        assert!(text.contains("mplx_transactions_sent_total 1"));
        assert!(text.contains("mplx_operations_total"));
    }
}
