//! Metrics collection for observability

use prometheus::{
    CounterVec, Histogram, HistogramOpts, HistogramVec, Opts, Registry,
    register_counter_vec_with_registry, register_histogram_vec_with_registry,
    register_histogram_with_registry,
};
use std::sync::Arc;
use std::time::Duration;
use once_cell::sync::Lazy;

use crate::scoring::{ScoreRecord, Severity};

/// Global metrics registry
pub static METRICS: Lazy<Arc<Metrics>> = Lazy::new(|| {
    Arc::new(Metrics::new().expect("Failed to initialize metrics"))
});

/// Metrics collector
pub struct Metrics {
    registry: Registry,

    // Pipeline metrics
    pub stage_outcomes: CounterVec,
    pub documents_loaded: CounterVec,

    // Inference metrics
    pub inference_duration: HistogramVec,

    // Scoring metrics
    pub compliance_scores: Histogram,
    pub findings_total: CounterVec,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let stage_outcomes = register_counter_vec_with_registry!(
            Opts::new("pipeline_stage_total", "Pipeline stage executions by outcome"),
            &["stage", "status"],
            registry
        )?;

        let documents_loaded = register_counter_vec_with_registry!(
            Opts::new("documents_loaded_total", "Documents extracted by role"),
            &["role"],
            registry
        )?;

        let inference_duration = register_histogram_vec_with_registry!(
            HistogramOpts::new(
                "inference_duration_seconds",
                "Model completion latency in seconds"
            )
            .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0]),
            &["stage"],
            registry
        )?;

        let compliance_scores = register_histogram_with_registry!(
            HistogramOpts::new("compliance_score_percentage", "Computed compliance percentages")
                .buckets(vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0]),
            registry
        )?;

        let findings_total = register_counter_vec_with_registry!(
            Opts::new("findings_total", "Gap findings by severity"),
            &["severity"],
            registry
        )?;

        Ok(Self {
            registry,
            stage_outcomes,
            documents_loaded,
            inference_duration,
            compliance_scores,
            findings_total,
        })
    }

    /// Get the metrics registry for exporting
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record a pipeline stage outcome
    pub fn record_stage(&self, stage: &str, success: bool) {
        let status = if success { "success" } else { "error" };
        self.stage_outcomes.with_label_values(&[stage, status]).inc();
    }

    pub fn record_document_loaded(&self, role: &str) {
        self.documents_loaded.with_label_values(&[role]).inc();
    }

    /// Record model latency for a stage
    pub fn record_inference(&self, stage: &str, elapsed: Duration) {
        self.inference_duration
            .with_label_values(&[stage])
            .observe(elapsed.as_secs_f64());
    }

    /// Record a computed score and its findings
    pub fn record_score(&self, record: &ScoreRecord) {
        self.compliance_scores
            .observe(f64::from(record.compliance_percentage()));
        for severity in Severity::ALL {
            let count = record.count(severity);
            if count > 0 {
                self.findings_total
                    .with_label_values(&[severity.label()])
                    .inc_by(f64::from(count));
            }
        }
    }

    /// Export metrics in Prometheus text format
    pub fn export_prometheus(&self) -> String {
        use prometheus::Encoder;

        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();

        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer).unwrap_or_default();

        String::from_utf8(buffer).unwrap_or_default()
    }
}
