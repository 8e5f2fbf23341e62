//! Observability infrastructure for the prediction client
//!
//! Provides:
//! - Prometheus metrics (request outcomes and latency per operation)
//! - Structured logging of workflow events with tracing

use crate::error::ApiError;
use crate::models::PredictionResponse;
use crate::validation::ValidationReport;
use prometheus::{register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for request latency (in seconds), up to the default deadline
const LATENCY_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<ClientMetricsInner> = OnceLock::new();

struct ClientMetricsInner {
    requests_total: IntCounterVec,
    request_duration_seconds: HistogramVec,
}

impl ClientMetricsInner {
    fn new() -> Self {
        Self {
            requests_total: register_int_counter_vec!(
                "predict_client_requests_total",
                "Calls made against the inference service by operation and outcome",
                &["operation", "outcome"]
            )
            .expect("Failed to register predict_client_requests_total"),

            request_duration_seconds: register_histogram_vec!(
                "predict_client_request_duration_seconds",
                "Wall-clock time of calls against the inference service",
                &["operation"],
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register predict_client_request_duration_seconds"),
        }
    }
}

/// Client metrics for Prometheus exposition
///
/// A lightweight handle to the process-global metrics; clones share them.
#[derive(Clone, Debug)]
pub struct ClientMetrics {
    _private: (),
}

impl Default for ClientMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(ClientMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &ClientMetricsInner {
        GLOBAL_METRICS.get_or_init(ClientMetricsInner::new)
    }

    /// Record one finished call
    pub fn observe_request(&self, operation: &str, outcome: &str, duration_secs: f64) {
        let inner = self.inner();
        inner
            .requests_total
            .with_label_values(&[operation, outcome])
            .inc();
        inner
            .request_duration_seconds
            .with_label_values(&[operation])
            .observe(duration_secs);
    }

    pub fn request_count(&self, operation: &str, outcome: &str) -> u64 {
        self.inner()
            .requests_total
            .with_label_values(&[operation, outcome])
            .get()
    }
}

/// Structured logger for prediction workflow events
#[derive(Clone, Debug)]
pub struct StructuredLogger {
    source: String,
}

impl StructuredLogger {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Log a submission leaving the client
    pub fn log_submitted(&self, endpoint: &str) {
        info!(
            event = "prediction_submitted",
            source = %self.source,
            endpoint = %endpoint,
            "Submitting features for prediction"
        );
    }

    /// Log a successful prediction
    pub fn log_completed(&self, response: &PredictionResponse, elapsed_ms: u64) {
        info!(
            event = "prediction_completed",
            source = %self.source,
            prediction = response.prediction,
            label = %response.prediction_label,
            probability = response.probability,
            confidence = %response.confidence,
            model_version = %response.model_version,
            elapsed_ms = elapsed_ms,
            "Prediction received"
        );
    }

    /// Log a failed prediction call
    pub fn log_failed(&self, error: &ApiError, elapsed_ms: u64) {
        warn!(
            event = "prediction_failed",
            source = %self.source,
            kind = error.kind(),
            status = ?error.status(),
            error = %error,
            elapsed_ms = elapsed_ms,
            "Prediction request failed"
        );
    }

    /// Log a submission rejected before reaching the network
    pub fn log_validation_failed(&self, report: &ValidationReport) {
        info!(
            event = "validation_failed",
            source = %self.source,
            invalid_fields = report.len(),
            first_field = ?report.iter().next().map(|e| e.field_index),
            "Feature input rejected by validation"
        );
    }
}
