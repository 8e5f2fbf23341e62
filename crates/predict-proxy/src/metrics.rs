//! Prometheus metrics for forwarded requests

use prometheus::{register_int_counter_vec, IntCounterVec};
use std::sync::OnceLock;

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<IntCounterVec> = OnceLock::new();

fn forwarded_total() -> &'static IntCounterVec {
    GLOBAL_METRICS.get_or_init(|| {
        register_int_counter_vec!(
            "predict_proxy_forwarded_total",
            "Requests relayed to the inference service by route and returned status",
            &["route", "status"]
        )
        .expect("Failed to register predict_proxy_forwarded_total")
    })
}

/// Proxy metrics handle; clones share the process-global counters
#[derive(Clone, Debug, Default)]
pub struct ProxyMetrics {
    _private: (),
}

impl ProxyMetrics {
    pub fn new() -> Self {
        forwarded_total();
        Self { _private: () }
    }

    pub fn record_forwarded(&self, route: &str, status: u16) {
        forwarded_total()
            .with_label_values(&[route, &status.to_string()])
            .inc();
    }

    pub fn forwarded_count(&self, route: &str, status: u16) -> u64 {
        forwarded_total()
            .with_label_values(&[route, &status.to_string()])
            .get()
    }
}
