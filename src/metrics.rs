use axum::{http::StatusCode, response::IntoResponse};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

use crate::LookupType;

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub fn init_metrics() {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if PROMETHEUS_HANDLE.set(handle).is_err() {
                tracing::warn!("Metrics recorder already initialized");
                return;
            }

            // Initialize metrics with zero values
            counter!("whois_lookups_total", "type" => "domain").absolute(0);
            counter!("whois_lookups_total", "type" => "contact").absolute(0);
            counter!("whois_errors_total", "error_type" => "unknown").absolute(0);
            histogram!("whois_lookup_duration_seconds").record(0.0);
        }
        Err(e) => {
            tracing::warn!("Failed to install metrics recorder: {}", e);
        }
    }
}

pub fn increment_lookups(lookup_type: LookupType) {
    counter!("whois_lookups_total", "type" => lookup_type.as_str()).increment(1);
}

pub fn increment_errors(error_type: &'static str) {
    counter!("whois_errors_total", "error_type" => error_type).increment(1);
}

pub fn record_query_time(duration_ms: u64) {
    let duration_seconds = duration_ms as f64 / 1000.0;
    histogram!("whois_lookup_duration_seconds").record(duration_seconds);
}

pub async fn metrics_handler() -> impl IntoResponse {
    match PROMETHEUS_HANDLE.get() {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::SERVICE_UNAVAILABLE, "Metrics not initialized".to_string()),
    }
}
