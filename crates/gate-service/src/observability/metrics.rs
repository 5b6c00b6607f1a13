//! Metrics definitions for the gate service.
//!
//! All metrics follow Prometheus naming conventions:
//! - `gate_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded to prevent cardinality explosion:
//! - `method`: 7 values max (GET, POST, PATCH, DELETE, PUT, HEAD, OPTIONS)
//! - `endpoint`: 5 values (known paths plus `/other`)
//! - `status`: 3 values (success, error, timeout)
//! - `outcome`: `success` plus the 8 `AuthError` kinds
//! - `transport`: `http`, `grpc`
//!
//! No label ever carries a subject, issuer-controlled string, or token.

use gate_core::{AuthError, Identity};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Initialize Prometheus metrics recorder and return the handle
/// for serving metrics via HTTP.
///
/// Must be called before any metrics are recorded.
///
/// # Errors
///
/// Returns error if Prometheus recorder fails to install (e.g., already installed).
pub fn init_metrics_recorder() -> Result<PrometheusHandle, String> {
    PrometheusBuilder::new()
        // HTTP request buckets
        .set_buckets_for_metric(
            Matcher::Prefix("gate_http_request".to_string()),
            &[
                0.001, 0.005, 0.010, 0.025, 0.050, 0.100, 0.200, 0.500, 1.000, 2.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        // Token authentication is CPU-only; sub-millisecond resolution
        .set_buckets_for_metric(
            Matcher::Full("gate_auth_duration_seconds".to_string()),
            &[
                0.0001, 0.00025, 0.0005, 0.001, 0.0025, 0.005, 0.010, 0.025,
            ],
        )
        .map_err(|e| format!("Failed to set auth duration buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion
///
/// Metric: `gate_http_requests_total`, `gate_http_request_duration_seconds`
/// Labels: `method`, `endpoint`, `status` / `status_code`
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    let normalized_endpoint = normalize_endpoint(endpoint);
    let status = categorize_status_code(status_code);

    histogram!("gate_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status" => status
    )
    .record(duration.as_secs_f64());

    counter!("gate_http_requests_total",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status_code" => status_code.to_string()
    )
    .increment(1);
}

/// Categorize HTTP status code into success/error/timeout
fn categorize_status_code(status_code: u16) -> &'static str {
    match status_code {
        200..=299 => "success",
        408 | 504 => "timeout",
        _ => "error",
    }
}

/// Normalize endpoint path to prevent label cardinality explosion
///
/// Unknown paths are normalized to "/other".
fn normalize_endpoint(path: &str) -> &'static str {
    match path {
        "/health" => "/health",
        "/ready" => "/ready",
        "/metrics" => "/metrics",
        "/api/v1/whoami" => "/api/v1/whoami",
        _ => "/other",
    }
}

// ============================================================================
// Authentication Metrics
// ============================================================================

/// Record one authentication decision
///
/// Metric: `gate_auth_results_total`, `gate_auth_duration_seconds`
/// Labels: `transport`, `outcome`
pub fn record_auth_result(
    transport: &'static str,
    result: &Result<Identity, AuthError>,
    duration: Duration,
) {
    let outcome = match result {
        Ok(_) => "success",
        Err(e) => e.kind(),
    };

    counter!("gate_auth_results_total",
        "transport" => transport,
        "outcome" => outcome
    )
    .increment(1);

    histogram!("gate_auth_duration_seconds",
        "transport" => transport
    )
    .record(duration.as_secs_f64());
}

/// Record a request rejected before authentication ran (no credential)
///
/// Metric: `gate_auth_results_total`
/// Labels: `transport`, `outcome` = `missing_credentials`
pub fn record_missing_credentials(transport: &'static str) {
    counter!("gate_auth_results_total",
        "transport" => transport,
        "outcome" => "missing_credentials"
    )
    .increment(1);
}

// ============================================================================
// Configuration Metrics
// ============================================================================

/// Record an authenticator reload attempt
///
/// Metric: `gate_authenticator_reloads_total`
/// Labels: `status` (success, error)
pub fn record_reload(status: &'static str) {
    counter!("gate_authenticator_reloads_total", "status" => status).increment(1);
}

/// Set the number of providers in the active authenticator
///
/// Metric: `gate_providers_configured`
#[allow(clippy::cast_precision_loss)] // provider counts are tiny
pub fn set_providers_configured(count: usize) {
    gauge!("gate_providers_configured").set(count as f64);
}
