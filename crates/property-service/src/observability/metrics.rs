//! Metrics definitions for the Property Search Service.
//!
//! All metrics follow Prometheus naming conventions:
//! - `ps_` prefix for Property Search
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded to prevent cardinality explosion:
//! - `method`: 7 values max (GET, POST, PATCH, DELETE, PUT, HEAD, OPTIONS)
//! - `endpoint`: known routes plus `/other`
//! - `status`: 3 values (success, error, timeout)
//! - `outcome`: bounded by code (success plus `PsError::error_type` labels)

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
        .set_buckets_for_metric(
            Matcher::Prefix("ps_http_request".to_string()),
            &[
                0.005, 0.010, 0.025, 0.050, 0.100, 0.150, 0.200, 0.300, 0.500, 1.000, 2.000,
            ],
        )
        .map_err(|e| format!("Failed to set HTTP request buckets: {e}"))?
        // Search round-trips include the index; wider upper range
        .set_buckets_for_metric(
            Matcher::Prefix("ps_search_duration".to_string()),
            &[
                0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 2.500, 5.000, 10.000,
            ],
        )
        .map_err(|e| format!("Failed to set search buckets: {e}"))?
        .install_recorder()
        .map_err(|e| format!("Failed to install Prometheus recorder: {e}"))
}

// ============================================================================
// HTTP Request Metrics
// ============================================================================

/// Record HTTP request completion
///
/// Metric: `ps_http_requests_total`, `ps_http_request_duration_seconds`
/// Labels: `method`, `endpoint`, `status` / `status_code`
pub fn record_http_request(method: &str, endpoint: &str, status_code: u16, duration: Duration) {
    let normalized_endpoint = normalize_endpoint(endpoint);
    let status = categorize_status_code(status_code);

    histogram!("ps_http_request_duration_seconds",
        "method" => method.to_string(),
        "endpoint" => normalized_endpoint,
        "status" => status
    )
    .record(duration.as_secs_f64());

    counter!("ps_http_requests_total",
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

/// Normalize endpoint path to bound label cardinality.
fn normalize_endpoint(path: &str) -> &'static str {
    match path {
        "/signup" => "/signup",
        "/login" => "/login",
        "/search" => "/search",
        "/health" => "/health",
        "/ready" => "/ready",
        "/metrics" => "/metrics",
        _ => "/other",
    }
}

// ============================================================================
// Auth Metrics
// ============================================================================

/// Record a registration attempt.
///
/// Metric: `ps_signups_total`
/// Labels: `outcome`
pub fn record_signup(outcome: &str) {
    counter!("ps_signups_total", "outcome" => outcome.to_string()).increment(1);
}

/// Record a login attempt.
///
/// Metric: `ps_logins_total`
/// Labels: `outcome` ("issued", "existing", or an error type)
pub fn record_login(outcome: &str) {
    counter!("ps_logins_total", "outcome" => outcome.to_string()).increment(1);
}

// ============================================================================
// Session Metrics
// ============================================================================

/// Set the number of tracked sessions.
///
/// Metric: `ps_active_sessions`
/// Type: Gauge
pub fn set_active_sessions(count: usize) {
    #[allow(clippy::cast_precision_loss)]
    gauge!("ps_active_sessions").set(count as f64);
}

/// Record expired sessions evicted by a sweep.
///
/// Metric: `ps_sessions_swept_total`
pub fn record_sessions_swept(count: usize) {
    counter!("ps_sessions_swept_total").increment(count as u64);
}

// ============================================================================
// Search Metrics
// ============================================================================

/// Record a search request.
///
/// Metric: `ps_searches_total`, `ps_search_duration_seconds`
/// Labels: `outcome` ("success", "empty", "invalid", "error")
///
/// `index_duration` is the index round-trip; absent when validation failed
/// before the index was called.
pub fn record_search(outcome: &str, index_duration: Option<Duration>) {
    counter!("ps_searches_total", "outcome" => outcome.to_string()).increment(1);

    if let Some(duration) = index_duration {
        histogram!("ps_search_duration_seconds", "outcome" => outcome.to_string())
            .record(duration.as_secs_f64());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use metrics_util::debugging::{DebugValue, DebuggingRecorder};

    fn counter_value(
        snapshot: &[(
            metrics_util::CompositeKey,
            Option<metrics::Unit>,
            Option<metrics::SharedString>,
            DebugValue,
        )],
        name: &str,
    ) -> u64 {
        snapshot
            .iter()
            .filter(|(key, _, _, _)| key.key().name() == name)
            .map(|(_, _, _, value)| match value {
                DebugValue::Counter(v) => *v,
                _ => 0,
            })
            .sum()
    }

    #[test]
    fn test_categorize_status_code() {
        assert_eq!(categorize_status_code(200), "success");
        assert_eq!(categorize_status_code(201), "success");
        assert_eq!(categorize_status_code(401), "error");
        assert_eq!(categorize_status_code(404), "error");
        assert_eq!(categorize_status_code(408), "timeout");
        assert_eq!(categorize_status_code(504), "timeout");
        assert_eq!(categorize_status_code(500), "error");
    }

    #[test]
    fn test_normalize_endpoint() {
        assert_eq!(normalize_endpoint("/search"), "/search");
        assert_eq!(normalize_endpoint("/login"), "/login");
        assert_eq!(normalize_endpoint("/swagger.json"), "/other");
        assert_eq!(normalize_endpoint("/search/extra"), "/other");
    }

    #[test]
    fn test_metrics_are_recorded() {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();

        metrics::with_local_recorder(&recorder, || {
            record_http_request("GET", "/search", 200, Duration::from_millis(15));
            record_http_request("POST", "/login", 401, Duration::from_millis(3));
            record_signup("success");
            record_login("issued");
            record_login("invalid_credentials");
            record_search("success", Some(Duration::from_millis(40)));
            record_search("invalid", None);
            set_active_sessions(3);
            record_sessions_swept(2);
        });

        let snapshot = snapshotter.snapshot().into_vec();

        assert_eq!(counter_value(&snapshot, "ps_http_requests_total"), 2);
        assert_eq!(counter_value(&snapshot, "ps_signups_total"), 1);
        assert_eq!(counter_value(&snapshot, "ps_logins_total"), 2);
        assert_eq!(counter_value(&snapshot, "ps_searches_total"), 2);
        assert_eq!(counter_value(&snapshot, "ps_sessions_swept_total"), 2);
        assert!(snapshot
            .iter()
            .any(|(key, _, _, _)| key.key().name() == "ps_active_sessions"));
        assert!(snapshot
            .iter()
            .any(|(key, _, _, _)| key.key().name() == "ps_search_duration_seconds"));
    }
}
