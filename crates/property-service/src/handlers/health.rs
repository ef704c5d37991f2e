//! Health check handlers.
//!
//! - `/health`: Liveness probe - returns OK if the process is running
//! - `/ready`: Readiness probe - checks the credential store and search index

use crate::models::ReadinessResponse;
use crate::routes::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;

const DEPENDENCIES_UNAVAILABLE: &str = "Service dependencies unavailable";

/// Liveness probe handler.
///
/// Does not check dependencies.
pub async fn health_check() -> &'static str {
    "OK"
}

/// Readiness probe handler.
///
/// Returns 200 if both the credential store and the search index respond,
/// 503 otherwise. Error messages are generic; details are logged.
#[tracing::instrument(skip_all, name = "ps.health.readiness")]
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    if let Err(e) = state.users.ping().await {
        tracing::warn!(target: "ps.health", error = %e, "Readiness check failed: credential store");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                status: "not_ready",
                database: Some("unhealthy"),
                search_index: None,
                error: Some(DEPENDENCIES_UNAVAILABLE.to_string()),
            }),
        );
    }

    if let Err(e) = state.properties.ping().await {
        tracing::warn!(target: "ps.health", error = %e, "Readiness check failed: search index");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                status: "not_ready",
                database: Some("healthy"),
                search_index: Some("unavailable"),
                error: Some(DEPENDENCIES_UNAVAILABLE.to_string()),
            }),
        );
    }

    (
        StatusCode::OK,
        Json(ReadinessResponse {
            status: "ready",
            database: Some("healthy"),
            search_index: Some("available"),
            error: None,
        }),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check() {
        assert_eq!(health_check().await, "OK");
    }

    #[test]
    fn test_readiness_response_serialization() {
        let not_ready = ReadinessResponse {
            status: "not_ready",
            database: Some("unhealthy"),
            search_index: None,
            error: Some(DEPENDENCIES_UNAVAILABLE.to_string()),
        };

        let json = serde_json::to_value(&not_ready).unwrap();
        assert_eq!(json["status"], "not_ready");
        assert_eq!(json["database"], "unhealthy");
        assert!(json.get("search_index").is_none());
        assert_eq!(json["error"], DEPENDENCIES_UNAVAILABLE);
    }
}
