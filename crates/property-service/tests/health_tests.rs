//! Health endpoint integration tests.
//!
//! `/health` returns plain text "OK"; `/ready` returns JSON describing the
//! credential store and search index.

use property_service::repositories::property_index::mock::InMemoryPropertyIndex;
use property_service::repositories::users::mock::InMemoryUserRepository;
use ps_test_utils::{seed_properties, TestPsServer};
use std::sync::Arc;

#[tokio::test]
async fn test_health_endpoint_returns_200() -> Result<(), anyhow::Error> {
    let server = TestPsServer::spawn().await?;

    let response = reqwest::get(format!("{}/health", server.url())).await?;

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await?, "OK");
    Ok(())
}

#[tokio::test]
async fn test_ready_endpoint_reports_ready() -> Result<(), anyhow::Error> {
    let server = TestPsServer::spawn().await?;

    let response = reqwest::get(format!("{}/ready", server.url())).await?;

    assert_eq!(response.status(), 200);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok());
    assert!(
        content_type.is_some_and(|ct| ct.contains("application/json")),
        "Expected application/json content type, got {:?}",
        content_type
    );

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["status"], "ready");
    assert_eq!(body["database"], "healthy");
    assert_eq!(body["search_index"], "available");
    Ok(())
}

#[tokio::test]
async fn test_ready_endpoint_reports_unavailable_index() -> Result<(), anyhow::Error> {
    let server = TestPsServer::spawn_with(
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(InMemoryPropertyIndex::failing()),
    )
    .await?;

    let response = reqwest::get(format!("{}/ready", server.url())).await?;

    assert_eq!(response.status(), 503);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["status"], "not_ready");
    assert_eq!(body["search_index"], "unavailable");
    assert_eq!(body["error"], "Service dependencies unavailable");
    Ok(())
}

#[tokio::test]
async fn test_ready_endpoint_reports_unhealthy_store() -> Result<(), anyhow::Error> {
    let users = Arc::new(InMemoryUserRepository::new());
    users.set_failing(true);
    let server =
        TestPsServer::spawn_with(users, Arc::new(InMemoryPropertyIndex::new(seed_properties())))
            .await?;

    let response = reqwest::get(format!("{}/ready", server.url())).await?;

    assert_eq!(response.status(), 503);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["database"], "unhealthy");
    Ok(())
}

#[tokio::test]
async fn test_metrics_endpoint_is_public() -> Result<(), anyhow::Error> {
    let server = TestPsServer::spawn().await?;

    let response = reqwest::get(format!("{}/metrics", server.url())).await?;

    assert_eq!(response.status(), 200);
    Ok(())
}

#[tokio::test]
async fn test_unknown_route_returns_404() -> Result<(), anyhow::Error> {
    let server = TestPsServer::spawn().await?;

    let response = reqwest::get(format!("{}/v1/nonexistent", server.url())).await?;

    assert_eq!(response.status(), 404);
    Ok(())
}
