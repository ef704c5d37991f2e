//! HTTP routes for the Property Search Service.
//!
//! Defines the Axum router and application state.

use crate::config::Config;
use crate::handlers;
use crate::middleware::{http_metrics_middleware, require_auth, AuthState};
use crate::repositories::{PropertyIndex, UserRepository};
use crate::services::SessionStore;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

/// Overall request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Config,

    /// Credential store.
    pub users: Arc<dyn UserRepository>,

    /// Property search index.
    pub properties: Arc<dyn PropertyIndex>,

    /// Tracked sessions, one per user.
    pub sessions: Arc<dyn SessionStore>,
}

/// Build the application routes.
///
/// - `/signup`, `/login` - public
/// - `/search` - protected by the access guard
/// - `/health`, `/ready`, `/metrics` - public operational endpoints
///
/// Layer order (outermost first): HTTP metrics, timeout, trace.
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let auth_state = Arc::new(AuthState {
        jwt_secret: state.config.jwt_secret.clone(),
        clock_skew: Duration::from_secs(state.config.jwt_clock_skew_seconds),
    });

    let public_routes = Router::new()
        .route("/signup", post(handlers::signup))
        .route("/login", post(handlers::login))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .with_state(state.clone());

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    let protected_routes = Router::new()
        .route("/search", get(handlers::search))
        .route_layer(middleware::from_fn_with_state(auth_state, require_auth))
        .with_state(state);

    public_routes
        .merge(metrics_routes)
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        // Outermost, so framework rejections (404, 405) are recorded too
        .layer(middleware::from_fn(http_metrics_middleware))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::models::Property;
    use crate::repositories::property_index::mock::InMemoryPropertyIndex;
    use crate::repositories::users::mock::InMemoryUserRepository;
    use crate::services::InMemorySessionStore;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::collections::HashMap;
    use tower::ServiceExt;

    #[test]
    fn test_app_state_is_clone() {
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    fn test_router(users: InMemoryUserRepository) -> Router {
        let config = Config::from_vars(&HashMap::from([
            (
                "DATABASE_URL".to_string(),
                "postgresql://localhost/ps_test".to_string(),
            ),
            (
                "JWT_SECRET".to_string(),
                "test-secret-that-is-at-least-32-bytes-long".to_string(),
            ),
        ]))
        .unwrap();

        let properties = InMemoryPropertyIndex::new(vec![Property {
            title: "Downtown Loft".to_string(),
            amenities: "gym".to_string(),
            price: 1500.0,
            location: "Downtown".to_string(),
        }]);

        let state = Arc::new(AppState {
            config,
            users: Arc::new(users),
            properties: Arc::new(properties),
            sessions: Arc::new(InMemorySessionStore::new()),
        });

        let handle = PrometheusBuilder::new().build_recorder().handle();
        build_routes(state, handle)
    }

    fn form_post(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_signup_login_search_flow() {
        let app = test_router(InMemoryUserRepository::new());

        let response = app
            .clone()
            .oneshot(form_post(
                "/signup",
                "username=alice&email=a%40b.com&password=secret1",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .clone()
            .oneshot(form_post("/login", "username=alice&password=secret1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let token = json_body(response).await["access_token"]
            .as_str()
            .unwrap()
            .to_string();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/search?location=downtown")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Search results found: Order - asc");
        assert_eq!(body["results"][0]["title"], "Downtown Loft");
    }

    #[tokio::test]
    async fn test_search_without_token_is_rejected_before_validation() {
        let app = test_router(InMemoryUserRepository::new());

        let response = app
            .oneshot(Request::builder().uri("/search").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
        assert_eq!(json_body(response).await["error"]["code"], "INVALID_TOKEN");
    }

    #[tokio::test]
    async fn test_signup_with_json_body_is_bad_request() {
        let app = test_router(InMemoryUserRepository::new());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/signup")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"username":"alice"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_ready_reports_store_failure() {
        let users = InMemoryUserRepository::new();
        users.set_failing(true);
        let app = test_router(users);

        let response = app
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(response).await["database"], "unhealthy");
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let app = test_router(InMemoryUserRepository::new());

        let response = app
            .oneshot(Request::builder().uri("/admin").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
