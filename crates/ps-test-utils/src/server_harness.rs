//! Test server harness for E2E testing
//!
//! Provides `TestPsServer` for spawning real Property Search servers in
//! tests, backed by the in-memory credential store and property index.

use crate::tokens::TEST_JWT_SECRET;
use metrics_exporter_prometheus::PrometheusBuilder;
use property_service::config::Config;
use property_service::models::Property;
use property_service::repositories::property_index::mock::InMemoryPropertyIndex;
use property_service::repositories::users::mock::InMemoryUserRepository;
use property_service::repositories::{PropertyIndex, UserRepository};
use property_service::routes::{self, AppState};
use property_service::services::{InMemorySessionStore, SessionStore};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Properties every default test server can search.
///
/// Three downtown listings at different prices plus one elsewhere.
pub fn seed_properties() -> Vec<Property> {
    vec![
        Property {
            title: "Downtown Penthouse".to_string(),
            amenities: "pool, gym, parking".to_string(),
            price: 3200.0,
            location: "Downtown".to_string(),
        },
        Property {
            title: "Cozy Studio".to_string(),
            amenities: "wifi".to_string(),
            price: 900.0,
            location: "Downtown".to_string(),
        },
        Property {
            title: "Sunny Loft".to_string(),
            amenities: "gym, wifi".to_string(),
            price: 1500.0,
            location: "Downtown Riverside".to_string(),
        },
        Property {
            title: "Lakeside Cabin".to_string(),
            amenities: "fireplace".to_string(),
            price: 700.0,
            location: "Lakeview".to_string(),
        },
    ]
}

/// Test harness for spawning the Property Search Service in E2E tests.
///
/// # Example
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_health() -> Result<(), anyhow::Error> {
///     let server = TestPsServer::spawn().await?;
///
///     let response = reqwest::get(format!("{}/health", server.url())).await?;
///
///     assert_eq!(response.status(), 200);
///     Ok(())
/// }
/// ```
pub struct TestPsServer {
    addr: SocketAddr,
    sessions: Arc<dyn SessionStore>,
    _handle: JoinHandle<()>,
}

impl TestPsServer {
    /// Spawn a server with an empty credential store and the
    /// [`seed_properties`] index.
    pub async fn spawn() -> Result<Self, anyhow::Error> {
        Self::spawn_with(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryPropertyIndex::new(seed_properties())),
        )
        .await
    }

    /// Spawn a server over the given store and index.
    ///
    /// The server binds to a random port on 127.0.0.1 and runs in the
    /// background until dropped.
    pub async fn spawn_with(
        users: Arc<dyn UserRepository>,
        properties: Arc<dyn PropertyIndex>,
    ) -> Result<Self, anyhow::Error> {
        let vars = HashMap::from([
            (
                "DATABASE_URL".to_string(),
                "postgresql://test/test".to_string(),
            ),
            ("JWT_SECRET".to_string(), TEST_JWT_SECRET.to_string()),
            ("BIND_ADDRESS".to_string(), "127.0.0.1:0".to_string()),
        ]);

        let config = Config::from_vars(&vars)
            .map_err(|e| anyhow::anyhow!("Failed to create config: {}", e))?;

        let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());

        let state = Arc::new(AppState {
            config,
            users,
            properties,
            sessions: sessions.clone(),
        });

        // Unregistered recorder; the handle renders an empty exposition
        let metrics_handle = PrometheusBuilder::new().build_recorder().handle();

        let app = routes::build_routes(state, metrics_handle);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind test server: {}", e))?;

        let addr = listener
            .local_addr()
            .map_err(|e| anyhow::anyhow!("Failed to get local address: {}", e))?;

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server error: {}", e);
            }
        });

        Ok(Self {
            addr,
            sessions,
            _handle: handle,
        })
    }

    /// Get the base URL of the test server.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get the socket address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Get the server's session store.
    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    /// Register `username` through `POST /signup`, asserting 201.
    pub async fn register(&self, username: &str, email: &str, password: &str) {
        let response = reqwest::Client::new()
            .post(format!("{}/signup", self.url()))
            .form(&[
                ("username", username),
                ("email", email),
                ("password", password),
            ])
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201, "signup should succeed");
    }

    /// Log in through `POST /login`, asserting 200; returns the access token.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = reqwest::Client::new()
            .post(format!("{}/login", self.url()))
            .form(&[("username", username), ("password", password)])
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200, "login should succeed");

        let body: serde_json::Value = response.json().await.unwrap();
        body["access_token"].as_str().unwrap().to_string()
    }
}

impl Drop for TestPsServer {
    fn drop(&mut self) {
        // Stop the HTTP server task immediately when the test completes
        self._handle.abort();
    }
}
