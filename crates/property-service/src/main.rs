//! Property Search Service
//!
//! Entry point: user registration and login, token-guarded property search.

use property_service::config::Config;
use property_service::observability::metrics::init_metrics_recorder;
use property_service::repositories::{ElasticsearchPropertyIndex, PgUserRepository};
use property_service::routes::{self, AppState};
use property_service::services::{InMemorySessionStore, SessionStore};
use property_service::tasks::start_session_sweeper;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "property_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Property Search Service");

    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        bind_address = %config.bind_address,
        search_url = %config.search_url,
        search_index = %config.search_index,
        token_lifetime_seconds = config.token_lifetime_seconds,
        "Configuration loaded successfully"
    );

    let metrics_handle = init_metrics_recorder().map_err(|e| {
        error!("Failed to initialize metrics: {}", e);
        e
    })?;

    info!("Connecting to database...");
    let db_url_with_timeout =
        add_query_timeout(&config.database_url, config.db_query_timeout_seconds);
    let db_pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(u64::from(config.db_query_timeout_seconds)))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(&db_url_with_timeout)
        .await
        .map_err(|e| {
            error!("Failed to connect to database: {}", e);
            e
        })?;

    sqlx::migrate!("../../migrations")
        .run(&db_pool)
        .await
        .map_err(|e| {
            error!("Failed to run migrations: {}", e);
            e
        })?;

    info!("Database connection established");

    let properties = ElasticsearchPropertyIndex::new(
        config.search_url.clone(),
        config.search_index.clone(),
        Duration::from_secs(config.search_timeout_seconds),
    )?;

    let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());

    let cancel_token = CancellationToken::new();
    let sweeper = tokio::spawn(start_session_sweeper(
        sessions.clone(),
        Duration::from_secs(config.session_sweep_interval_seconds),
        cancel_token.clone(),
    ));

    let bind_address = config.bind_address.clone();
    let drain = Duration::from_secs(config.shutdown_drain_seconds);

    let state = Arc::new(AppState {
        config,
        users: Arc::new(PgUserRepository::new(db_pool)),
        properties: Arc::new(properties),
        sessions,
    });

    let app = routes::build_routes(state, metrics_handle);

    let addr: SocketAddr = bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;

    info!("Property Search Service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(drain))
        .await?;

    cancel_token.cancel();
    if let Err(e) = sweeper.await {
        warn!("Session sweeper ended abnormally: {}", e);
    }

    info!("Property Search Service shutdown complete");

    Ok(())
}

/// Listens for shutdown signals (SIGTERM, SIGINT).
/// Returns when a signal is received and the drain period is complete.
async fn shutdown_signal(drain: Duration) {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown..."),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown...");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    if drain.is_zero() {
        info!("Skipping drain period");
    } else {
        warn!("Draining connections for {} seconds...", drain.as_secs());
        tokio::time::sleep(drain).await;
        info!("Drain period complete");
    }
}

/// Adds statement_timeout to the database URL.
fn add_query_timeout(url: &str, timeout_secs: u32) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}options=-c%20statement_timeout%3D{timeout_secs}s")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_query_timeout() {
        assert_eq!(
            add_query_timeout("postgresql://localhost/ps", 5),
            "postgresql://localhost/ps?options=-c%20statement_timeout%3D5s"
        );
        assert_eq!(
            add_query_timeout("postgresql://localhost/ps?sslmode=disable", 3),
            "postgresql://localhost/ps?sslmode=disable&options=-c%20statement_timeout%3D3s"
        );
    }
}
