//! Property Search Service configuration.
//!
//! Configuration is loaded from environment variables. All sensitive
//! fields are redacted in Debug output.

use common::jwt::{DEFAULT_CLOCK_SKEW, MAX_CLOCK_SKEW, MIN_HMAC_SECRET_BYTES};
use common::secret::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::env;
use std::fmt;
use thiserror::Error;

/// Default HTTP bind address.
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:5000";

/// Default search index base URL.
pub const DEFAULT_SEARCH_URL: &str = "http://localhost:9201";

/// Default search index name.
pub const DEFAULT_SEARCH_INDEX: &str = "property";

/// Default (and maximum) number of hits requested per search.
pub const DEFAULT_SEARCH_MAX_RESULTS: u32 = 10_000;

/// Upper bound for `SEARCH_MAX_RESULTS` (index result window).
pub const MAX_SEARCH_MAX_RESULTS: u32 = 10_000;

/// Default search request timeout in seconds.
pub const DEFAULT_SEARCH_TIMEOUT_SECONDS: u64 = 10;

/// Default database statement/acquire timeout in seconds.
pub const DEFAULT_DB_QUERY_TIMEOUT_SECONDS: u32 = 5;

/// Default user token lifetime in seconds (10 minutes).
pub const DEFAULT_TOKEN_LIFETIME_SECONDS: u64 = 600;

/// Default interval between session sweeps in seconds.
pub const DEFAULT_SESSION_SWEEP_INTERVAL_SECONDS: u64 = 60;

/// Default graceful shutdown drain period in seconds.
pub const DEFAULT_SHUTDOWN_DRAIN_SECONDS: u64 = 0;

/// Property Search Service configuration.
///
/// Loaded from environment variables with sensible defaults.
/// Database URL and JWT secret are redacted in Debug output.
#[derive(Clone)]
pub struct Config {
    /// PostgreSQL connection URL.
    pub database_url: String,

    /// HS256 signing secret for user tokens.
    pub jwt_secret: SecretString,

    /// Server bind address (default: "0.0.0.0:5000").
    pub bind_address: String,

    /// Base URL of the Elasticsearch-compatible search index.
    pub search_url: String,

    /// Name of the index holding property documents.
    pub search_index: String,

    /// Maximum number of hits requested per search.
    pub search_max_results: u32,

    /// Search request timeout in seconds.
    pub search_timeout_seconds: u64,

    /// Database statement and pool acquire timeout in seconds.
    pub db_query_timeout_seconds: u32,

    /// Lifetime of issued user tokens and of their session entries.
    pub token_lifetime_seconds: u64,

    /// Interval between sweeps of expired session entries.
    pub session_sweep_interval_seconds: u64,

    /// JWT clock skew tolerance in seconds for `iat` validation.
    pub jwt_clock_skew_seconds: u64,

    /// Seconds to wait after a shutdown signal before stopping.
    pub shutdown_drain_seconds: u64,
}

/// Custom Debug implementation that redacts sensitive fields.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("bind_address", &self.bind_address)
            .field("search_url", &self.search_url)
            .field("search_index", &self.search_index)
            .field("search_max_results", &self.search_max_results)
            .field("search_timeout_seconds", &self.search_timeout_seconds)
            .field("db_query_timeout_seconds", &self.db_query_timeout_seconds)
            .field("token_lifetime_seconds", &self.token_lifetime_seconds)
            .field(
                "session_sweep_interval_seconds",
                &self.session_sweep_interval_seconds,
            )
            .field("jwt_clock_skew_seconds", &self.jwt_clock_skew_seconds)
            .field("shutdown_drain_seconds", &self.shutdown_drain_seconds)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid JWT secret: {0}")]
    InvalidJwtSecret(String),

    #[error("Invalid JWT clock skew configuration: {0}")]
    InvalidJwtClockSkew(String),

    #[error("Invalid search configuration: {0}")]
    InvalidSearch(String),

    #[error("Invalid duration configuration: {0}")]
    InvalidDuration(String),
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing).
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let database_url = vars
            .get("DATABASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?
            .clone();

        let jwt_secret = vars
            .get("JWT_SECRET")
            .ok_or_else(|| ConfigError::MissingEnvVar("JWT_SECRET".to_string()))?;
        if jwt_secret.len() < MIN_HMAC_SECRET_BYTES {
            return Err(ConfigError::InvalidJwtSecret(format!(
                "JWT_SECRET must be at least {} bytes, got {}",
                MIN_HMAC_SECRET_BYTES,
                jwt_secret.len()
            )));
        }
        let jwt_secret = SecretString::from(jwt_secret.clone());

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        let search_url = vars
            .get("SEARCH_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_SEARCH_URL.to_string());

        let search_index = vars
            .get("SEARCH_INDEX")
            .cloned()
            .unwrap_or_else(|| DEFAULT_SEARCH_INDEX.to_string());
        if search_index.trim().is_empty() || search_index.contains('/') {
            return Err(ConfigError::InvalidSearch(format!(
                "SEARCH_INDEX must be a non-empty index name, got '{}'",
                search_index
            )));
        }

        // Parse max results with validation
        let search_max_results = if let Some(value_str) = vars.get("SEARCH_MAX_RESULTS") {
            let value: u32 = value_str.parse().map_err(|e| {
                ConfigError::InvalidSearch(format!(
                    "SEARCH_MAX_RESULTS must be a valid positive integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if value == 0 || value > MAX_SEARCH_MAX_RESULTS {
                return Err(ConfigError::InvalidSearch(format!(
                    "SEARCH_MAX_RESULTS must be between 1 and {}, got {}",
                    MAX_SEARCH_MAX_RESULTS, value
                )));
            }

            value
        } else {
            DEFAULT_SEARCH_MAX_RESULTS
        };

        let search_timeout_seconds = parse_positive_secs(
            vars,
            "SEARCH_TIMEOUT_SECONDS",
            DEFAULT_SEARCH_TIMEOUT_SECONDS,
        )?;

        let db_query_timeout_seconds = parse_positive_secs(
            vars,
            "DB_QUERY_TIMEOUT_SECONDS",
            u64::from(DEFAULT_DB_QUERY_TIMEOUT_SECONDS),
        )?;
        let db_query_timeout_seconds = u32::try_from(db_query_timeout_seconds).map_err(|_| {
            ConfigError::InvalidDuration(format!(
                "DB_QUERY_TIMEOUT_SECONDS is too large, got {}",
                db_query_timeout_seconds
            ))
        })?;

        let token_lifetime_seconds = parse_positive_secs(
            vars,
            "TOKEN_LIFETIME_SECONDS",
            DEFAULT_TOKEN_LIFETIME_SECONDS,
        )?;

        let session_sweep_interval_seconds = parse_positive_secs(
            vars,
            "SESSION_SWEEP_INTERVAL_SECONDS",
            DEFAULT_SESSION_SWEEP_INTERVAL_SECONDS,
        )?;

        // Parse JWT clock skew tolerance with validation
        let jwt_clock_skew_seconds = if let Some(value_str) = vars.get("JWT_CLOCK_SKEW_SECONDS") {
            let value: i64 = value_str.parse().map_err(|e| {
                ConfigError::InvalidJwtClockSkew(format!(
                    "JWT_CLOCK_SKEW_SECONDS must be a valid integer, got '{}': {}",
                    value_str, e
                ))
            })?;

            if value <= 0 {
                return Err(ConfigError::InvalidJwtClockSkew(format!(
                    "JWT_CLOCK_SKEW_SECONDS must be positive, got {}",
                    value
                )));
            }

            let value = value.unsigned_abs();
            if value > MAX_CLOCK_SKEW.as_secs() {
                return Err(ConfigError::InvalidJwtClockSkew(format!(
                    "JWT_CLOCK_SKEW_SECONDS must not exceed {} seconds, got {}",
                    MAX_CLOCK_SKEW.as_secs(),
                    value
                )));
            }

            value
        } else {
            DEFAULT_CLOCK_SKEW.as_secs()
        };

        let shutdown_drain_seconds = if let Some(value_str) = vars.get("SHUTDOWN_DRAIN_SECONDS") {
            value_str.parse().map_err(|e| {
                ConfigError::InvalidDuration(format!(
                    "SHUTDOWN_DRAIN_SECONDS must be a valid non-negative integer, got '{}': {}",
                    value_str, e
                ))
            })?
        } else {
            DEFAULT_SHUTDOWN_DRAIN_SECONDS
        };

        Ok(Config {
            database_url,
            jwt_secret,
            bind_address,
            search_url,
            search_index,
            search_max_results,
            search_timeout_seconds,
            db_query_timeout_seconds,
            token_lifetime_seconds,
            session_sweep_interval_seconds,
            jwt_clock_skew_seconds,
            shutdown_drain_seconds,
        })
    }

    /// Raw bytes of the JWT signing secret.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.expose_secret().as_bytes()
    }
}

fn parse_positive_secs(
    vars: &HashMap<String, String>,
    name: &str,
    default: u64,
) -> Result<u64, ConfigError> {
    let Some(value_str) = vars.get(name) else {
        return Ok(default);
    };

    let value: u64 = value_str.parse().map_err(|e| {
        ConfigError::InvalidDuration(format!(
            "{} must be a valid positive integer, got '{}': {}",
            name, value_str, e
        ))
    })?;

    if value == 0 {
        return Err(ConfigError::InvalidDuration(format!(
            "{} must be greater than 0",
            name
        )));
    }

    Ok(value)
}
