//! Property Search Service error types.
//!
//! All errors map to appropriate HTTP status codes via the `IntoResponse` impl.
//! Store and index failures return generic messages to clients; the actual
//! errors are logged server-side.

use crate::models::Property;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Message returned when a token's embedded expiry has passed.
pub const TOKEN_EXPIRED_MESSAGE: &str = "Token has expired! Please Login Again";

/// Message returned for every other access guard failure.
pub const UNAUTHORIZED_MESSAGE: &str = "You are unauthorized to view these contents";

/// Message returned when login credentials do not match a user.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials";

/// Property Search Service error type.
///
/// Maps to appropriate HTTP status codes:
/// - BadRequest: 400 Bad Request
/// - InvalidCredentials, TokenExpired, InvalidToken: 401 Unauthorized
/// - NotFound: 404 Not Found (body carries an empty `results` list)
/// - Database, SearchIndex, Internal: 500 Internal Server Error
#[derive(Debug, Error)]
pub enum PsError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Search index error: {0}")]
    SearchIndex(String),

    #[error("Internal server error")]
    Internal,
}

impl PsError {
    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            PsError::BadRequest(_) => 400,
            PsError::InvalidCredentials | PsError::TokenExpired | PsError::InvalidToken => 401,
            PsError::NotFound(_) => 404,
            PsError::Database(_) | PsError::SearchIndex(_) | PsError::Internal => 500,
        }
    }

    /// Bounded label describing this error, for metrics.
    pub fn error_type(&self) -> &'static str {
        match self {
            PsError::BadRequest(_) => "bad_request",
            PsError::InvalidCredentials => "invalid_credentials",
            PsError::TokenExpired => "token_expired",
            PsError::InvalidToken => "invalid_token",
            PsError::NotFound(_) => "not_found",
            PsError::Database(_) => "database",
            PsError::SearchIndex(_) => "search_index",
            PsError::Internal => "internal",
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,

    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<Vec<Property>>,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for PsError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            PsError::BadRequest(reason) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", reason.clone()),
            PsError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                INVALID_CREDENTIALS_MESSAGE.to_string(),
            ),
            PsError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "TOKEN_EXPIRED",
                TOKEN_EXPIRED_MESSAGE.to_string(),
            ),
            PsError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "INVALID_TOKEN",
                UNAUTHORIZED_MESSAGE.to_string(),
            ),
            PsError::NotFound(message) => (StatusCode::NOT_FOUND, "NOT_FOUND", message.clone()),
            PsError::Database(err) => {
                // Log actual error server-side, return generic message to client
                tracing::error!(target: "ps.database", error = %err, "Database operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "An internal database error occurred".to_string(),
                )
            }
            PsError::SearchIndex(err) => {
                tracing::error!(target: "ps.search_index", error = %err, "Search index request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SEARCH_ERROR",
                    "An internal search error occurred".to_string(),
                )
            }
            PsError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            ),
        };

        let results = match self {
            PsError::NotFound(_) => Some(Vec::new()),
            _ => None,
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
            results,
        };

        let mut response = (status, Json(error_response)).into_response();

        // Add WWW-Authenticate header for 401 responses
        if status == StatusCode::UNAUTHORIZED {
            if let Ok(header_value) =
                "Bearer realm=\"property-search\", error=\"invalid_token\"".parse()
            {
                response
                    .headers_mut()
                    .insert("WWW-Authenticate", header_value);
            }
        }

        response
    }
}

/// Convert sqlx errors to PsError
impl From<sqlx::Error> for PsError {
    fn from(err: sqlx::Error) -> Self {
        PsError::Database(err.to_string())
    }
}

/// Convert search transport errors to PsError
impl From<reqwest::Error> for PsError {
    fn from(err: reqwest::Error) -> Self {
        PsError::SearchIndex(err.to_string())
    }
}
