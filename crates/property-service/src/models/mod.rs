//! Data models for the Property Search Service.

use common::secret::SecretString;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

// ============================================================================
// Users
// ============================================================================

/// User record (maps to the `users` table).
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub username: String,
    pub email: String,
}

/// Validated registration input, ready to persist.
///
/// `password_hash` is the hex SHA-256 digest of the submitted password.
#[derive(Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .finish()
    }
}

/// Form body for `POST /signup`.
///
/// Every field is optional at the extractor level so that missing fields
/// produce the same validation error as blank ones.
#[derive(Debug, Default, Deserialize)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<SecretString>,
}

/// Form body for `POST /login`.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<SecretString>,
}

/// Response for a successful registration.
#[derive(Debug, Serialize, Deserialize)]
pub struct SignupResponse {
    pub message: String,
}

/// Response for a successful login.
///
/// The token is not redacted here: it is the response payload.
#[derive(Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub message: String,
}

impl fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginResponse")
            .field("access_token", &"[REDACTED]")
            .field("message", &self.message)
            .finish()
    }
}

// ============================================================================
// Search
// ============================================================================

/// Property document as stored in the search index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub title: String,
    pub amenities: String,
    pub price: f64,
    pub location: String,
}

/// Sort direction for search results, by price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Parse a sort order as accepted on the query string.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw query parameters for `GET /search`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SearchParams {
    pub title: Option<String>,
    pub amenities: Option<String>,
    pub price: Option<String>,
    pub location: Option<String>,
    pub sort_order: Option<String>,
}

/// Validated and normalized search query.
///
/// Text fragments are trimmed, lowercased and at least three characters long.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub title: Option<String>,
    pub amenities: Option<String>,
    pub max_price: Option<f64>,
    pub location: String,
    pub sort_order: SortOrder,
}

/// Response for a search with at least one hit.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub message: String,
    pub results: Vec<Property>,
}

// ============================================================================
// Health
// ============================================================================

/// Readiness probe response.
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    /// Service readiness status ("ready" or "not_ready").
    pub status: &'static str,

    /// Credential store connectivity status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<&'static str>,

    /// Search index reachability.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_index: Option<&'static str>,

    /// Error message (generic, no infrastructure details).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use common::secret::ExposeSecret;

    #[test]
    fn test_sort_order_parse() {
        assert_eq!(SortOrder::parse("asc"), Some(SortOrder::Asc));
        assert_eq!(SortOrder::parse("desc"), Some(SortOrder::Desc));
        assert_eq!(SortOrder::parse("ASC"), None);
        assert_eq!(SortOrder::parse("random"), None);
        assert_eq!(SortOrder::default(), SortOrder::Asc);
        assert_eq!(SortOrder::Desc.to_string(), "desc");
    }

    #[test]
    fn test_property_deserializes_from_index_source() {
        let source = serde_json::json!({
            "title": "Sunny Loft",
            "amenities": "pool, gym",
            "price": 1200,
            "location": "Downtown",
            "listed_by": "ignored"
        });

        let property: Property = serde_json::from_value(source).unwrap();
        assert_eq!(property.title, "Sunny Loft");
        assert!((property.price - 1200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_signup_request_deserializes_partial_form() {
        let request: SignupRequest =
            serde_json::from_value(serde_json::json!({"username": "alice"})).unwrap();
        assert_eq!(request.username.as_deref(), Some("alice"));
        assert!(request.email.is_none());
        assert!(request.password.is_none());
    }

    #[test]
    fn test_login_request_debug_redacts_password() {
        let request: LoginRequest = serde_json::from_value(
            serde_json::json!({"username": "alice", "password": "secret1"}),
        )
        .unwrap();

        assert_eq!(request.password.as_ref().unwrap().expose_secret(), "secret1");
        let debug = format!("{:?}", request);
        assert!(!debug.contains("secret1"));
    }

    #[test]
    fn test_new_user_debug_redacts_hash() {
        let user = NewUser {
            username: "alice".to_string(),
            email: "a@b.com".to_string(),
            password_hash: "deadbeef".to_string(),
        };
        let debug = format!("{:?}", user);
        assert!(debug.contains("alice"));
        assert!(!debug.contains("deadbeef"));
    }

    #[test]
    fn test_login_response_debug_redacts_token() {
        let response = LoginResponse {
            access_token: "eyJhbGciOi.token.value".to_string(),
            message: "User logged in successfully".to_string(),
        };
        let debug = format!("{:?}", response);
        assert!(!debug.contains("eyJhbGciOi"));

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["access_token"], "eyJhbGciOi.token.value");
    }

    #[test]
    fn test_readiness_response_serialization() {
        let ready = ReadinessResponse {
            status: "ready",
            database: Some("healthy"),
            search_index: Some("available"),
            error: None,
        };

        let json = serde_json::to_string(&ready).unwrap();
        assert!(json.contains("\"status\":\"ready\""));
        assert!(json.contains("\"search_index\":\"available\""));
        assert!(!json.contains("\"error\""));
    }
}
