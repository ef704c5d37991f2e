//! Access guard for protected routes.
//!
//! Reads the token from the Authorization header, verifies it and injects
//! the claims into request extensions.

use crate::crypto;
use crate::errors::PsError;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::IntoResponse,
};
use common::secret::{ExposeSecret, SecretString};
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

/// State for the access guard.
#[derive(Clone)]
pub struct AuthState {
    /// HMAC secret used to verify user tokens.
    pub jwt_secret: SecretString,

    /// Tolerance for `iat` claims issued slightly in the future.
    pub clock_skew: Duration,
}

/// Access guard that validates user tokens.
///
/// # Authorization Header Format
///
/// ```text
/// Authorization: Bearer <token>
/// Authorization: <token>
/// ```
///
/// # Response
///
/// - 401 `TOKEN_EXPIRED` when the token's embedded expiry has passed
/// - 401 `INVALID_TOKEN` when the header is missing or the token fails verification
/// - Otherwise continues with [`UserClaims`](common::jwt::UserClaims) in extensions
///
/// The session store is not consulted; a token stays valid until its own
/// expiry.
#[instrument(skip_all, name = "ps.middleware.auth")]
pub async fn require_auth(
    State(state): State<Arc<AuthState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, PsError> {
    let token = req
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .map(extract_token)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            tracing::debug!(target: "ps.middleware.auth", "Missing or empty Authorization header");
            PsError::InvalidToken
        })?;

    let claims = crypto::verify_user_token(
        token,
        state.jwt_secret.expose_secret().as_bytes(),
        state.clock_skew,
    )
    .inspect_err(|e| {
        tracing::debug!(target: "ps.middleware.auth", error = %e, "Token rejected");
    })?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Strip an optional `Bearer` scheme prefix.
///
/// The scheme only counts when followed by whitespace or nothing, so a bare
/// token that happens to start with "Bearer" is left intact.
fn extract_token(header: &str) -> &str {
    let header = header.trim_start();
    header
        .strip_prefix("Bearer")
        .filter(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
        .unwrap_or(header)
        .trim()
}
