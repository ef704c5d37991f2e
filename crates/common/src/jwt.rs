//! JWT utilities for user bearer tokens.
//!
//! This module provides:
//! - Size limits for DoS prevention
//! - Clock skew constants for iat validation
//! - User token claims with redacted Debug output
//! - HS256 signing and verification with typed failures
//!
//! # Security
//!
//! - Tokens are size-checked BEFORE parsing (DoS prevention)
//! - Only HS256 is accepted; the algorithm in the token header is not trusted
//! - Expiry is validated with zero leeway so the issued lifetime is exact
//! - Expiry is reported separately from every other failure so callers can
//!   tell a user to log in again without revealing why other tokens fail
//!
//! # Usage
//!
//! ```rust,ignore
//! use common::jwt::{sign_hs256, verify_hs256, UserClaims, DEFAULT_CLOCK_SKEW};
//!
//! let claims = UserClaims::new("alice", now, Duration::from_secs(600));
//! let token = sign_hs256(&claims, secret)?;
//! let decoded = verify_hs256(&token, secret, DEFAULT_CLOCK_SKEW)?;
//! ```

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Maximum allowed JWT size in bytes (8KB).
///
/// Tokens larger than this are rejected BEFORE any base64 decoding or
/// signature work. A user token for this service is ~250 bytes.
pub const MAX_JWT_SIZE_BYTES: usize = 8192; // 8KB

/// Minimum HMAC secret length in bytes for HS256 signing.
pub const MIN_HMAC_SECRET_BYTES: usize = 32;

/// Default JWT clock skew tolerance for `iat` validation (5 minutes).
pub const DEFAULT_CLOCK_SKEW: Duration = Duration::from_secs(300);

/// Maximum allowed JWT clock skew tolerance (10 minutes).
pub const MAX_CLOCK_SKEW: Duration = Duration::from_secs(600);

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during JWT validation.
///
/// Every variant except `Expired` renders the same generic message.
/// Detailed information is logged at debug level for troubleshooting.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtValidationError {
    /// Token `exp` claim is in the past.
    #[error("The access token has expired")]
    Expired,

    /// Token size exceeds maximum allowed.
    #[error("The access token is invalid")]
    TokenTooLarge,

    /// Token format is invalid (not a valid JWT structure or claims).
    #[error("The access token is invalid")]
    MalformedToken,

    /// Signature does not match the configured secret.
    #[error("The access token is invalid")]
    InvalidSignature,

    /// Token carries an empty subject.
    #[error("The access token is invalid")]
    MissingSubject,

    /// Token `iat` claim is too far in the future.
    #[error("The access token is invalid")]
    IatTooFarInFuture,
}

/// Errors that can occur while signing a token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtSigningError {
    /// The signing secret is shorter than [`MIN_HMAC_SECRET_BYTES`].
    #[error("Signing secret too short: expected at least {MIN_HMAC_SECRET_BYTES} bytes, got {0}")]
    SecretTooShort(usize),

    /// The underlying encoder failed.
    #[error("JWT signing operation failed: {0}")]
    Encoding(String),
}

// =============================================================================
// Claims Types
// =============================================================================

/// User token claims.
///
/// - `sub`: normalized username the token is bound to
/// - `exp`: expiration timestamp (Unix epoch seconds)
/// - `iat`: issued-at timestamp (Unix epoch seconds)
/// - `jti`: unique token id, so two logins in the same second differ
///
/// `sub` and `jti` are redacted in Debug output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserClaims {
    /// Subject (username) - redacted in Debug output.
    pub sub: String,

    /// Expiration timestamp (Unix epoch seconds).
    pub exp: i64,

    /// Issued-at timestamp (Unix epoch seconds).
    pub iat: i64,

    /// Token identifier - redacted in Debug output.
    pub jti: String,
}

impl fmt::Debug for UserClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserClaims")
            .field("sub", &"[REDACTED]")
            .field("exp", &self.exp)
            .field("iat", &self.iat)
            .field("jti", &"[REDACTED]")
            .finish()
    }
}

impl UserClaims {
    /// Build claims for `sub` issued at `issued_at` that live for `lifetime`.
    #[must_use]
    pub fn new(sub: &str, issued_at: i64, lifetime: Duration) -> Self {
        // Lifetimes are configured in seconds and bounded far below i64::MAX
        #[allow(clippy::cast_possible_wrap)]
        let lifetime_secs = lifetime.as_secs() as i64;

        Self {
            sub: sub.to_string(),
            exp: issued_at.saturating_add(lifetime_secs),
            iat: issued_at,
            jti: uuid::Uuid::new_v4().to_string(),
        }
    }
}

// =============================================================================
// Functions
// =============================================================================

/// Sign user claims with HS256.
///
/// # Errors
///
/// - `SecretTooShort` - secret is shorter than [`MIN_HMAC_SECRET_BYTES`]
/// - `Encoding` - the encoder rejected the claims
pub fn sign_hs256(claims: &UserClaims, secret: &[u8]) -> Result<String, JwtSigningError> {
    if secret.len() < MIN_HMAC_SECRET_BYTES {
        return Err(JwtSigningError::SecretTooShort(secret.len()));
    }

    let mut header = Header::new(Algorithm::HS256);
    header.typ = Some("JWT".to_string());

    encode(&header, claims, &EncodingKey::from_secret(secret))
        .map_err(|e| JwtSigningError::Encoding(e.to_string()))
}

/// Verify an HS256 user token and return its claims.
///
/// # Security Checks
///
/// 1. Size check - reject tokens > 8KB before parsing
/// 2. Verify HS256 signature
/// 3. Validate `exp` with zero leeway
/// 4. Require a non-empty `sub`
/// 5. Validate `iat` with clock skew tolerance
///
/// # Errors
///
/// Returns [`JwtValidationError::Expired`] for expired tokens and one of the
/// generic variants for any other failure.
pub fn verify_hs256(
    token: &str,
    secret: &[u8],
    clock_skew: Duration,
) -> Result<UserClaims, JwtValidationError> {
    if token.len() > MAX_JWT_SIZE_BYTES {
        tracing::debug!(
            target: "common.jwt",
            token_size = token.len(),
            max_size = MAX_JWT_SIZE_BYTES,
            "Token rejected: size exceeds maximum allowed"
        );
        return Err(JwtValidationError::TokenTooLarge);
    }

    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.validate_exp = true;
    validation.set_required_spec_claims(&["exp", "sub"]);

    let token_data = decode::<UserClaims>(token, &DecodingKey::from_secret(secret), &validation)
        .map_err(|e| {
            tracing::debug!(target: "common.jwt", error = %e, "Token verification failed");
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtValidationError::Expired,
                ErrorKind::InvalidSignature => JwtValidationError::InvalidSignature,
                _ => JwtValidationError::MalformedToken,
            }
        })?;

    let claims = token_data.claims;

    if claims.sub.trim().is_empty() {
        tracing::debug!(target: "common.jwt", "Token rejected: empty subject");
        return Err(JwtValidationError::MissingSubject);
    }

    validate_iat(claims.iat, clock_skew)?;

    Ok(claims)
}

/// Validate the `iat` (issued-at) claim with clock skew tolerance.
///
/// Rejects tokens with `iat` more than `clock_skew` in the future.
///
/// # Errors
///
/// Returns `JwtValidationError::IatTooFarInFuture` if the iat timestamp is more than
/// `clock_skew` in the future.
pub fn validate_iat(iat: i64, clock_skew: Duration) -> Result<(), JwtValidationError> {
    let now = chrono::Utc::now().timestamp();
    validate_iat_at(iat, clock_skew, now)
}

/// Deterministic `iat` validation against an explicit `now` timestamp.
pub(crate) fn validate_iat_at(
    iat: i64,
    clock_skew: Duration,
    now: i64,
) -> Result<(), JwtValidationError> {
    // Safe cast: clock_skew is bounded to MAX_CLOCK_SKEW (600 seconds), well within i64 range
    #[allow(clippy::cast_possible_wrap)]
    let clock_skew_secs = clock_skew.as_secs() as i64;
    let max_iat = now + clock_skew_secs;

    if iat > max_iat {
        tracing::debug!(
            target: "common.jwt",
            iat = iat,
            now = now,
            max_allowed = max_iat,
            clock_skew_secs = clock_skew_secs,
            "Token rejected: iat too far in the future"
        );
        return Err(JwtValidationError::IatTooFarInFuture);
    }

    Ok(())
}
