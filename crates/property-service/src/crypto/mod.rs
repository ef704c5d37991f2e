//! Password digests and user token helpers.
//!
//! # Security
//!
//! Passwords are stored as an unsalted, hex-encoded SHA-256 digest. This
//! matches the existing `users.password` column and is weaker than a slow,
//! salted KDF; migrating stored digests is tracked separately.

use crate::errors::PsError;
use common::jwt::{self, JwtValidationError, UserClaims};
use common::secret::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::instrument;

/// Hex-encoded SHA-256 digest of a password.
#[instrument(skip_all)]
pub fn hash_password(password: &SecretString) -> String {
    let digest = Sha256::digest(password.expose_secret().as_bytes());
    hex::encode(digest)
}

/// Issue a signed user token for `username`.
///
/// Returns the encoded token and the claims it carries.
#[instrument(skip_all)]
pub fn issue_user_token(
    username: &str,
    secret: &[u8],
    lifetime: Duration,
) -> Result<(String, UserClaims), PsError> {
    let claims = UserClaims::new(username, chrono::Utc::now().timestamp(), lifetime);

    let token = jwt::sign_hs256(&claims, secret).map_err(|e| {
        tracing::error!(target: "crypto", error = %e, "Failed to sign user token");
        PsError::Internal
    })?;

    Ok((token, claims))
}

/// Verify a user token.
///
/// Expiry maps to [`PsError::TokenExpired`]; every other failure maps to
/// [`PsError::InvalidToken`].
#[instrument(skip_all)]
pub fn verify_user_token(
    token: &str,
    secret: &[u8],
    clock_skew: Duration,
) -> Result<UserClaims, PsError> {
    jwt::verify_hs256(token, secret, clock_skew).map_err(|e| match e {
        JwtValidationError::Expired => PsError::TokenExpired,
        _ => PsError::InvalidToken,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use common::jwt::{sign_hs256, DEFAULT_CLOCK_SKEW};

    const SECRET: &[u8] = b"test-secret-that-is-at-least-32-bytes-long";

    #[test]
    fn test_hash_password_is_sha256_hex() {
        let hash = hash_password(&SecretString::from("secret1"));
        assert_eq!(
            hash,
            "5b11618c2e44027877d0cd0921ed166b9f176f50587fc91e7534dd2946db77d6"
        );
    }

    #[test]
    fn test_hash_password_is_deterministic() {
        let a = hash_password(&SecretString::from("password123"));
        let b = hash_password(&SecretString::from("password123"));
        let c = hash_password(&SecretString::from("password124"));

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_issue_and_verify_user_token() {
        let (token, claims) =
            issue_user_token("alice", SECRET, Duration::from_secs(600)).unwrap();

        let verified = verify_user_token(&token, SECRET, DEFAULT_CLOCK_SKEW).unwrap();
        assert_eq!(verified.sub, "alice");
        assert_eq!(verified, claims);
        assert_eq!(verified.exp - verified.iat, 600);
    }

    #[test]
    fn test_issue_fails_with_short_secret() {
        let result = issue_user_token("alice", b"short", Duration::from_secs(600));
        assert!(matches!(result, Err(PsError::Internal)));
    }

    #[test]
    fn test_verify_expired_token_maps_to_token_expired() {
        let now = chrono::Utc::now().timestamp();
        let claims = UserClaims::new("alice", now - 1200, Duration::from_secs(600));
        let token = sign_hs256(&claims, SECRET).unwrap();

        let result = verify_user_token(&token, SECRET, DEFAULT_CLOCK_SKEW);
        assert!(matches!(result, Err(PsError::TokenExpired)));
    }

    #[test]
    fn test_verify_garbage_maps_to_invalid_token() {
        let result = verify_user_token("not-a-token", SECRET, DEFAULT_CLOCK_SKEW);
        assert!(matches!(result, Err(PsError::InvalidToken)));
    }

    #[test]
    fn test_verify_wrong_secret_maps_to_invalid_token() {
        let (token, _) = issue_user_token(
            "alice",
            b"another-secret-that-is-32-bytes-or-more",
            Duration::from_secs(600),
        )
        .unwrap();

        let result = verify_user_token(&token, SECRET, DEFAULT_CLOCK_SKEW);
        assert!(matches!(result, Err(PsError::InvalidToken)));
    }
}
