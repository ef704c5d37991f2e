//! Token helpers for E2E tests.
//!
//! Mints tokens directly with the shared HS256 utilities so tests can
//! present tokens the login flow would never hand out (expired, foreign).

use chrono::Utc;
use common::jwt::{sign_hs256, UserClaims};
use std::time::Duration;

/// Secret the test harness configures for the service.
pub const TEST_JWT_SECRET: &str = "test-secret-that-is-at-least-32-bytes-long";

/// A token for `username` issued `age` ago with the given lifetime.
///
/// # Panics
///
/// Panics if `age` is out of range or signing fails.
pub fn token_issued_ago(username: &str, age: Duration, lifetime: Duration) -> String {
    let age = chrono::Duration::from_std(age).expect("token age out of range");
    let issued_at = (Utc::now() - age).timestamp();
    let claims = UserClaims::new(username, issued_at, lifetime);
    sign_hs256(&claims, TEST_JWT_SECRET.as_bytes()).unwrap()
}

/// A token for `username` that expired one hour ago.
pub fn expired_token(username: &str) -> String {
    token_issued_ago(
        username,
        Duration::from_secs(3600 + 600),
        Duration::from_secs(600),
    )
}

/// A well-formed, unexpired token signed with a secret the service does not know.
///
/// # Panics
///
/// Panics if signing fails.
pub fn foreign_token(username: &str) -> String {
    let claims = UserClaims::new(username, Utc::now().timestamp(), Duration::from_secs(600));
    sign_hs256(&claims, b"some-other-secret-that-is-32-bytes-long").unwrap()
}
