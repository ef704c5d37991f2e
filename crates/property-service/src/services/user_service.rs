//! User service for registration and login.

use crate::config::Config;
use crate::crypto;
use crate::errors::PsError;
use crate::models::{LoginRequest, LoginResponse, NewUser, SignupRequest};
use crate::repositories::{InsertOutcome, UserRepository};
use crate::services::session_store::{SessionClaim, SessionStore};
use common::secret::ExposeSecret;
use std::time::Duration;
use tracing::instrument;

// Validation
const MIN_USERNAME_LENGTH: usize = 4;
const MIN_PASSWORD_LENGTH: usize = 6;

pub const SIGNUP_FIELDS_REQUIRED: &str = "Username, email, and password are required";
pub const LOGIN_FIELDS_REQUIRED: &str = "Username and password are required";
pub const USERNAME_TOO_SHORT: &str = "Username must be at least 4 characters long";
pub const USERNAME_HAS_WHITESPACE: &str = "Username must not contain whitespace";
pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters long";
pub const INVALID_EMAIL: &str = "Invalid email format";
pub const USER_EXISTS: &str = "Username or email already exists";

pub const REGISTERED: &str = "User registered successfully";
pub const LOGGED_IN: &str = "User logged in successfully";
pub const ALREADY_LOGGED_IN: &str = "User already logged in";

/// Register a new user.
///
/// # Steps
///
/// 1. Require username, email and password (non-blank)
/// 2. Normalize username and email (trim, lowercase)
/// 3. Validate username, password length and email format
/// 4. Reject an existing username or email
/// 5. Hash password (SHA-256, hex)
/// 6. Insert inside a transaction; a uniqueness race is reported like step 4
///
/// Validation failures never reach the store.
#[instrument(skip_all)]
pub async fn register_user(
    users: &dyn UserRepository,
    request: SignupRequest,
) -> Result<(), PsError> {
    let (Some(username), Some(email), Some(password)) =
        (request.username, request.email, request.password)
    else {
        return Err(PsError::BadRequest(SIGNUP_FIELDS_REQUIRED.to_string()));
    };

    let username = normalize(&username);
    let email = normalize(&email);
    if username.is_empty() || email.is_empty() || password.expose_secret().trim().is_empty() {
        return Err(PsError::BadRequest(SIGNUP_FIELDS_REQUIRED.to_string()));
    }

    if username.chars().count() < MIN_USERNAME_LENGTH {
        return Err(PsError::BadRequest(USERNAME_TOO_SHORT.to_string()));
    }

    if username.chars().any(char::is_whitespace) {
        return Err(PsError::BadRequest(USERNAME_HAS_WHITESPACE.to_string()));
    }

    if password.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PsError::BadRequest(PASSWORD_TOO_SHORT.to_string()));
    }

    if !is_valid_email(&email) {
        return Err(PsError::BadRequest(INVALID_EMAIL.to_string()));
    }

    if users.exists(&username, &email).await? {
        tracing::debug!(target: "ps.auth", "Registration rejected: user exists");
        return Err(PsError::BadRequest(USER_EXISTS.to_string()));
    }

    let new_user = NewUser {
        username,
        email,
        password_hash: crypto::hash_password(&password),
    };

    match users.insert(&new_user).await? {
        InsertOutcome::Created => {
            tracing::info!(target: "ps.auth", username = %new_user.username, "User registered");
            Ok(())
        }
        InsertOutcome::Duplicate => {
            tracing::debug!(target: "ps.auth", "Registration rejected: lost uniqueness race");
            Err(PsError::BadRequest(USER_EXISTS.to_string()))
        }
    }
}

/// Log a user in.
///
/// Returns the tracked token when the user already holds a live session
/// (tracked entry unexpired AND token still verifies); otherwise mints a
/// new token, tracks it for the token lifetime and returns it.
#[instrument(skip_all)]
pub async fn login_user(
    users: &dyn UserRepository,
    sessions: &dyn SessionStore,
    config: &Config,
    request: LoginRequest,
) -> Result<LoginResponse, PsError> {
    let (Some(username), Some(password)) = (request.username, request.password) else {
        return Err(PsError::BadRequest(LOGIN_FIELDS_REQUIRED.to_string()));
    };

    let username = normalize(&username);
    if username.is_empty() || password.expose_secret().trim().is_empty() {
        return Err(PsError::BadRequest(LOGIN_FIELDS_REQUIRED.to_string()));
    }

    let password_hash = crypto::hash_password(&password);
    let Some(user) = users.find_by_credentials(&username, &password_hash).await? else {
        tracing::debug!(target: "ps.auth", "Login rejected: invalid credentials");
        return Err(PsError::InvalidCredentials);
    };

    let secret = config.jwt_secret_bytes();
    let lifetime = Duration::from_secs(config.token_lifetime_seconds);
    let clock_skew = Duration::from_secs(config.jwt_clock_skew_seconds);
    let subject = user.username.as_str();

    let is_live = |token: &str| {
        crypto::verify_user_token(token, secret, clock_skew)
            .map(|claims| claims.sub == subject)
            .unwrap_or(false)
    };
    let mint = || crypto::issue_user_token(subject, secret, lifetime).map(|(token, _)| token);

    let (access_token, message) = match sessions.claim(subject, lifetime, &is_live, &mint).await? {
        SessionClaim::Existing(token) => {
            tracing::info!(target: "ps.auth", username = %subject, "Returning existing session");
            (token, ALREADY_LOGGED_IN)
        }
        SessionClaim::Inserted(token) => {
            tracing::info!(target: "ps.auth", username = %subject, "User logged in");
            (token, LOGGED_IN)
        }
    };

    Ok(LoginResponse {
        access_token,
        message: message.to_string(),
    })
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Simple email validation.
///
/// Checks for basic email format: local@domain.tld, no whitespace.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    // Exactly one '@' and a non-empty local part
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    // Domain must have at least one dot and no empty labels
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }

    labels.iter().all(|label| !label.is_empty())
}
