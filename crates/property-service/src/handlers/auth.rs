//! Registration and login handlers.
//!
//! - `POST /signup` - Register a user (form body)
//! - `POST /login` - Issue or return the user's access token (form body)
//!
//! A body that cannot be read as a form (wrong content type, bad encoding)
//! is treated like one with missing fields.

use crate::errors::PsError;
use crate::models::{LoginRequest, LoginResponse, SignupRequest, SignupResponse};
use crate::observability::metrics;
use crate::routes::AppState;
use crate::services::user_service::{
    self, ALREADY_LOGGED_IN, LOGIN_FIELDS_REQUIRED, REGISTERED, SIGNUP_FIELDS_REQUIRED,
};
use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    Form, Json,
};
use std::sync::Arc;
use tracing::instrument;

/// Handler for POST /signup
///
/// # Response
///
/// - 201 Created with `{"message": "User registered successfully"}`
/// - 400 Bad Request on validation failure or existing username/email
/// - 500 Internal Server Error on store failure
#[instrument(skip_all, name = "ps.handlers.signup")]
pub async fn signup(
    State(state): State<Arc<AppState>>,
    form: Result<Form<SignupRequest>, FormRejection>,
) -> Result<(StatusCode, Json<SignupResponse>), PsError> {
    let result = match form {
        Ok(Form(request)) => user_service::register_user(state.users.as_ref(), request).await,
        Err(rejection) => {
            tracing::debug!(target: "ps.handlers", error = %rejection, "Unreadable signup form");
            Err(PsError::BadRequest(SIGNUP_FIELDS_REQUIRED.to_string()))
        }
    };

    match result {
        Ok(()) => {
            metrics::record_signup("success");
            Ok((
                StatusCode::CREATED,
                Json(SignupResponse {
                    message: REGISTERED.to_string(),
                }),
            ))
        }
        Err(e) => {
            metrics::record_signup(e.error_type());
            Err(e)
        }
    }
}

/// Handler for POST /login
///
/// # Response
///
/// - 200 OK with `{"access_token", "message"}`
/// - 400 Bad Request when username or password is missing
/// - 401 Unauthorized on invalid credentials
/// - 500 Internal Server Error on store failure
#[instrument(skip_all, name = "ps.handlers.login")]
pub async fn login(
    State(state): State<Arc<AppState>>,
    form: Result<Form<LoginRequest>, FormRejection>,
) -> Result<Json<LoginResponse>, PsError> {
    let result = match form {
        Ok(Form(request)) => {
            user_service::login_user(
                state.users.as_ref(),
                state.sessions.as_ref(),
                &state.config,
                request,
            )
            .await
        }
        Err(rejection) => {
            tracing::debug!(target: "ps.handlers", error = %rejection, "Unreadable login form");
            Err(PsError::BadRequest(LOGIN_FIELDS_REQUIRED.to_string()))
        }
    };

    match result {
        Ok(response) => {
            let outcome = if response.message == ALREADY_LOGGED_IN {
                "existing"
            } else {
                "issued"
            };
            metrics::record_login(outcome);
            Ok(Json(response))
        }
        Err(e) => {
            metrics::record_login(e.error_type());
            Err(e)
        }
    }
}
