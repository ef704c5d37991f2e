//! Property search handler.

use crate::errors::PsError;
use crate::models::{SearchParams, SearchResponse};
use crate::routes::AppState;
use crate::services::search_service;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use std::sync::Arc;
use tracing::instrument;

/// Handler for GET /search
///
/// Requires a valid access token (applied by `require_auth`).
///
/// # Query Parameters
///
/// - `location` (required) - Location fragment, at least three letters
/// - `title`, `amenities` (optional) - Fragments, at least three letters
/// - `price` (optional) - Maximum price, non-negative number
/// - `sort_order` (optional) - `asc` (default) or `desc`, by price
///
/// # Response
///
/// - 200 OK with `{"message", "results"}`
/// - 400 Bad Request on validation failure
/// - 404 Not Found with `results: []` when nothing matched
/// - 500 Internal Server Error on index failure
#[instrument(skip_all, name = "ps.handlers.search")]
pub async fn search(
    State(state): State<Arc<AppState>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<SearchResponse>, PsError> {
    // Every field is an optional string, so rejection means an undecodable query string
    let Query(params) = params.map_err(|rejection| {
        tracing::debug!(target: "ps.handlers", error = %rejection, "Unreadable search query");
        PsError::BadRequest(rejection.body_text())
    })?;

    let response = search_service::search_properties(
        state.properties.as_ref(),
        &params,
        state.config.search_max_results,
    )
    .await?;

    Ok(Json(response))
}
