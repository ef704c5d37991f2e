//! Property search service.
//!
//! Validates and normalizes query parameters, builds the boolean query and
//! maps index hits to the response shape. Validation errors are returned
//! before the index is called.

use crate::errors::PsError;
use crate::models::{SearchParams, SearchQuery, SearchResponse, SortOrder};
use crate::observability::metrics::record_search;
use crate::repositories::{BoolQuery, IndexSearch, Predicate, PropertyField, PropertyIndex};
use std::time::Instant;
use tracing::instrument;

const MIN_FRAGMENT_LENGTH: usize = 3;

pub const FRAGMENT_TOO_SHORT: &str =
    "Please provide at least three letters for the specified fields";
pub const LOCATION_REQUIRED: &str = "Location cannot be Empty";
pub const PRICE_NOT_NUMERIC: &str = "Price must be a valid numeric value";
pub const PRICE_NEGATIVE: &str = "Price must be a non-negative numeric value";
pub const INVALID_SORT_ORDER: &str = "sort_order must be either 'asc' or 'desc'";
pub const NO_RESULTS: &str = "No search results found";

/// Validate and normalize raw query parameters.
///
/// Blank fragments count as absent. Checks run in this order: fragment
/// length, location presence, price, sort order.
pub fn validate_params(params: &SearchParams) -> Result<SearchQuery, PsError> {
    let title = normalize_fragment(params.title.as_deref());
    let amenities = normalize_fragment(params.amenities.as_deref());
    let location = normalize_fragment(params.location.as_deref());

    let too_short = [&title, &amenities, &location]
        .into_iter()
        .flatten()
        .any(|fragment| fragment.chars().count() < MIN_FRAGMENT_LENGTH);
    if too_short {
        return Err(PsError::BadRequest(FRAGMENT_TOO_SHORT.to_string()));
    }

    let Some(location) = location else {
        return Err(PsError::BadRequest(LOCATION_REQUIRED.to_string()));
    };

    // A present but blank price is rejected rather than ignored
    let max_price = match params.price.as_deref() {
        None => None,
        Some(raw) => Some(parse_price(raw.trim())?),
    };

    let sort_order = match params.sort_order.as_deref().map(str::trim) {
        None | Some("") => SortOrder::default(),
        Some(raw) => SortOrder::parse(raw)
            .ok_or_else(|| PsError::BadRequest(INVALID_SORT_ORDER.to_string()))?,
    };

    Ok(SearchQuery {
        title,
        amenities,
        max_price,
        location,
        sort_order,
    })
}

/// Build the index request for a validated query.
///
/// Clause order: title, amenities, price, location.
pub fn build_index_search(query: &SearchQuery, size: u32) -> IndexSearch {
    let mut must = Vec::with_capacity(4);

    if let Some(title) = &query.title {
        must.push(Predicate::Contains {
            field: PropertyField::Title,
            fragment: title.clone(),
        });
    }
    if let Some(amenities) = &query.amenities {
        must.push(Predicate::Contains {
            field: PropertyField::Amenities,
            fragment: amenities.clone(),
        });
    }
    if let Some(max) = query.max_price {
        must.push(Predicate::AtMost {
            field: PropertyField::Price,
            max,
        });
    }
    must.push(Predicate::Contains {
        field: PropertyField::Location,
        fragment: query.location.clone(),
    });

    IndexSearch {
        query: BoolQuery { must },
        size,
        sort_order: query.sort_order,
    }
}

/// Search properties.
///
/// Zero hits is [`PsError::NotFound`]; index failures surface as
/// [`PsError::SearchIndex`].
#[instrument(skip_all)]
pub async fn search_properties(
    index: &dyn PropertyIndex,
    params: &SearchParams,
    max_results: u32,
) -> Result<SearchResponse, PsError> {
    let query = validate_params(params).inspect_err(|_| record_search("invalid", None))?;

    let request = build_index_search(&query, max_results);
    let start = Instant::now();
    let result = index.search(&request).await;
    let elapsed = start.elapsed();

    let results = match result {
        Ok(results) => results,
        Err(e) => {
            record_search("error", Some(elapsed));
            return Err(e);
        }
    };

    if results.is_empty() {
        tracing::debug!(target: "ps.search", sort_order = %query.sort_order, "No search results");
        record_search("empty", Some(elapsed));
        return Err(PsError::NotFound(NO_RESULTS.to_string()));
    }

    tracing::debug!(
        target: "ps.search",
        hits = results.len(),
        sort_order = %query.sort_order,
        "Search results found"
    );
    record_search("success", Some(elapsed));

    Ok(SearchResponse {
        message: format!("Search results found: Order - {}", query.sort_order),
        results,
    })
}

fn normalize_fragment(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

fn parse_price(raw: &str) -> Result<f64, PsError> {
    let price: f64 = raw
        .parse()
        .map_err(|_| PsError::BadRequest(PRICE_NOT_NUMERIC.to_string()))?;

    if !price.is_finite() {
        return Err(PsError::BadRequest(PRICE_NOT_NUMERIC.to_string()));
    }
    if price < 0.0 {
        return Err(PsError::BadRequest(PRICE_NEGATIVE.to_string()));
    }

    Ok(price)
}
