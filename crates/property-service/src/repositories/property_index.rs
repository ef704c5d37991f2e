//! Search index adapter for property documents.
//!
//! Queries are built as a structured boolean `must` list and rendered to the
//! Elasticsearch query DSL only at the HTTP boundary.

use crate::errors::PsError;
use crate::models::{Property, SortOrder};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{error, instrument, warn};

/// Connect timeout for search index requests in seconds.
const SEARCH_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Indexed property fields that queries may target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyField {
    Title,
    Amenities,
    Location,
    Price,
}

impl PropertyField {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyField::Title => "title",
            PropertyField::Amenities => "amenities",
            PropertyField::Location => "location",
            PropertyField::Price => "price",
        }
    }
}

/// A single clause in a boolean `must` list.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Field contains `fragment` anywhere (rendered as `*fragment*`).
    Contains {
        field: PropertyField,
        fragment: String,
    },
    /// Numeric field is less than or equal to `max`.
    AtMost { field: PropertyField, max: f64 },
}

impl Predicate {
    fn to_json(&self) -> Value {
        match self {
            Predicate::Contains { field, fragment } => json!({
                "wildcard": {
                    field.as_str(): { "value": format!("*{}*", escape_wildcard(fragment)) }
                }
            }),
            Predicate::AtMost { field, max } => json!({
                "range": { field.as_str(): { "lte": max } }
            }),
        }
    }

    fn matches(&self, property: &Property) -> bool {
        match self {
            Predicate::Contains { field, fragment } => {
                let value = match field {
                    PropertyField::Title => &property.title,
                    PropertyField::Amenities => &property.amenities,
                    PropertyField::Location => &property.location,
                    PropertyField::Price => return false,
                };
                value.to_lowercase().contains(fragment.as_str())
            }
            Predicate::AtMost { field, max } => match field {
                PropertyField::Price => property.price <= *max,
                _ => false,
            },
        }
    }
}

/// Escape wildcard metacharacters so user input only matches literally.
pub fn escape_wildcard(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for c in fragment.chars() {
        if matches!(c, '*' | '?' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Boolean query with a conjunctive `must` list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
    pub must: Vec<Predicate>,
}

/// A complete request against the property index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSearch {
    pub query: BoolQuery,
    /// Maximum number of hits to return.
    pub size: u32,
    /// Sort direction on price.
    pub sort_order: SortOrder,
}

impl IndexSearch {
    /// Render the request body for `POST /{index}/_search`.
    pub fn to_request_body(&self) -> Value {
        let must: Vec<Value> = self.query.must.iter().map(Predicate::to_json).collect();
        json!({
            "query": { "bool": { "must": must } },
            "size": self.size,
            "sort": [ { "price": { "order": self.sort_order.as_str() } } ]
        })
    }
}

/// Search index operations (enables mocking).
#[async_trait::async_trait]
pub trait PropertyIndex: Send + Sync {
    /// Run a search and return the matching documents in index order.
    async fn search(&self, request: &IndexSearch) -> Result<Vec<Property>, PsError>;

    /// Reachability check for readiness probes.
    async fn ping(&self) -> Result<(), PsError>;
}

#[derive(Debug, Deserialize)]
struct SearchResponseBody {
    hits: HitsEnvelope,
}

#[derive(Debug, Deserialize)]
struct HitsEnvelope {
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    #[serde(rename = "_source")]
    source: Property,
}

/// Elasticsearch-compatible property index over HTTP.
#[derive(Clone)]
pub struct ElasticsearchPropertyIndex {
    /// HTTP client with configured timeouts.
    client: Client,

    /// Base URL of the cluster (no trailing slash).
    base_url: String,

    /// Index name.
    index: String,
}

impl ElasticsearchPropertyIndex {
    /// Create a new index client.
    ///
    /// # Errors
    ///
    /// Returns `PsError::Internal` if the HTTP client cannot be built.
    pub fn new(base_url: String, index: String, timeout: Duration) -> Result<Self, PsError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(SEARCH_CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                error!(target: "ps.repositories.property_index", error = %e, "Failed to build HTTP client");
                PsError::Internal
            })?;

        Ok(Self {
            client,
            base_url,
            index,
        })
    }
}

#[async_trait::async_trait]
impl PropertyIndex for ElasticsearchPropertyIndex {
    #[instrument(skip_all, fields(index = %self.index, size = request.size, sort_order = %request.sort_order))]
    async fn search(&self, request: &IndexSearch) -> Result<Vec<Property>, PsError> {
        let url = format!("{}/{}/_search", self.base_url, self.index);

        let response = self
            .client
            .post(&url)
            .json(&request.to_request_body())
            .send()
            .await
            .map_err(|e| {
                warn!(target: "ps.repositories.property_index", error = %e, "Search request failed");
                PsError::SearchIndex(format!("request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                target: "ps.repositories.property_index",
                status = %status,
                body = %body,
                "Search index returned an error status"
            );
            return Err(PsError::SearchIndex(format!(
                "search index returned status {status}"
            )));
        }

        let body: SearchResponseBody = response.json().await.map_err(|e| {
            warn!(target: "ps.repositories.property_index", error = %e, "Malformed search response");
            PsError::SearchIndex(format!("malformed search response: {e}"))
        })?;

        Ok(body.hits.hits.into_iter().map(|hit| hit.source).collect())
    }

    #[instrument(skip_all, fields(index = %self.index))]
    async fn ping(&self) -> Result<(), PsError> {
        let url = format!("{}/{}", self.base_url, self.index);
        let response = self.client.head(&url).send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(PsError::SearchIndex(format!(
                "index check returned status {}",
                response.status()
            )))
        }
    }
}

/// In-memory property index for tests and local runs.
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    /// In-memory [`PropertyIndex`] that evaluates queries itself.
    ///
    /// `Contains` predicates match case-insensitively, like the analyzed
    /// text fields of the real index.
    #[derive(Default)]
    pub struct InMemoryPropertyIndex {
        documents: Vec<Property>,
        failing: AtomicBool,
        call_count: AtomicUsize,
        last_request: Mutex<Option<IndexSearch>>,
    }

    impl InMemoryPropertyIndex {
        pub fn new(documents: Vec<Property>) -> Self {
            Self {
                documents,
                ..Self::default()
            }
        }

        /// Index whose every call fails.
        pub fn failing() -> Self {
            Self {
                failing: AtomicBool::new(true),
                ..Self::default()
            }
        }

        /// Get the number of searches made.
        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }

        /// The most recent search request.
        pub async fn last_request(&self) -> Option<IndexSearch> {
            self.last_request.lock().await.clone()
        }
    }

    #[async_trait::async_trait]
    impl PropertyIndex for InMemoryPropertyIndex {
        async fn search(&self, request: &IndexSearch) -> Result<Vec<Property>, PsError> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            *self.last_request.lock().await = Some(request.clone());

            if self.failing.load(Ordering::SeqCst) {
                return Err(PsError::SearchIndex("mock index unavailable".to_string()));
            }

            let mut hits: Vec<Property> = self
                .documents
                .iter()
                .filter(|doc| request.query.must.iter().all(|p| p.matches(doc)))
                .cloned()
                .collect();

            hits.sort_by(|a, b| match request.sort_order {
                SortOrder::Asc => a.price.total_cmp(&b.price),
                SortOrder::Desc => b.price.total_cmp(&a.price),
            });
            hits.truncate(usize::try_from(request.size).unwrap_or(usize::MAX));

            Ok(hits)
        }

        async fn ping(&self) -> Result<(), PsError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(PsError::SearchIndex("mock index unavailable".to_string()));
            }
            Ok(())
        }
    }
}
