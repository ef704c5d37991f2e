//! Elasticsearch adapter tests against a mock HTTP server.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use property_service::errors::PsError;
use property_service::models::{SearchParams, SortOrder};
use property_service::repositories::{ElasticsearchPropertyIndex, PropertyIndex};
use property_service::services::search_service::{build_index_search, validate_params};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn index_for(server: &MockServer) -> ElasticsearchPropertyIndex {
    ElasticsearchPropertyIndex::new(
        server.uri(),
        "property".to_string(),
        Duration::from_secs(2),
    )
    .unwrap()
}

fn downtown_search(sort_order: &str) -> property_service::repositories::IndexSearch {
    let params = SearchParams {
        title: Some("Loft".to_string()),
        price: Some("2000".to_string()),
        location: Some("Downtown".to_string()),
        sort_order: Some(sort_order.to_string()),
        ..SearchParams::default()
    };
    build_index_search(&validate_params(&params).unwrap(), 10_000)
}

#[tokio::test]
async fn test_search_posts_bool_query_and_parses_hits() {
    let server = MockServer::start().await;

    let expected_body = json!({
        "query": { "bool": { "must": [
            { "wildcard": { "title": { "value": "*loft*" } } },
            { "range": { "price": { "lte": 2000.0 } } },
            { "wildcard": { "location": { "value": "*downtown*" } } }
        ] } },
        "size": 10000,
        "sort": [ { "price": { "order": "desc" } } ]
    });

    Mock::given(method("POST"))
        .and(path("/property/_search"))
        .and(body_json(&expected_body))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "took": 3,
            "hits": {
                "total": { "value": 2, "relation": "eq" },
                "hits": [
                    { "_id": "1", "_source": {
                        "title": "Sunny Loft", "amenities": "gym",
                        "price": 1500, "location": "Downtown"
                    } },
                    { "_id": "2", "_source": {
                        "title": "Small Loft", "amenities": "wifi",
                        "price": 800.5, "location": "Downtown"
                    } }
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = downtown_search("desc");
    assert_eq!(request.sort_order, SortOrder::Desc);

    let results = index_for(&server).search(&request).await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].title, "Sunny Loft");
    assert!((results[0].price - 1500.0).abs() < f64::EPSILON);
    assert!((results[1].price - 800.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_search_with_no_hits_returns_empty() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/property/_search"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "hits": { "hits": [] } })),
        )
        .mount(&server)
        .await;

    let results = index_for(&server)
        .search(&downtown_search("asc"))
        .await
        .unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_search_error_status_is_search_index_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/property/_search"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let result = index_for(&server).search(&downtown_search("asc")).await;
    assert!(matches!(result, Err(PsError::SearchIndex(_))));
}

#[tokio::test]
async fn test_malformed_response_is_search_index_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/property/_search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "unexpected": true })))
        .mount(&server)
        .await;

    let result = index_for(&server).search(&downtown_search("asc")).await;
    assert!(matches!(result, Err(PsError::SearchIndex(_))));
}

#[tokio::test]
async fn test_slow_index_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/property/_search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "hits": { "hits": [] } }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let index = ElasticsearchPropertyIndex::new(
        server.uri(),
        "property".to_string(),
        Duration::from_millis(200),
    )
    .unwrap();

    let result = index.search(&downtown_search("asc")).await;
    assert!(matches!(result, Err(PsError::SearchIndex(_))));
}

#[tokio::test]
async fn test_ping_checks_index_exists() {
    let server = MockServer::start().await;

    Mock::given(method("HEAD"))
        .and(path("/property"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    assert!(index_for(&server).ping().await.is_ok());

    let missing = ElasticsearchPropertyIndex::new(
        server.uri(),
        "missing".to_string(),
        Duration::from_secs(2),
    )
    .unwrap();
    assert!(matches!(
        missing.ping().await,
        Err(PsError::SearchIndex(_))
    ));
}
