//! Integration tests for the infrastructure crate
//!
//! Runs the autocomplete service through the geocoding adapter against a
//! mocked upstream.

use std::sync::Arc;

use application::{ApplicationError, AutocompleteService};
use infrastructure::GeocodingAdapter;
use integration_geocoding::{GeocodingCache, GeocodingConfig, ProviderRegistry};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service(server: &MockServer) -> (AutocompleteService, GeocodingAdapter) {
    let registry = ProviderRegistry::new(
        GeocodingConfig::for_testing(&server.uri()),
        GeocodingCache::default(),
    );
    let adapter = GeocodingAdapter::new(Arc::new(registry));
    (AutocompleteService::new(Arc::new(adapter.clone())), adapter)
}

fn downing_street() -> serde_json::Value {
    json!([{
        "osm_type": "way",
        "osm_id": 4_244_999,
        "lat": "51.5033635",
        "lon": "-0.1276248",
        "display_name": "10 Downing Street, London, SW1A 2AA, United Kingdom",
        "address": {
            "house_number": "10",
            "road": "Downing Street",
            "city": "London",
            "postcode": "SW1A 2AA",
            "country": "United Kingdom",
            "country_code": "gb"
        }
    }])
}

// ============================================================================
// Search and details
// ============================================================================

#[tokio::test]
async fn sanitized_search_reaches_openstreetmap() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "10 Downing Street"))
        .respond_with(ResponseTemplate::new(200).set_body_json(downing_street()))
        .expect(1)
        .mount(&server)
        .await;

    let (service, _) = service(&server);
    let results = service.search(" <b>10 Downing</b>  Street ").await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].place_id, "W4244999");

    // Second identical search is served from the cache
    let again = service.search("10 Downing Street").await.unwrap();
    assert_eq!(again, results);
}

#[tokio::test]
async fn details_follow_search_place_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lookup"))
        .and(query_param("osm_ids", "W4244999"))
        .respond_with(ResponseTemplate::new(200).set_body_json(downing_street()))
        .mount(&server)
        .await;

    let (service, _) = service(&server);
    let details = service.place_details("W4244999").await.unwrap();
    assert_eq!(details.address.street, "10 Downing Street");
    assert_eq!(details.address.city, "London");
    assert!((details.location.lat() - 51.503_363_5).abs() < 1e-9);
}

// ============================================================================
// Provider switching
// ============================================================================

#[tokio::test]
async fn google_without_key_fails_before_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (service, adapter) = service(&server);
    assert!(adapter.registry().set_active_provider("google-maps"));

    let err = service.search("Berlin").await.unwrap_err();
    assert_eq!(err.to_string(), "Google Maps API key is not configured");

    let err = service.test_connection().await.unwrap_err();
    assert_eq!(err.to_string(), "Google Maps API key is not configured");
}

#[tokio::test]
async fn unknown_provider_is_reported() {
    let server = MockServer::start().await;
    let registry = ProviderRegistry::new(
        GeocodingConfig {
            provider: "here".to_string(),
            ..GeocodingConfig::for_testing(&server.uri())
        },
        GeocodingCache::default(),
    );
    let service = AutocompleteService::new(Arc::new(GeocodingAdapter::new(Arc::new(registry))));

    let err = service.search("Berlin").await.unwrap_err();
    assert_eq!(
        err,
        ApplicationError::ProviderUnavailable("Provider not available".to_string())
    );
}

// ============================================================================
// Admin actions
// ============================================================================

#[tokio::test]
async fn test_connection_against_openstreetmap() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let (service, _) = service(&server);
    assert_eq!(
        service.test_connection().await.unwrap(),
        "Connection successful!"
    );
}

#[tokio::test]
async fn clear_cache_forces_refetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(downing_street()))
        .expect(2)
        .mount(&server)
        .await;

    let (service, _) = service(&server);
    service.search("Downing").await.unwrap();
    service.search("Downing").await.unwrap();

    assert_eq!(service.clear_cache().await, "Cleared 1 cache entry");
    service.search("Downing").await.unwrap();
}
