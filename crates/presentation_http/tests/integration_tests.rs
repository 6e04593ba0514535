//! Integration tests for HTTP handlers
#![allow(clippy::expect_used)]

use axum_test::TestServer;
use infrastructure::AppConfig;
use integration_geocoding::GeocodingConfig;
use presentation_http::{ReloadableConfig, routes::create_router, state::AppState};
use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ADMIN_TOKEN: &str = "admin-s3cret";

fn test_config(upstream: &MockServer) -> AppConfig {
    let mut config = AppConfig::default();
    config.geocoding = GeocodingConfig::for_testing(&upstream.uri());
    config.security.nonce_secret = Some(SecretString::from("nonce-secret".to_string()));
    config.security.admin_token = Some(SecretString::from(ADMIN_TOKEN.to_string()));
    config
}

fn create_test_server(config: AppConfig) -> TestServer {
    let state = AppState::from_config(ReloadableConfig::new(config));
    TestServer::new(create_router(state)).expect("Failed to create test server")
}

/// Fetch a session id and nonce from the bootstrap endpoint
async fn session(server: &TestServer) -> (String, String) {
    let body: Value = server.get("/ajax/session").await.json();
    (
        body["data"]["session"].as_str().expect("session").to_string(),
        body["data"]["nonce"].as_str().expect("nonce").to_string(),
    )
}

fn downing_street() -> Value {
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

// ============ Health Endpoint Tests ============

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let upstream = MockServer::start().await;
    let server = create_test_server(test_config(&upstream));

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
    assert_eq!(body["provider"], "openstreetmap");
}

// ============ Session Endpoint Tests ============

#[tokio::test]
async fn session_bootstraps_widget() {
    let upstream = MockServer::start().await;
    let server = create_test_server(test_config(&upstream));

    let response = server.get("/ajax/session").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["provider"], "openstreetmap");
    assert_eq!(
        body["data"]["map_script_url"],
        "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"
    );
    assert_eq!(body["data"]["search_delay_ms"], 500);
    assert_eq!(body["data"]["min_query_length"], 3);
    assert_eq!(body["data"]["strings"]["no_results"], "No results found");
    assert!(!body["data"]["session"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn session_can_be_refreshed() {
    let upstream = MockServer::start().await;
    let server = create_test_server(test_config(&upstream));

    let body: Value = server
        .get("/ajax/session")
        .add_query_param("session", "abc-123")
        .await
        .json();
    assert_eq!(body["data"]["session"], "abc-123");
}

#[tokio::test]
async fn google_session_without_key_has_no_map() {
    let upstream = MockServer::start().await;
    let mut config = test_config(&upstream);
    config.geocoding.provider = "google-maps".to_string();
    let server = create_test_server(config);

    let body: Value = server.get("/ajax/session").await.json();
    assert_eq!(body["data"]["provider"], "google-maps");
    assert_eq!(body["data"]["map_script_url"], "");
}

// ============ Search Endpoint Tests ============

#[tokio::test]
async fn search_returns_results() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "10 Downing Street"))
        .respond_with(ResponseTemplate::new(200).set_body_json(downing_street()))
        .expect(1)
        .mount(&upstream)
        .await;

    let server = create_test_server(test_config(&upstream));
    let (session, nonce) = session(&server).await;

    let response = server
        .post("/ajax/search")
        .form(&[
            ("query", "10 Downing Street"),
            ("nonce", nonce.as_str()),
            ("session", session.as_str()),
        ])
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    let first = &body["data"]["results"][0];
    assert_eq!(first["place_id"], "W4244999");
    assert_eq!(first["address"]["country"], "United Kingdom");
    let lat = first["location"]["lat"].as_f64().unwrap();
    let lng = first["location"]["lng"].as_f64().unwrap();
    assert!((-90.0..=90.0).contains(&lat));
    assert!((-180.0..=180.0).contains(&lng));
}

#[tokio::test]
async fn search_without_query_fails_in_envelope() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;

    let server = create_test_server(test_config(&upstream));
    let (session, nonce) = session(&server).await;

    let response = server
        .post("/ajax/search")
        .form(&[("nonce", nonce.as_str()), ("session", session.as_str())])
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["message"], "Search query is required");
}

#[tokio::test]
async fn search_rejects_bad_nonce() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;

    let server = create_test_server(test_config(&upstream));
    let (session, nonce) = session(&server).await;

    // Nonce issued for another session
    let response = server
        .post("/ajax/search")
        .form(&[
            ("query", "Berlin"),
            ("nonce", nonce.as_str()),
            ("session", "someone-else"),
        ])
        .await;
    response.assert_status_forbidden();
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["message"], "Security check failed");

    // No nonce at all
    let response = server
        .post("/ajax/search")
        .form(&[("query", "Berlin"), ("session", session.as_str())])
        .await;
    response.assert_status_forbidden();
}

#[tokio::test]
async fn unreadable_body_fails_in_envelope() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;

    let server = create_test_server(test_config(&upstream));

    // No body and no content type
    let response = server.post("/ajax/search").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["message"], "Invalid request");
    assert_eq!(body["data"]["code"], "invalid_input");

    // JSON instead of a form
    let response = server
        .post("/ajax/place-details")
        .json(&json!({"place_id": "W1"}))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["code"], "invalid_input");
}

#[tokio::test]
async fn search_surfaces_upstream_error() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&upstream)
        .await;

    let server = create_test_server(test_config(&upstream));
    let (session, nonce) = session(&server).await;

    let response = server
        .post("/ajax/search")
        .form(&[
            ("query", "Berlin"),
            ("nonce", nonce.as_str()),
            ("session", session.as_str()),
        ])
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["code"], "api_error");
}

#[tokio::test]
async fn google_search_without_key_is_reported() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;

    let mut config = test_config(&upstream);
    config.geocoding.provider = "google-maps".to_string();
    let server = create_test_server(config);
    let (session, nonce) = session(&server).await;

    let body: Value = server
        .post("/ajax/search")
        .form(&[
            ("query", "Berlin"),
            ("nonce", nonce.as_str()),
            ("session", session.as_str()),
        ])
        .await
        .json();

    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["message"], "Google Maps API key is not configured");
    assert_eq!(body["data"]["code"], "missing_api_key");
}

// ============ Place Details Endpoint Tests ============

#[tokio::test]
async fn place_details_returns_details() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lookup"))
        .and(query_param("osm_ids", "W4244999"))
        .respond_with(ResponseTemplate::new(200).set_body_json(downing_street()))
        .expect(1)
        .mount(&upstream)
        .await;

    let server = create_test_server(test_config(&upstream));
    let (session, nonce) = session(&server).await;

    let body: Value = server
        .post("/ajax/place-details")
        .form(&[
            ("place_id", "W4244999"),
            ("nonce", nonce.as_str()),
            ("session", session.as_str()),
        ])
        .await
        .json();

    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["details"]["address"]["street"], "10 Downing Street");
    assert_eq!(body["data"]["details"]["address"]["city"], "London");
}

#[tokio::test]
async fn place_details_rejects_unknown_prefix() {
    let upstream = MockServer::start().await;
    let server = create_test_server(test_config(&upstream));
    let (session, nonce) = session(&server).await;

    let body: Value = server
        .post("/ajax/place-details")
        .form(&[
            ("place_id", "X123"),
            ("nonce", nonce.as_str()),
            ("session", session.as_str()),
        ])
        .await
        .json();

    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["code"], "invalid_place_id");
}

#[tokio::test]
async fn place_details_requires_id() {
    let upstream = MockServer::start().await;
    let server = create_test_server(test_config(&upstream));
    let (session, nonce) = session(&server).await;

    let body: Value = server
        .post("/ajax/place-details")
        .form(&[("nonce", nonce.as_str()), ("session", session.as_str())])
        .await
        .json();

    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["message"], "Place ID is required");
}

// ============ Admin Endpoint Tests ============

#[tokio::test]
async fn admin_requires_token() {
    let upstream = MockServer::start().await;
    let server = create_test_server(test_config(&upstream));

    server
        .post("/admin/clear-cache")
        .await
        .assert_status_unauthorized();
    server
        .post("/admin/clear-cache")
        .authorization_bearer("wrong")
        .await
        .assert_status_forbidden();
}

#[tokio::test]
async fn admin_disabled_without_token() {
    let upstream = MockServer::start().await;
    let mut config = test_config(&upstream);
    config.security.admin_token = None;
    let server = create_test_server(config);

    server
        .post("/admin/clear-cache")
        .authorization_bearer(ADMIN_TOKEN)
        .await
        .assert_status_forbidden();
}

#[tokio::test]
async fn admin_test_connection() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&upstream)
        .await;

    let server = create_test_server(test_config(&upstream));

    let response = server
        .post("/admin/test-connection")
        .authorization_bearer(ADMIN_TOKEN)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["message"], "Connection successful!");
}

#[tokio::test]
async fn admin_clear_cache_counts_entries() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(downing_street()))
        .expect(3)
        .mount(&upstream)
        .await;

    let server = create_test_server(test_config(&upstream));
    let (session, nonce) = session(&server).await;

    for query in ["Downing", "Whitehall", "Downing"] {
        server
            .post("/ajax/search")
            .form(&[
                ("query", query),
                ("nonce", nonce.as_str()),
                ("session", session.as_str()),
            ])
            .await
            .assert_status_ok();
    }

    let body: Value = server
        .post("/admin/clear-cache")
        .authorization_bearer(ADMIN_TOKEN)
        .await
        .json();
    assert_eq!(body["data"]["message"], "Cleared 2 cache entries");

    // Cleared entries are fetched again
    server
        .post("/ajax/search")
        .form(&[
            ("query", "Downing"),
            ("nonce", nonce.as_str()),
            ("session", session.as_str()),
        ])
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn admin_status_reports_cache() {
    let upstream = MockServer::start().await;
    let server = create_test_server(test_config(&upstream));

    let body: Value = server
        .get("/admin/status")
        .authorization_bearer(ADMIN_TOKEN)
        .await
        .json();

    assert_eq!(body["data"]["active_provider"], "openstreetmap");
    assert_eq!(body["data"]["provider"]["name"], "OpenStreetMap");
    assert_eq!(
        body["data"]["available_providers"],
        json!(["google-maps", "openstreetmap"])
    );
    assert_eq!(body["data"]["cache"]["enabled"], true);
}
