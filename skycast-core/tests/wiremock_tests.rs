//! Integration tests for the weather client using wiremock
//!
//! Each lookup mode is checked for the exact query it sends and for how
//! upstream failures reach the caller.

use std::collections::BTreeMap;

use reqwest::StatusCode;
use serde_json::json;
use skycast_core::{ClientConfig, Query, RequestError, WeatherClient, WeatherLookup};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

const KEY: &str = "test-key";

fn london_payload() -> serde_json::Value {
    json!({
        "coord": { "lon": -0.1278, "lat": 51.5074 },
        "weather": [{ "id": 800, "main": "Clear", "description": "clear sky", "icon": "01d" }],
        "main": { "temp": 14.3, "feels_like": 13.6, "pressure": 1021, "humidity": 72 },
        "wind": { "speed": 3.6, "deg": 240 },
        "sys": { "country": "GB", "sunrise": 1697610432, "sunset": 1697648187 },
        "timezone": 3600,
        "id": 2643743,
        "name": "London",
        "cod": 200
    })
}

fn create_test_client(mock_server: &MockServer) -> WeatherClient {
    WeatherClient::new(ClientConfig::new(KEY, mock_server.uri()))
}

/// Query string of the single request the server saw.
async fn only_request_params(mock_server: &MockServer) -> BTreeMap<String, String> {
    let requests = mock_server
        .received_requests()
        .await
        .expect("request recording is enabled");
    assert_eq!(requests.len(), 1, "expected exactly one outbound request");

    requests[0].url.query_pairs().into_owned().collect()
}

fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// ============================================================================
// Request shape
// ============================================================================

#[tokio::test]
async fn fetch_by_city_sends_q_appid_units() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "London"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_payload()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let body = client.fetch_by_city("London", None).await.expect("lookup should succeed");

    assert_eq!(body, london_payload());
    assert_eq!(
        only_request_params(&mock_server).await,
        params(&[("q", "London"), ("appid", KEY), ("units", "metric")])
    );
}

#[tokio::test]
async fn fetch_by_postal_code_joins_zip_with_comma() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("zip", "10001,US"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "New York" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    client
        .fetch_by_postal_code("10001", "US", None)
        .await
        .expect("lookup should succeed");

    assert_eq!(
        only_request_params(&mock_server).await,
        params(&[("zip", "10001,US"), ("appid", KEY), ("units", "metric")])
    );
}

#[tokio::test]
async fn fetch_by_coordinates_forwards_lat_lon_verbatim() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("lat", "51.5074"))
        .and(query_param("lon", "-0.1278"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_payload()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    client
        .fetch_by_coordinates("51.5074", "-0.1278", None)
        .await
        .expect("lookup should succeed");

    assert_eq!(
        only_request_params(&mock_server).await,
        params(&[
            ("lat", "51.5074"),
            ("lon", "-0.1278"),
            ("appid", KEY),
            ("units", "metric")
        ])
    );
}

#[tokio::test]
async fn explicit_units_are_forwarded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("units", "imperial"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_payload()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let result = client.fetch_by_city("London", Some("imperial")).await;

    assert!(result.is_ok(), "Expected success, got: {result:?}");
}

#[tokio::test]
async fn malformed_input_is_sent_unchanged() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    client
        .fetch_by_postal_code(" 1000 1", "u s", Some("kelvin?"))
        .await
        .expect("server accepts anything");

    let sent = only_request_params(&mock_server).await;
    assert_eq!(sent["zip"], " 1000 1,u s");
    assert_eq!(sent["units"], "kelvin?");
}

#[tokio::test]
async fn lookup_trait_dispatches_to_client() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Paris"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "Paris" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let lookup: Box<dyn WeatherLookup> = Box::new(create_test_client(&mock_server));
    let body = lookup.fetch(&Query::by_city("Paris")).await.unwrap();

    assert_eq!(body["name"], "Paris");
}

// ============================================================================
// Failure propagation
// ============================================================================

#[tokio::test]
async fn city_not_found_carries_upstream_body() {
    let mock_server = MockServer::start().await;
    let not_found = json!({ "cod": "404", "message": "city not found" });

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(404).set_body_json(not_found.clone()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let err = client.fetch_by_city("Atlantis", None).await.unwrap_err();

    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    assert_eq!(err.body_json(), Some(not_found));
    assert_eq!(err.upstream_message().as_deref(), Some("city not found"));
}

#[tokio::test]
async fn every_mode_surfaces_upstream_rejection() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_string(r#"{"cod":401,"message":"Invalid API key."}"#),
        )
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let results = [
        client.fetch_by_city("London", None).await,
        client.fetch_by_postal_code("10001", "US", None).await,
        client.fetch_by_coordinates("1", "2", None).await,
    ];

    for result in results {
        match result {
            Err(RequestError::Upstream { status, body }) => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert_eq!(body, r#"{"cod":401,"message":"Invalid API key."}"#);
            }
            other => panic!("Expected Upstream error, got: {other:?}"),
        }
    }
}

#[tokio::test]
async fn server_error_is_upstream_not_transport() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let result = client.fetch_by_coordinates("0", "0", None).await;

    assert!(
        matches!(&result, Err(RequestError::Upstream { status, body })
            if *status == StatusCode::SERVICE_UNAVAILABLE && body == "Service Unavailable"),
        "Expected Upstream 503, got: {result:?}"
    );
}

#[tokio::test]
async fn unreachable_host_is_transport_error() {
    // Nothing listens on port 1.
    let client = WeatherClient::new(ClientConfig::new(KEY, "http://127.0.0.1:1"));
    let result = client.fetch_by_city("London", None).await;

    match result {
        Err(RequestError::Transport(err)) => assert!(err.is_connect() || err.is_request()),
        other => panic!("Expected Transport error, got: {other:?}"),
    }
}

#[tokio::test]
async fn non_json_success_body_is_decode_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let result = client.fetch_by_city("London", None).await;

    assert!(
        matches!(result, Err(RequestError::Decode(_))),
        "Expected Decode error, got: {result:?}"
    );
}

#[tokio::test]
async fn client_with_custom_http_still_hits_base_url() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(london_payload()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .expect("client builds");
    let client = WeatherClient::with_http(
        ClientConfig::new(KEY, format!("{}/", mock_server.uri())),
        http,
    );

    let body = client.fetch(&Query::by_city("London")).await.unwrap();
    assert_eq!(body["id"], 2643743);
}
