mod common;

use common::provider_body;
use currency_rates::domain::provider::{ProviderError, RatesProvider};
use currency_rates::infrastructure::provider::CurrencyApiClient;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-key";

fn client(server: &MockServer, timeout: Duration) -> CurrencyApiClient {
    CurrencyApiClient::new(
        timeout,
        Some(format!("{}/v3/latest", server.uri())),
        Some(API_KEY.to_string()),
    )
    .unwrap()
}

#[tokio::test]
async fn test_fetch_sends_api_key_and_decodes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/latest"))
        .and(header("apikey", API_KEY))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(provider_body(&[("USD", 1.0), ("MXN", 17.05)])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let snapshot = client(&server, Duration::from_secs(5))
        .fetch_latest()
        .await
        .unwrap();

    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.rates["MXN"], 17.05);
    assert_eq!(
        snapshot.provider_updated_at.to_rfc3339(),
        "2024-02-19T23:59:59+00:00"
    );
}

#[tokio::test]
async fn test_fetch_upper_cases_codes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(provider_body(&[("usd", 1.0), ("Mxn", 17.05)])),
        )
        .mount(&server)
        .await;

    let snapshot = client(&server, Duration::from_secs(5))
        .fetch_latest()
        .await
        .unwrap();

    let codes: Vec<&str> = snapshot.rates.keys().map(String::as_str).collect();
    assert_eq!(codes, vec!["MXN", "USD"]);
}

#[tokio::test]
async fn test_non_success_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = client(&server, Duration::from_secs(5))
        .fetch_latest()
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::Status(429)));
}

#[tokio::test]
async fn test_unexpected_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"rates\": []}"))
        .mount(&server)
        .await;

    let err = client(&server, Duration::from_secs(5))
        .fetch_latest()
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::Decode(_)));
}

#[tokio::test]
async fn test_slow_provider_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(provider_body(&[("USD", 1.0)]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let err = client(&server, Duration::from_millis(200))
        .fetch_latest()
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::Timeout(_)));
}
