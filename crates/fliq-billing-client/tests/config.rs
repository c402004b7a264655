//! Runtime configuration integration tests.

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fliq_billing_client::{ClientError, ConfigProvider};
use fliq_billing_core::{ErrorCategory, Severity};

fn config_body(publishable_key: &str) -> serde_json::Value {
    json!({
        "success": true,
        "config": {
            "stripe": { "publishableKey": publishable_key },
            "api": { "baseUrl": "https://api.fliq.test" },
            "features": { "essayAnalysis": true },
        },
        "environment": "test",
    })
}

async fn provider(server: &MockServer) -> ConfigProvider {
    ConfigProvider::new(reqwest::Client::new(), server.uri())
}

#[tokio::test]
async fn load_fetches_and_caches_config() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/config/client"))
        .respond_with(ResponseTemplate::new(200).set_body_json(config_body("pk_test_123")))
        .mount(&server)
        .await;

    let provider = provider(&server).await;
    assert!(provider.cached().is_none());

    let config = provider.load().await.unwrap();
    assert_eq!(config.stripe.publishable_key, "pk_test_123");
    assert_eq!(config.api.base_url, "https://api.fliq.test");
    assert!(config.feature_enabled("essayAnalysis"));

    assert_eq!(provider.cached(), Some(config));
}

#[tokio::test]
async fn load_serves_last_known_good_copy_when_fetch_fails() {
    let server = MockServer::start().await;

    // One healthy response, then the endpoint starts failing.
    Mock::given(method("GET"))
        .and(path("/api/config/client"))
        .respond_with(ResponseTemplate::new(200).set_body_json(config_body("pk_test_123")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/config/client"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let provider = provider(&server).await;
    let first = provider.load().await.unwrap();
    let second = provider.load().await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn load_with_cold_cache_propagates_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/config/client"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let provider = provider(&server).await;
    let err = provider.load().await.unwrap_err();

    assert!(matches!(err, ClientError::Api { status: 503, .. }));
    // A blocked payment surface is a server-side incident.
    assert_eq!(err.classify().severity, Severity::High);
    assert!(provider.cached().is_none());
}

#[tokio::test]
async fn missing_publishable_key_is_a_configuration_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/config/client"))
        .respond_with(ResponseTemplate::new(200).set_body_json(config_body("")))
        .mount(&server)
        .await;

    let provider = provider(&server).await;
    let err = provider.load().await.unwrap_err();

    assert!(matches!(err, ClientError::Configuration(_)));
    let classified = err.classify();
    assert_eq!(classified.category, ErrorCategory::Configuration);
    assert_eq!(classified.severity, Severity::Critical);
}

#[tokio::test]
async fn invalidate_clears_the_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/config/client"))
        .respond_with(ResponseTemplate::new(200).set_body_json(config_body("pk_test_123")))
        .mount(&server)
        .await;

    let provider = provider(&server).await;
    provider.load().await.unwrap();
    assert!(provider.cached().is_some());

    provider.invalidate();
    assert!(provider.cached().is_none());
}

#[tokio::test]
async fn check_health_reports_reachability() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .mount(&server)
        .await;

    let provider = provider(&server).await;
    assert!(provider.check_health().await);
}

#[tokio::test]
async fn check_health_is_false_for_unreachable_backend() {
    let provider = ConfigProvider::new(reqwest::Client::new(), "http://127.0.0.1:9");
    assert!(!provider.check_health().await);
}

#[tokio::test]
async fn check_health_is_false_for_unhealthy_backend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let provider = provider(&server).await;
    assert!(!provider.check_health().await);
}
