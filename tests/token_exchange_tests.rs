//! Integration tests for the authorization-code exchange.
//!
//! These tests point [`HttpTokenExchanger`] at a wiremock server standing in
//! for the shop's `/admin/oauth/access_token` endpoint.

use shopify_gateway::auth::oauth::{HttpTokenExchanger, OAuthError, TokenExchanger};
use shopify_gateway::{ApiKey, ApiSecretKey, ShopDomain};
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials() -> (ShopDomain, ApiKey, ApiSecretKey) {
    (
        ShopDomain::new("test-shop").unwrap(),
        ApiKey::new("test-api-key").unwrap(),
        ApiSecretKey::new("test-secret").unwrap(),
    )
}

fn exchanger_for(server: &MockServer, timeout: Duration) -> HttpTokenExchanger {
    HttpTokenExchanger::new(timeout)
        .unwrap()
        .with_base_url(server.uri())
}

#[tokio::test]
async fn test_exchange_posts_credentials_and_parses_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/oauth/access_token"))
        .and(header("content-type", "application/json"))
        .and(body_json(serde_json::json!({
            "client_id": "test-api-key",
            "client_secret": "test-secret",
            "code": "auth-code-123"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "shpat_abc",
            "scope": "read_products,write_products"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (shop, key, secret) = credentials();
    let response = exchanger_for(&server, Duration::from_secs(5))
        .exchange_code(&shop, &key, &secret, "auth-code-123")
        .await
        .unwrap();

    assert_eq!(response.access_token.as_deref(), Some("shpat_abc"));
    assert_eq!(
        response.scope.as_deref(),
        Some("read_products,write_products")
    );
}

#[tokio::test]
async fn test_exchange_reports_non_success_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/oauth/access_token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid_request"))
        .expect(1)
        .mount(&server)
        .await;

    let (shop, key, secret) = credentials();
    let result = exchanger_for(&server, Duration::from_secs(5))
        .exchange_code(&shop, &key, &secret, "used-code")
        .await;

    match result {
        Err(OAuthError::TokenExchangeFailed { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "invalid_request");
        }
        other => panic!("Expected TokenExchangeFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn test_exchange_tolerates_missing_access_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/oauth/access_token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "scope": "read_products" })),
        )
        .mount(&server)
        .await;

    let (shop, key, secret) = credentials();
    let response = exchanger_for(&server, Duration::from_secs(5))
        .exchange_code(&shop, &key, &secret, "code")
        .await
        .unwrap();

    // Rejected later, when the token bundle is built.
    assert!(response.access_token.is_none());
}

#[tokio::test]
async fn test_exchange_rejects_unparseable_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/oauth/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let (shop, key, secret) = credentials();
    let result = exchanger_for(&server, Duration::from_secs(5))
        .exchange_code(&shop, &key, &secret, "code")
        .await;

    assert!(matches!(
        result,
        Err(OAuthError::TokenExchangeFailed { status: 200, .. })
    ));
}

#[tokio::test]
async fn test_exchange_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/admin/oauth/access_token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "access_token": "late" }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let (shop, key, secret) = credentials();
    let result = exchanger_for(&server, Duration::from_millis(200))
        .exchange_code(&shop, &key, &secret, "code")
        .await;

    assert!(matches!(result, Err(OAuthError::UpstreamTimeout)));
}

#[tokio::test]
async fn test_exchange_reports_network_failure() {
    // Bind and release a port so nothing is listening on it.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (shop, key, secret) = credentials();
    let result = HttpTokenExchanger::new(Duration::from_secs(2))
        .unwrap()
        .with_base_url(format!("http://{addr}"))
        .exchange_code(&shop, &key, &secret, "code")
        .await;

    assert!(matches!(
        result,
        Err(OAuthError::TokenExchangeFailed { status: 0, .. })
    ));
}
