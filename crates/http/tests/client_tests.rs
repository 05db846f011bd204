//! Integration tests for the Folio HTTP client

mod common;

use folio_http::{ClientConfig, ClientError, Environment, FolioClient};
use reqwest::{Method, StatusCode};
use serde_json::json;
use wiremock::matchers::{body_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_client_builder() {
    let client = FolioClient::new(ClientConfig::new("http://localhost:8080/"));

    assert!(client.is_ok());
    let client = client.unwrap();
    assert_eq!(client.base_url(), "http://localhost:8080");
    assert!(!client.is_refreshing());
}

#[tokio::test]
async fn test_client_builder_requires_base_url() {
    let result = FolioClient::new(ClientConfig::new(""));
    assert!(matches!(result, Err(ClientError::Configuration(_))));
}

#[tokio::test]
async fn test_production_rejects_plain_http() {
    let config = ClientConfig::new("http://api.example.com").with_environment(Environment::Production);
    assert!(matches!(
        FolioClient::new(config),
        Err(ClientError::Configuration(_))
    ));
}

#[tokio::test]
async fn test_bearer_token_is_injected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .and(header("authorization", "Bearer test-access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "u1",
            "name": "Ana",
            "email": "ana@example.com"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = common::signed_in(&mock_server, "test-access", "test-refresh");
    let profile = h.client.profile().await.unwrap();
    assert_eq!(profile.name, "Ana");
}

#[tokio::test]
async fn test_no_authorization_header_without_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/subscriptions/plans"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/subscriptions/plans"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = common::harness(&mock_server);
    assert!(h.client.plans().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_json_body_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/echo"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "hello": "world" })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&mock_server)
        .await;

    let h = common::harness(&mock_server);
    let body = json!({ "hello": "world" });
    let response = h
        .client
        .request(Method::POST, "/echo", Some(&body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_error_handling() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such user"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/addresses"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let h = common::signed_in(&mock_server, "T1", "R1");

    let result = h.client.profile().await;
    assert!(matches!(result, Err(ClientError::NotFound(ref m)) if m == "no such user"));

    let result = h.client.addresses().await;
    assert!(matches!(
        result,
        Err(ClientError::ServerError { status: 500, .. })
    ));
}

#[tokio::test]
async fn test_transport_errors_surface() {
    // Port 1 is reserved and refuses connections
    let uri = "http://127.0.0.1:1";

    let client = FolioClient::new(ClientConfig::new(uri)).unwrap();
    let result = client.request(Method::GET, "/users/me", None).await;
    assert!(matches!(result, Err(ClientError::Request(_))));
}
