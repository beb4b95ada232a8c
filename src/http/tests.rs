//! Tests for the HTTP client module

use super::*;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn test_http_client_config_default() {
    let config = HttpClientConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(120));
    assert!(config.user_agent.starts_with("salesforce-extract/"));
}

#[test]
fn test_http_client_config_builder() {
    let config = HttpClientConfig::builder()
        .timeout(Duration::from_secs(60))
        .build();

    assert_eq!(config.timeout, Duration::from_secs(60));
    assert_eq!(config.user_agent, HttpClientConfig::default().user_agent);
}

#[tokio::test]
async fn test_get_sends_bearer_and_accept() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/services/data/v52.0/sobjects"))
        .and(header("Authorization", "Bearer abc"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
        .mount(&mock_server)
        .await;

    let client = HttpClient::new().unwrap();
    let response = client
        .get_json_text(
            &format!("{}/services/data/v52.0/sobjects", mock_server.uri()),
            "abc",
        )
        .await
        .unwrap();

    assert!(response.is_ok());
    assert_eq!(response.body, r#"{"ok":true}"#);
}

#[tokio::test]
async fn test_client_errors_are_returned_not_raised() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/bad"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_string(r#"[{"errorCode":"MALFORMED_QUERY","message":"bad"}]"#),
        )
        .mount(&mock_server)
        .await;

    let client = HttpClient::new().unwrap();
    let response = client
        .get_json_text(&format!("{}/bad", mock_server.uri()), "abc")
        .await
        .unwrap();

    assert_eq!(response.status, 400);
    assert!(!response.is_ok());
    assert!(response.body.contains("MALFORMED_QUERY"));
}

#[tokio::test]
async fn test_post_form() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(header("Content-Type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("grant_type=password"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&mock_server)
        .await;

    let client = HttpClient::new().unwrap();
    let response = client
        .post_form(
            &format!("{}/token", mock_server.uri()),
            &[("grant_type", "password")],
        )
        .await
        .unwrap();

    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_user_agent_is_sent() {
    let mock_server = MockServer::start().await;
    let agent = HttpClientConfig::default().user_agent;

    Mock::given(method("GET"))
        .and(path("/secure"))
        .and(header("User-Agent", agent.as_str()))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let client = HttpClient::new().unwrap();
    let response = client
        .get_json_text(&format!("{}/secure", mock_server.uri()), "t")
        .await
        .unwrap();

    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_timeout_is_enforced() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .timeout(Duration::from_millis(100))
        .build();
    let client = HttpClient::with_config(config).unwrap();
    let err = client
        .get_json_text(&format!("{}/slow", mock_server.uri()), "t")
        .await
        .unwrap_err();

    assert!(err.is_timeout());
}
