//! End-to-end tests for the home and health endpoints

mod common;

use common::{CannedReply, TestClient, TestServer};
use payment_terms_advisor::advisor::SuggestionConfig;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn test_home_reports_provider() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_home().await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["provider"], "canned");
    assert_eq!(body["model"], "canned-model");
    assert!(body["uptime"].is_string());
}

#[tokio::test]
async fn test_health_ok() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_health().await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_health_unavailable_when_provider_is_down() {
    let server =
        TestServer::spawn_with(CannedReply::Unreachable, SuggestionConfig::default()).await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_health().await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "unavailable");
    assert_eq!(body["error"], "The AI service is currently unavailable.");
    assert_eq!(server.provider.call_count(), 0);
}
