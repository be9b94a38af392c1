//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all advisor endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::json;
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    // ========================================================================
    // Server Endpoints
    // ========================================================================

    /// GET /
    #[allow(dead_code)]
    pub async fn get_home(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Home request failed")
    }

    /// GET /v1/health
    #[allow(dead_code)]
    pub async fn get_health(&self) -> Response {
        self.client
            .get(format!("{}/v1/health", self.base_url))
            .send()
            .await
            .expect("Health request failed")
    }

    // ========================================================================
    // Suggestion Endpoints
    // ========================================================================

    /// POST /v1/suggest/workflow
    #[allow(dead_code)]
    pub async fn suggest_workflow(&self, risk_profile: &str, history: &str) -> Response {
        self.post_suggestion("workflow", risk_profile, history).await
    }

    /// POST /v1/suggest/terms
    #[allow(dead_code)]
    pub async fn suggest_terms(&self, risk_profile: &str, history: &str) -> Response {
        self.post_suggestion("terms", risk_profile, history).await
    }

    /// POST /v1/suggest/{kind} with an arbitrary body
    #[allow(dead_code)]
    pub async fn post_raw(&self, kind: &str, body: serde_json::Value) -> Response {
        self.client
            .post(format!("{}/v1/suggest/{}", self.base_url, kind))
            .json(&body)
            .send()
            .await
            .expect("Suggestion request failed")
    }

    async fn post_suggestion(&self, kind: &str, risk_profile: &str, history: &str) -> Response {
        self.post_raw(
            kind,
            json!({
                "partnerRiskProfile": risk_profile,
                "transactionHistory": history,
            }),
        )
        .await
    }
}
