//! Common test infrastructure
//!
//! This module provides all the infrastructure needed for end-to-end tests.
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestServer, TestClient, RISK_PROFILE, TRANSACTION_HISTORY};
//! use reqwest::StatusCode;
//!
//! #[tokio::test]
//! async fn test_suggest_terms() {
//!     let server = TestServer::spawn().await;
//!     let client = TestClient::new(server.base_url.clone());
//!
//!     let response = client.suggest_terms(RISK_PROFILE, TRANSACTION_HISTORY).await;
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```

mod client;
mod constants;
mod provider;
mod server;

// Public API - this is what tests import
pub use client::TestClient;
pub use constants::*;
#[allow(unused_imports)]
pub use provider::{CannedProvider, CannedReply};
pub use server::TestServer;
