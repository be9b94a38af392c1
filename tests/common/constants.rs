//! Shared constants for end-to-end tests
//!
//! This module contains all constants used across the test suite.
//! When test inputs or canned model replies change, update only this file.

// ============================================================================
// Request Inputs
// ============================================================================

/// Risk profile long enough to pass the default minimum length
pub const RISK_PROFILE: &str =
    "Credit score 610, construction subcontractor, industry exposed to seasonal cash crunches.";

/// Transaction history long enough to pass the default minimum length
pub const TRANSACTION_HISTORY: &str =
    "Eight invoices over 18 months, average $40k, three paid more than 30 days late.";

/// Input shorter than the default minimum length
pub const SHORT_INPUT: &str = "Pays late.";

// ============================================================================
// Canned Model Replies
// ============================================================================

/// Workflow reply used by the default test server
pub const MILESTONE_PLAN_JSON: &str = r#"{
  "suggestedPlanName": "Secure Milestone Plan",
  "states": [
    {"name": "Draft", "description": "Plan drafted, awaiting partner signature."},
    {"name": "Deposit Paid", "description": "25% upfront deposit received."},
    {"name": "Completed", "description": "Final milestone paid in full."}
  ],
  "triggers": [
    {"name": "Deposit received", "from": "Draft", "to": "Deposit Paid"},
    {"name": "Final invoice paid", "from": "Deposit Paid", "to": "Completed"}
  ],
  "summary": "Milestone payments cap the exposure to a partner with a late payment record."
}"#;

/// Terms reply used by the default test server
pub const TERMS_JSON: &str = r#"{
  "suggestedPaymentTerms": "Net 15 with a 25% upfront deposit.",
  "riskMitigationStrategies": "Credit insurance and monthly account reviews."
}"#;

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for the test server to become ready
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Default timeout for HTTP requests in tests
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for the server to become ready
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;
