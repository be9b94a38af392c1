//! Suggestion requests and the minimum-length validation policy.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The two free-text inputs a suggestion is based on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest {
    /// Credit score, industry stability, financial health of the partner.
    pub partner_risk_profile: String,
    /// Payment frequency, average amounts, past payment issues.
    pub transaction_history: String,
}

impl SuggestionRequest {
    pub fn new(
        partner_risk_profile: impl Into<String>,
        transaction_history: impl Into<String>,
    ) -> Self {
        Self {
            partner_risk_profile: partner_risk_profile.into(),
            transaction_history: transaction_history.into(),
        }
    }

    pub fn field(&self, field: RequestField) -> &str {
        match field {
            RequestField::PartnerRiskProfile => &self.partner_risk_profile,
            RequestField::TransactionHistory => &self.transaction_history,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestField {
    PartnerRiskProfile,
    TransactionHistory,
}

impl RequestField {
    /// Fields in the order they are validated.
    pub const ALL: [RequestField; 2] = [
        RequestField::PartnerRiskProfile,
        RequestField::TransactionHistory,
    ];

    /// Name of the field in JSON payloads.
    pub fn wire_name(&self) -> &'static str {
        match self {
            RequestField::PartnerRiskProfile => "partnerRiskProfile",
            RequestField::TransactionHistory => "transactionHistory",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RequestField::PartnerRiskProfile => "Partner risk profile",
            RequestField::TransactionHistory => "Transaction history",
        }
    }
}

impl fmt::Display for RequestField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// A request field that does not meet the minimum-length policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: RequestField,
    pub min_length: usize,
    pub actual_length: usize,
}

impl ValidationError {
    /// Human readable message naming the offending field.
    pub fn message(&self) -> String {
        if self.actual_length == 0 {
            format!("{} must not be empty.", self.field)
        } else {
            format!(
                "{} must be at least {} characters (got {}).",
                self.field, self.min_length, self.actual_length
            )
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for ValidationError {}

/// Minimum-length policy applied to both request fields.
///
/// Length counts characters after trimming surrounding whitespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationPolicy {
    min_length: usize,
}

impl ValidationPolicy {
    pub const DEFAULT_MIN_LENGTH: usize = 50;

    /// A zero minimum is raised to one so empty fields are always rejected.
    pub fn new(min_length: usize) -> Self {
        Self {
            min_length: min_length.max(1),
        }
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Checks every field, failing on the first one below the minimum.
    /// The request is never modified.
    pub fn validate(&self, request: &SuggestionRequest) -> Result<(), ValidationError> {
        for field in RequestField::ALL {
            let actual_length = request.field(field).trim().chars().count();
            if actual_length < self.min_length {
                return Err(ValidationError {
                    field,
                    min_length: self.min_length,
                    actual_length,
                });
            }
        }
        Ok(())
    }
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MIN_LENGTH)
    }
}
