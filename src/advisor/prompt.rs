//! Instruction templates sent to the model.

use super::request::{RequestField, SuggestionRequest};
use crate::llm::Message;

/// A system role plus a user instruction with `{{partnerRiskProfile}}` and
/// `{{transactionHistory}}` placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    pub system: String,
    pub instruction: String,
}

impl PromptTemplate {
    pub fn new(system: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            instruction: instruction.into(),
        }
    }

    /// State machine payment plan designer.
    pub fn workflow() -> Self {
        Self::new(WORKFLOW_SYSTEM, WORKFLOW_INSTRUCTION)
    }

    /// Payment terms and risk mitigation advisor.
    pub fn terms() -> Self {
        Self::new(TERMS_SYSTEM, TERMS_INSTRUCTION)
    }

    /// Builds the conversation for one request. Field values are embedded
    /// verbatim, and placeholders appearing inside them are not expanded.
    pub fn render(&self, request: &SuggestionRequest) -> Vec<Message> {
        vec![
            Message::system(self.system.clone()),
            Message::user(interpolate(&self.instruction, request)),
        ]
    }
}

fn interpolate(template: &str, request: &SuggestionRequest) -> String {
    let mut out = String::with_capacity(
        template.len() + request.partner_risk_profile.len() + request.transaction_history.len(),
    );
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        let field = after_open.find("}}").and_then(|end| {
            RequestField::ALL
                .into_iter()
                .find(|f| after_open[..end].trim() == f.wire_name())
                .map(|f| (f, end))
        });
        match field {
            Some((field, end)) => {
                out.push_str(request.field(field));
                rest = &after_open[end + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after_open;
            }
        }
    }
    out.push_str(rest);
    out
}

const WORKFLOW_SYSTEM: &str = "You are an expert financial workflow architect specializing in \
designing state machine-based payment plans for B2B partnerships.";

const WORKFLOW_INSTRUCTION: &str = "Based on the provided partner risk profile and transaction \
history, design a custom, state-driven payment workflow. The workflow should be represented as a \
state machine with a clear set of states and triggers for transitions.

**Partner Risk Profile:**
{{partnerRiskProfile}}

**Transaction History:**
{{transactionHistory}}

**Your Task:**
1.  **Define States:** Create a list of clear, logical states for the entire payment lifecycle. \
Examples include 'Awaiting Down Payment', 'Milestone 1: In Progress', 'Milestone 1: Invoice Sent', \
'Final Payment Received', 'Completed'.
2.  **Define Triggers:** Specify the triggers that cause transitions between these states. \
Examples include 'Down Payment Confirmed', 'Milestone 1 Approved by Partner', 'Final Invoice Paid'. \
Every trigger's `from` and `to` must be the exact name of one of your states.
3.  **Create a Plan:** Name the plan descriptively and provide a summary explaining why this state \
machine structure is optimal for the given partner, considering their risk and history.

The goal is to create a robust, traceable, and automated workflow that minimizes financial risk \
while maintaining a good partner relationship.

Respond with a single JSON object matching the requested schema.";

const TERMS_SYSTEM: &str = "You are a financial risk management expert advising a business on \
payment terms for its B2B partners.";

const TERMS_INSTRUCTION: &str = "Based on the provided partner risk profile and transaction \
history, suggest optimal payment terms and strategies to mitigate the risk of late or missed \
payments.

**Partner Risk Profile:**
{{partnerRiskProfile}}

**Transaction History:**
{{transactionHistory}}

**Your Task:**
1.  **Suggested Payment Terms:** Describe the payment terms you recommend (for example net days, \
deposits, milestone billing, early payment discounts) and why they fit this partner.
2.  **Risk Mitigation Strategies:** Describe concrete strategies that reduce financial exposure \
to this partner while keeping the relationship healthy.

Respond with a single JSON object matching the requested schema.";
