//! Response shapes the model must produce, and the checks applied to its reply.

use crate::llm::ResponseFormat;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Which kind of suggestion to ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    /// A payment plan expressed as a state machine.
    Workflow,
    /// Payment terms and risk mitigation strategies as prose.
    Terms,
}

impl SuggestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionKind::Workflow => "workflow",
            SuggestionKind::Terms => "terms",
        }
    }

    /// JSON Schema of the reply, forwarded to the provider as structured
    /// output format.
    pub fn json_schema(&self) -> Value {
        match self {
            SuggestionKind::Workflow => workflow_schema(),
            SuggestionKind::Terms => terms_schema(),
        }
    }

    pub fn response_format(&self) -> ResponseFormat {
        let name = match self {
            SuggestionKind::Workflow => "workflow_suggestion",
            SuggestionKind::Terms => "term_suggestion",
        };
        ResponseFormat::new(name, self.json_schema())
    }
}

impl fmt::Display for SuggestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowState {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowTrigger {
    pub name: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSuggestion {
    pub suggested_plan_name: String,
    pub states: Vec<WorkflowState>,
    pub triggers: Vec<WorkflowTrigger>,
    pub summary: String,
}

/// A trigger endpoint naming a state that is not declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    pub trigger: String,
    /// "from" or "to"
    pub endpoint: &'static str,
    pub state: String,
}

impl WorkflowSuggestion {
    pub fn state_names(&self) -> HashSet<&str> {
        self.states.iter().map(|s| s.name.as_str()).collect()
    }

    /// Trigger endpoints that do not match any declared state name.
    pub fn dangling_trigger_references(&self) -> Vec<DanglingReference> {
        let names = self.state_names();
        let mut dangling = Vec::new();
        for trigger in &self.triggers {
            for (endpoint, state) in [("from", &trigger.from), ("to", &trigger.to)] {
                if !names.contains(state.as_str()) {
                    dangling.push(DanglingReference {
                        trigger: trigger.name.clone(),
                        endpoint,
                        state: state.clone(),
                    });
                }
            }
        }
        dangling
    }

    fn check(&self, rules: &SchemaRules) -> Result<(), String> {
        require_text("suggestedPlanName", &self.suggested_plan_name)?;
        require_text("summary", &self.summary)?;

        let mut seen = HashSet::new();
        for (i, state) in self.states.iter().enumerate() {
            require_text(&format!("states[{}].name", i), &state.name)?;
            if !seen.insert(state.name.as_str()) {
                return Err(format!("duplicate state name '{}'", state.name));
            }
        }

        for (i, trigger) in self.triggers.iter().enumerate() {
            require_text(&format!("triggers[{}].name", i), &trigger.name)?;
            require_text(&format!("triggers[{}].from", i), &trigger.from)?;
            require_text(&format!("triggers[{}].to", i), &trigger.to)?;
        }

        if rules.enforce_trigger_references {
            if let Some(d) = self.dangling_trigger_references().first() {
                return Err(format!(
                    "trigger '{}' has `{}` = '{}', which is not a declared state",
                    d.trigger, d.endpoint, d.state
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermSuggestion {
    pub suggested_payment_terms: String,
    pub risk_mitigation_strategies: String,
}

impl TermSuggestion {
    fn check(&self) -> Result<(), String> {
        require_text("suggestedPaymentTerms", &self.suggested_payment_terms)?;
        require_text("riskMitigationStrategies", &self.risk_mitigation_strategies)
    }
}

/// One suggestion, of either kind.
///
/// Serializes as the bare inner object, so callers see exactly the fields
/// the model produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Suggestion {
    Workflow(WorkflowSuggestion),
    Terms(TermSuggestion),
}

impl Suggestion {
    pub fn kind(&self) -> SuggestionKind {
        match self {
            Suggestion::Workflow(_) => SuggestionKind::Workflow,
            Suggestion::Terms(_) => SuggestionKind::Terms,
        }
    }
}

/// Checks beyond field presence and type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaRules {
    /// Reject workflows whose triggers reference undeclared states.
    pub enforce_trigger_references: bool,
}

impl Default for SchemaRules {
    fn default() -> Self {
        Self {
            enforce_trigger_references: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplyError {
    #[error("model returned an empty response")]
    Empty,

    #[error("response does not match the {kind} schema: {reason}")]
    SchemaViolation { kind: SuggestionKind, reason: String },
}

/// Parses the raw model output for `kind` and applies `rules`.
pub fn parse_reply(
    kind: SuggestionKind,
    raw: &str,
    rules: &SchemaRules,
) -> Result<Suggestion, ReplyError> {
    let violation = |reason: String| ReplyError::SchemaViolation { kind, reason };

    let cleaned = strip_code_fences(raw);
    if cleaned.is_empty() {
        return Err(ReplyError::Empty);
    }

    let value: Value = match serde_json::from_str(&cleaned) {
        Ok(value) => value,
        Err(err) => extract_json_from_text(&cleaned)
            .ok_or_else(|| violation(format!("response is not valid JSON: {}", err)))?,
    };

    match &value {
        Value::Null => return Err(ReplyError::Empty),
        Value::Object(map) if map.is_empty() => return Err(ReplyError::Empty),
        Value::Object(_) => {}
        other => {
            return Err(violation(format!(
                "expected a JSON object, got {}",
                json_type_name(other)
            )))
        }
    }

    match kind {
        SuggestionKind::Workflow => {
            let workflow: WorkflowSuggestion =
                serde_json::from_value(value).map_err(|e| violation(e.to_string()))?;
            workflow.check(rules).map_err(violation)?;
            Ok(Suggestion::Workflow(workflow))
        }
        SuggestionKind::Terms => {
            let terms: TermSuggestion =
                serde_json::from_value(value).map_err(|e| violation(e.to_string()))?;
            terms.check().map_err(violation)?;
            Ok(Suggestion::Terms(terms))
        }
    }
}

fn require_text(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("`{}` must not be empty", field))
    } else {
        Ok(())
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Removes a surrounding markdown fence and its language tag, on one line or many.
fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    let body = match rest.split_once('\n') {
        Some((first, remainder)) if !first.trim_start().starts_with(['{', '[']) => remainder,
        Some(_) => rest,
        None => rest
            .trim_start()
            .trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
    };
    body.trim().to_string()
}

fn extract_json_from_text(raw: &str) -> Option<Value> {
    for (idx, ch) in raw.char_indices() {
        if ch != '{' {
            continue;
        }
        let slice = &raw[idx..];
        let mut deserializer = serde_json::Deserializer::from_str(slice);
        if let Ok(value) = Value::deserialize(&mut deserializer) {
            return Some(value);
        }
    }
    None
}

fn workflow_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "suggestedPlanName": {
                "type": "string",
                "description": "A descriptive name for the suggested payment plan (e.g., 'Secure Milestone Plan', 'Quarterly Net-60')."
            },
            "states": {
                "type": "array",
                "description": "An array of all possible states in the payment workflow state machine.",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": {
                            "type": "string",
                            "description": "The name of the state (e.g., 'Invoice Sent', 'Payment Received')."
                        },
                        "description": {
                            "type": "string",
                            "description": "A brief description of what this state represents."
                        }
                    },
                    "required": ["name", "description"]
                }
            },
            "triggers": {
                "type": "array",
                "description": "An array of all possible triggers that transition between states.",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": {
                            "type": "string",
                            "description": "The name of the trigger that causes a state transition (e.g., 'Receive Payment', 'Milestone Approved')."
                        },
                        "from": {
                            "type": "string",
                            "description": "The state from which this trigger originates."
                        },
                        "to": {
                            "type": "string",
                            "description": "The state to which this trigger leads."
                        }
                    },
                    "required": ["name", "from", "to"]
                }
            },
            "summary": {
                "type": "string",
                "description": "A human-readable summary explaining the logic behind the suggested plan."
            }
        },
        "required": ["suggestedPlanName", "states", "triggers", "summary"]
    })
}

fn terms_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "suggestedPaymentTerms": {
                "type": "string",
                "description": "The payment terms recommended for this partner, with the reasoning behind them."
            },
            "riskMitigationStrategies": {
                "type": "string",
                "description": "Strategies that reduce the financial risk of doing business with this partner."
            }
        },
        "required": ["suggestedPaymentTerms", "riskMitigationStrategies"]
    })
}
