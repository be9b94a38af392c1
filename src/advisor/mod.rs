//! AI-assisted payment terms advisor.
//!
//! Turns a partner risk profile and transaction history into either a
//! state machine payment workflow or a pair of term/risk recommendations:
//! - `request`: inputs and the minimum-length policy
//! - `prompt`: instruction templates per suggestion kind
//! - `schema`: reply shapes, JSON schemas and reply checks
//! - `service`: the single-call suggestion service and its error taxonomy

mod prompt;
mod request;
mod schema;
mod service;

pub use prompt::PromptTemplate;
pub use request::{RequestField, SuggestionRequest, ValidationError, ValidationPolicy};
pub use schema::{
    parse_reply, DanglingReference, ReplyError, SchemaRules, Suggestion, SuggestionKind,
    TermSuggestion, WorkflowState, WorkflowSuggestion, WorkflowTrigger,
};
pub use service::{
    FailureKind, SuggestionConfig, SuggestionError, SuggestionOutcome, SuggestionService,
};
