//! Payment Terms Advisor Library
//!
//! AI-assisted payment workflow and term suggestions served over HTTP.
//! This library exposes the internal modules for testing and potential reuse.

pub mod advisor;
pub mod config;
pub mod llm;
pub mod server;

// Re-export commonly used types for convenience
pub use advisor::{
    Suggestion, SuggestionError, SuggestionKind, SuggestionOutcome, SuggestionRequest,
    SuggestionService,
};
pub use llm::{build_provider, LlmProvider};
pub use server::{run_server, RequestsLoggingLevel, ServerConfig};
