//! Canned LLM provider for end-to-end tests
//!
//! Answers from a fixed reply per response format, so tests never reach a
//! real model.

use super::constants::*;
use async_trait::async_trait;
use payment_terms_advisor::llm::{
    CompletionOptions, CompletionResponse, LlmError, LlmProvider, Message, ResponseFormat,
};
use std::sync::atomic::{AtomicUsize, Ordering};

/// What the provider answers with
#[derive(Clone)]
pub enum CannedReply {
    /// Pick the canned workflow or terms reply from the requested format
    BySchema,
    /// Always answer with this text
    Fixed(String),
    /// Fail every call with a connection error
    Unreachable,
}

pub struct CannedProvider {
    reply: CannedReply,
    calls: AtomicUsize,
}

impl CannedProvider {
    pub fn new(reply: CannedReply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of completion calls received so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmProvider for CannedProvider {
    fn name(&self) -> &str {
        "canned"
    }

    fn model(&self) -> &str {
        "canned-model"
    }

    async fn complete(
        &self,
        _messages: &[Message],
        format: Option<&ResponseFormat>,
        _options: &CompletionOptions,
    ) -> Result<CompletionResponse, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            CannedReply::BySchema => {
                let content = match format.map(|f| f.name.as_str()) {
                    Some("term_suggestion") => TERMS_JSON,
                    _ => MILESTONE_PLAN_JSON,
                };
                Ok(CompletionResponse::from_content(content))
            }
            CannedReply::Fixed(content) => Ok(CompletionResponse::from_content(content.clone())),
            CannedReply::Unreachable => {
                Err(LlmError::Connection("connection refused".to_string()))
            }
        }
    }

    async fn health_check(&self) -> Result<(), LlmError> {
        match self.reply {
            CannedReply::Unreachable => Err(LlmError::Connection("connection refused".to_string())),
            _ => Ok(()),
        }
    }
}
