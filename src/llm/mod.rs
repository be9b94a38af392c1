//! LLM provider abstraction layer.
//!
//! This module provides a trait-based abstraction for LLM providers,
//! allowing the advisor to work with different backends (Ollama, OpenAI, etc.).

mod ollama;
mod openai;
mod provider;
#[cfg(test)]
pub(crate) mod testing;
mod types;

pub use ollama::OllamaProvider;
pub use openai::{ApiKeySource, OpenAIProvider};
pub use provider::{CompletionOptions, LlmError, LlmProvider};
pub use types::{
    CompletionResponse, FinishReason, Message, MessageRole, ResponseFormat, TokenUsage,
};

use crate::config::LlmSettings;
use anyhow::{bail, Result};
use std::sync::Arc;
use tracing::info;

/// Builds the provider selected in the configuration.
pub fn build_provider(settings: &LlmSettings) -> Result<Arc<dyn LlmProvider>> {
    let provider: Arc<dyn LlmProvider> = match settings.provider.as_str() {
        "ollama" => Arc::new(OllamaProvider::new(&settings.base_url, &settings.model)),
        "openai" => match (&settings.api_key, &settings.api_key_command) {
            (Some(_), Some(_)) => bail!("api_key and api_key_command are mutually exclusive"),
            (_, Some(cmd)) => Arc::new(OpenAIProvider::with_key_command(
                &settings.base_url,
                &settings.model,
                cmd.clone(),
            )),
            (key, None) => Arc::new(OpenAIProvider::new(
                &settings.base_url,
                &settings.model,
                key.clone(),
            )),
        },
        other => bail!("Unknown LLM provider: {}", other),
    };

    info!(
        provider = provider.name(),
        model = provider.model(),
        base_url = %settings.base_url,
        "LLM provider configured"
    );
    Ok(provider)
}
