mod file_config;

pub use file_config::{FileConfig, LlmConfig, SuggestionsConfig};

use crate::advisor::{SuggestionConfig, ValidationPolicy};
use crate::llm::CompletionOptions;
use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::time::Duration;

const SUPPORTED_PROVIDERS: &[&str] = &["ollama", "openai"];

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub llm_provider: String,
    pub llm_base_url: Option<String>,
    pub llm_model: Option<String>,
    pub min_length: usize,
    pub call_timeout_sec: u64,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            port: 3001,
            metrics_port: 9091,
            logging_level: RequestsLoggingLevel::Path,
            frontend_dir_path: None,
            llm_provider: "ollama".to_string(),
            llm_base_url: None,
            llm_model: None,
            min_length: ValidationPolicy::DEFAULT_MIN_LENGTH,
            call_timeout_sec: 120,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Core settings
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,

    // Feature configs (with defaults)
    pub llm: LlmSettings,
    pub suggestions: SuggestionSettings,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);
        if port == metrics_port {
            bail!("port and metrics_port must differ (both are {})", port);
        }

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        // LLM settings - TOML [llm] section, then CLI, then provider defaults
        let llm_file = file.llm.unwrap_or_default();
        let provider = llm_file
            .provider
            .unwrap_or_else(|| cli.llm_provider.clone())
            .to_lowercase();
        if !SUPPORTED_PROVIDERS.contains(&provider.as_str()) {
            bail!(
                "Unsupported LLM provider '{}', expected one of: {}",
                provider,
                SUPPORTED_PROVIDERS.join(", ")
            );
        }
        let provider_defaults = LlmSettings::defaults_for(&provider);
        if llm_file.api_key.is_some() && llm_file.api_key_command.is_some() {
            bail!("llm.api_key and llm.api_key_command cannot both be set");
        }
        let llm = LlmSettings {
            base_url: llm_file
                .base_url
                .or_else(|| cli.llm_base_url.clone())
                .unwrap_or(provider_defaults.base_url),
            model: llm_file
                .model
                .or_else(|| cli.llm_model.clone())
                .unwrap_or(provider_defaults.model),
            api_key: llm_file.api_key,
            api_key_command: llm_file.api_key_command,
            temperature: llm_file
                .temperature
                .unwrap_or(provider_defaults.temperature),
            max_tokens: llm_file.max_tokens,
            timeout_secs: llm_file
                .timeout_secs
                .unwrap_or(provider_defaults.timeout_secs),
            provider,
        };
        if llm.timeout_secs == 0 {
            bail!("llm.timeout_secs must be greater than zero");
        }

        // Suggestion settings - merge file config with CLI
        let sg_file = file.suggestions.unwrap_or_default();
        let suggestions = SuggestionSettings {
            min_length: sg_file.min_length.unwrap_or(cli.min_length),
            call_timeout_secs: sg_file.call_timeout_secs.unwrap_or(cli.call_timeout_sec),
            enforce_trigger_references: sg_file.enforce_trigger_references.unwrap_or(true),
        };
        if suggestions.min_length == 0 {
            bail!("suggestions.min_length must be at least 1");
        }
        if suggestions.call_timeout_secs == 0 {
            bail!("suggestions.call_timeout_secs must be greater than zero");
        }

        Ok(Self {
            port,
            metrics_port,
            logging_level,
            frontend_dir_path,
            llm,
            suggestions,
        })
    }

    /// Builds the suggestion service configuration from the resolved settings.
    pub fn suggestion_config(&self) -> SuggestionConfig {
        SuggestionConfig {
            policy: ValidationPolicy::new(self.suggestions.min_length),
            completion: CompletionOptions {
                temperature: self.llm.temperature,
                max_tokens: self.llm.max_tokens,
                timeout: Duration::from_secs(self.llm.timeout_secs),
            },
            call_timeout: Duration::from_secs(self.suggestions.call_timeout_secs),
            enforce_trigger_references: self.suggestions.enforce_trigger_references,
            ..SuggestionConfig::default()
        }
    }
}

/// Settings for the LLM provider.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub provider: String,
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub api_key_command: Option<String>,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout_secs: u64,
}

impl LlmSettings {
    fn defaults_for(provider: &str) -> Self {
        match provider {
            "openai" => Self {
                provider: "openai".to_string(),
                base_url: "https://api.openai.com/v1".to_string(),
                model: "gpt-4o-mini".to_string(),
                ..Self::default()
            },
            _ => Self::default(),
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.1:8b".to_string(),
            api_key: None,
            api_key_command: None,
            temperature: 0.3,
            max_tokens: None,
            timeout_secs: 120,
        }
    }
}

/// Settings for the suggestion service.
#[derive(Debug, Clone)]
pub struct SuggestionSettings {
    pub min_length: usize,
    pub call_timeout_secs: u64,
    pub enforce_trigger_references: bool,
}

impl Default for SuggestionSettings {
    fn default() -> Self {
        Self {
            min_length: ValidationPolicy::DEFAULT_MIN_LENGTH,
            call_timeout_secs: 120,
            enforce_trigger_references: true,
        }
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
