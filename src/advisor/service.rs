//! The suggestion service: validation, one model call, schema checks.

use super::prompt::PromptTemplate;
use super::request::{SuggestionRequest, ValidationError, ValidationPolicy};
use super::schema::{
    parse_reply, ReplyError, SchemaRules, Suggestion, SuggestionKind, TermSuggestion,
    WorkflowSuggestion,
};
use crate::llm::{CompletionOptions, LlmError, LlmProvider};
use crate::server::metrics;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info, warn, Instrument};
use uuid::Uuid;

/// Errors returned by [`SuggestionService::suggest`].
#[derive(Debug, Error)]
pub enum SuggestionError {
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("Upstream model call failed: {0}")]
    Upstream(#[from] LlmError),

    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    #[error("Model returned an empty response")]
    EmptyResponse,
}

impl SuggestionError {
    /// Message safe to show to the end user.
    pub fn user_message(&self) -> String {
        match self {
            SuggestionError::Validation(e) => e.message(),
            SuggestionError::Upstream(_) => {
                "An unexpected error occurred on the server. Please try again.".to_string()
            }
            SuggestionError::SchemaViolation(_) => {
                "The AI returned a response in an unexpected format. Please try again."
                    .to_string()
            }
            SuggestionError::EmptyResponse => {
                "The AI did not return a suggestion. Please try again.".to_string()
            }
        }
    }

    pub fn failure_kind(&self) -> FailureKind {
        match self {
            SuggestionError::Validation(_) => FailureKind::Validation,
            SuggestionError::Upstream(_) => FailureKind::Upstream,
            SuggestionError::SchemaViolation(_) => FailureKind::SchemaViolation,
            SuggestionError::EmptyResponse => FailureKind::EmptyResponse,
        }
    }

    /// Label used for metrics and logs.
    pub fn outcome(&self) -> &'static str {
        self.failure_kind().as_str()
    }
}

/// Which error class a failed outcome came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Validation,
    Upstream,
    SchemaViolation,
    EmptyResponse,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Validation => "validation",
            FailureKind::Upstream => "upstream",
            FailureKind::SchemaViolation => "schema_violation",
            FailureKind::EmptyResponse => "empty_response",
        }
    }
}

impl From<ReplyError> for SuggestionError {
    fn from(err: ReplyError) -> Self {
        match err {
            ReplyError::Empty => SuggestionError::EmptyResponse,
            ReplyError::SchemaViolation { .. } => SuggestionError::SchemaViolation(err.to_string()),
        }
    }
}

/// Uniform result handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Suggestion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Not sent over the wire; lets the HTTP layer pick a status code.
    #[serde(skip)]
    pub failure: Option<FailureKind>,
}

impl SuggestionOutcome {
    pub fn success(data: Suggestion) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            failure: None,
        }
    }

    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            failure: Some(kind),
        }
    }

    /// Logs the failure, if any, and keeps only the user-facing message.
    fn from_result(kind: SuggestionKind, result: Result<Suggestion, SuggestionError>) -> Self {
        match result {
            Ok(suggestion) => Self::success(suggestion),
            Err(SuggestionError::Validation(e)) => {
                debug!(%kind, field = %e.field, "Rejected suggestion request");
                Self::failure(FailureKind::Validation, e.message())
            }
            Err(e) => {
                error!(%kind, outcome = e.outcome(), "Error suggesting payment terms: {}", e);
                Self::failure(e.failure_kind(), e.user_message())
            }
        }
    }
}

/// Everything the service needs besides the provider.
#[derive(Debug, Clone)]
pub struct SuggestionConfig {
    pub policy: ValidationPolicy,
    pub workflow_prompt: PromptTemplate,
    pub terms_prompt: PromptTemplate,
    pub completion: CompletionOptions,
    /// Upper bound on the whole upstream call, enforced on our side.
    pub call_timeout: Duration,
    pub enforce_trigger_references: bool,
}

impl SuggestionConfig {
    pub fn prompt(&self, kind: SuggestionKind) -> &PromptTemplate {
        match kind {
            SuggestionKind::Workflow => &self.workflow_prompt,
            SuggestionKind::Terms => &self.terms_prompt,
        }
    }

    fn schema_rules(&self) -> SchemaRules {
        SchemaRules {
            enforce_trigger_references: self.enforce_trigger_references,
        }
    }
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            policy: ValidationPolicy::default(),
            workflow_prompt: PromptTemplate::workflow(),
            terms_prompt: PromptTemplate::terms(),
            completion: CompletionOptions::default(),
            call_timeout: Duration::from_secs(120),
            enforce_trigger_references: true,
        }
    }
}

/// Stateless per call; safe to share behind an `Arc` across tasks.
pub struct SuggestionService {
    llm: Arc<dyn LlmProvider>,
    config: SuggestionConfig,
}

impl SuggestionService {
    pub fn new(llm: Arc<dyn LlmProvider>, config: SuggestionConfig) -> Self {
        Self { llm, config }
    }

    pub fn config(&self) -> &SuggestionConfig {
        &self.config
    }

    pub fn provider(&self) -> &dyn LlmProvider {
        self.llm.as_ref()
    }

    /// Validates the request, asks the model once, and checks the reply.
    pub async fn suggest(
        &self,
        kind: SuggestionKind,
        request: &SuggestionRequest,
    ) -> Result<Suggestion, SuggestionError> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!("suggest", %kind, %request_id);

        let start = Instant::now();
        let result = self.suggest_inner(kind, request).instrument(span).await;
        metrics::record_suggestion(kind, outcome_label(&result), start.elapsed());
        result
    }

    async fn suggest_inner(
        &self,
        kind: SuggestionKind,
        request: &SuggestionRequest,
    ) -> Result<Suggestion, SuggestionError> {
        self.config.policy.validate(request)?;

        let messages = self.config.prompt(kind).render(request);
        let format = kind.response_format();

        debug!(
            provider = self.llm.name(),
            model = self.llm.model(),
            "Requesting suggestion"
        );
        metrics::record_upstream_call(self.llm.name());
        let start = Instant::now();

        let response = tokio::time::timeout(
            self.config.call_timeout,
            self.llm
                .complete(&messages, Some(&format), &self.config.completion),
        )
        .await
        .map_err(|_| {
            warn!(
                timeout_ms = self.config.call_timeout.as_millis() as u64,
                "Model call timed out"
            );
            LlmError::Timeout
        })??;

        let elapsed_ms = start.elapsed().as_millis() as u64;
        let suggestion = parse_reply(
            kind,
            &response.message.content,
            &self.config.schema_rules(),
        )?;

        info!(
            elapsed_ms,
            finish_reason = ?response.finish_reason,
            total_tokens = response.usage.map(|u| u.total_tokens),
            "Suggestion produced"
        );
        Ok(suggestion)
    }

    pub async fn suggest_workflow(
        &self,
        request: &SuggestionRequest,
    ) -> Result<WorkflowSuggestion, SuggestionError> {
        match self.suggest(SuggestionKind::Workflow, request).await? {
            Suggestion::Workflow(workflow) => Ok(workflow),
            Suggestion::Terms(_) => Err(SuggestionError::SchemaViolation(
                "expected a workflow suggestion".to_string(),
            )),
        }
    }

    pub async fn suggest_terms(
        &self,
        request: &SuggestionRequest,
    ) -> Result<TermSuggestion, SuggestionError> {
        match self.suggest(SuggestionKind::Terms, request).await? {
            Suggestion::Terms(terms) => Ok(terms),
            Suggestion::Workflow(_) => Err(SuggestionError::SchemaViolation(
                "expected a term suggestion".to_string(),
            )),
        }
    }

    /// Service boundary: never fails, every error becomes a failure outcome.
    pub async fn handle(&self, kind: SuggestionKind, request: &SuggestionRequest) -> SuggestionOutcome {
        SuggestionOutcome::from_result(kind, self.suggest(kind, request).await)
    }
}

fn outcome_label(result: &Result<Suggestion, SuggestionError>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(e) => e.outcome(),
    }
}
