//! Scripted provider double for unit tests.

use super::{CompletionOptions, CompletionResponse, LlmError, LlmProvider, Message, ResponseFormat};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub(crate) enum Reply {
    Content(String),
    Fail(fn() -> LlmError),
    Hang,
}

pub(crate) type RecordedCall = (Vec<Message>, Option<ResponseFormat>);

/// Replays one canned reply and records every call.
pub(crate) struct ScriptedProvider {
    reply: Reply,
    healthy: bool,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedProvider {
    pub(crate) fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            healthy: true,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn replying(value: serde_json::Value) -> Arc<Self> {
        Self::new(Reply::Content(value.to_string()))
    }

    pub(crate) fn unreachable() -> Arc<Self> {
        Arc::new(Self {
            reply: Reply::Fail(|| LlmError::Connection("connection refused".to_string())),
            healthy: false,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-1"
    }

    async fn complete(
        &self,
        messages: &[Message],
        format: Option<&ResponseFormat>,
        _options: &CompletionOptions,
    ) -> Result<CompletionResponse, LlmError> {
        self.calls
            .lock()
            .unwrap()
            .push((messages.to_vec(), format.cloned()));
        match &self.reply {
            Reply::Content(content) => Ok(CompletionResponse::from_content(content.clone())),
            Reply::Fail(make) => Err(make()),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(CompletionResponse::from_content(""))
            }
        }
    }

    async fn health_check(&self) -> Result<(), LlmError> {
        if self.healthy {
            Ok(())
        } else {
            Err(LlmError::Connection("connection refused".to_string()))
        }
    }
}
