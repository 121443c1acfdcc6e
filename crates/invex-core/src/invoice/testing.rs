//! Chat model doubles for tests.

use std::sync::Mutex;

use crate::error::LlmError;
use crate::llm::ChatModel;

/// Answers every prompt with the same reply and records the prompts.
pub(crate) struct ScriptedModel {
    reply: String,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub(crate) fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl ChatModel for ScriptedModel {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.reply.clone())
    }
}

/// Rejects every prompt as if the API key were wrong.
pub(crate) struct FailingModel;

impl ChatModel for FailingModel {
    async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
        Err(LlmError::Auth {
            status: 401,
            message: "Invalid API Key".to_string(),
        })
    }
}
