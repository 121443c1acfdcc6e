//! Invoice text to structured data via the hosted model.

use tracing::{debug, info};

use super::prompt::build_prompt;
use super::response::parse_response;
use crate::error::LlmError;
use crate::llm::ChatModel;
use crate::models::config::ExtractionConfig;
use crate::models::invoice::StructuredData;

/// Sends invoice text to a chat model and parses the reply.
pub struct InvoiceDataExtractor<M> {
    model: M,
    config: ExtractionConfig,
}

impl<M: ChatModel> InvoiceDataExtractor<M> {
    /// Create an extractor with default parsing settings.
    pub fn new(model: M) -> Self {
        Self {
            model,
            config: ExtractionConfig::default(),
        }
    }

    /// Set response parsing options.
    pub fn with_config(mut self, config: ExtractionConfig) -> Self {
        self.config = config;
        self
    }

    /// The underlying chat model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Extract invoice fields from `text`.
    ///
    /// A reply that is not JSON comes back as [`StructuredData::Error`].
    /// Only failures of the model call itself are returned as `Err`.
    pub async fn extract(&self, text: &str) -> Result<StructuredData, LlmError> {
        let prompt = build_prompt(text);
        debug!("Prompt is {} chars", prompt.len());

        let reply = self.model.complete(&prompt).await?;
        let data = parse_response(&reply, &self.config);

        info!(
            "Model reply parsed: {}",
            if data.is_error() { "failed" } else { "ok" }
        );
        Ok(data)
    }
}
