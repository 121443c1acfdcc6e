//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration for the invex pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvexConfig {
    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Hosted model configuration.
    pub llm: LlmConfig,

    /// Response parsing configuration.
    pub extraction: ExtractionConfig,
}

/// Which library turns PDF content streams into text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextEngine {
    /// Page-by-page extraction with lopdf, concatenated in page order.
    #[default]
    PerPage,
    /// Whole-document extraction with pdf-extract.
    Layout,
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Text extraction engine.
    pub text_engine: TextEngine,

    /// Try the empty user password on encrypted documents.
    pub decrypt_empty_password: bool,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            text_engine: TextEngine::PerPage,
            decrypt_empty_password: true,
        }
    }
}

/// Hosted chat-completion endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API.
    pub base_url: String,

    /// Model identifier sent with every request.
    pub model: String,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// Request timeout in seconds. `None` keeps the HTTP client default.
    pub timeout_secs: Option<u64>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
            timeout_secs: None,
        }
    }
}

/// How the JSON payload is located inside the model's answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadStrategy {
    /// Strip a leading code fence by splitting on the fence markers.
    #[default]
    FenceSplit,
    /// Scan for the first balanced `{...}` object, falling back to the fence split.
    Balanced,
}

/// Response parsing configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Payload location strategy.
    pub payload_strategy: PayloadStrategy,

    /// Reject parsed JSON that does not have the invoice shape.
    pub validate_schema: bool,
}

impl InvexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}
