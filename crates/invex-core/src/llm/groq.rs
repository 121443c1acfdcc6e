//! Groq (OpenAI-compatible) chat-completion client.

use std::fmt;
use std::time::{Duration, Instant};

use reqwest::header::RETRY_AFTER;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{ChatModel, TEMPERATURE};
use crate::error::{InvexError, LlmError};
use crate::models::config::LlmConfig;

/// Client for an OpenAI-compatible `/chat/completions` endpoint.
///
/// Built once per session. No retries: every failure is returned to the
/// caller as an [`LlmError`].
pub struct GroqClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

impl GroqClient {
    /// Create a client with an explicit API key.
    pub fn new(api_key: impl Into<String>, config: &LlmConfig) -> crate::Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(InvexError::Config("API key is empty".to_string()));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| InvexError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key,
        })
    }

    /// Create a client with the key read from `config.api_key_env`.
    ///
    /// A `.env` file in the working directory is loaded first if present.
    pub fn from_config(config: &LlmConfig) -> crate::Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }

        match std::env::var(&config.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Self::new(key, config),
            _ => Err(InvexError::Config(format!(
                "{} is not set. Add it to the environment or a .env file.",
                config.api_key_env
            ))),
        }
    }

    /// Model identifier sent with each request.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Full URL of the chat-completion endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            temperature: TEMPERATURE,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        }
    }
}

impl fmt::Debug for GroqClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroqClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &"***")
            .finish()
    }
}

impl ChatModel for GroqClient {
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let start = Instant::now();
        info!("Sending {} char prompt to {}", prompt.len(), self.model);

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request(prompt))
            .send()
            .await?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let body = response.text().await?;

        if !status.is_success() {
            return Err(status_error(status.as_u16(), retry_after, &body));
        }

        let content = parse_content(&body)?;
        debug!(
            "Model replied with {} chars in {:?}",
            content.len(),
            start.elapsed()
        );
        Ok(content)
    }
}

/// Pull the first choice's message text out of a response body.
fn parse_content(body: &str) -> Result<String, LlmError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

    if let Some(usage) = &parsed.usage {
        debug!(
            "Token usage: {} prompt, {} completion",
            usage.prompt_tokens, usage.completion_tokens
        );
    }

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or(LlmError::EmptyResponse)
}

/// Map a non-success status to an error.
fn status_error(status: u16, retry_after_secs: Option<u64>, body: &str) -> LlmError {
    let message = error_message(body);
    match status {
        401 | 403 => LlmError::Auth { status, message },
        429 => LlmError::RateLimited { retry_after_secs },
        _ => LlmError::Api { status, message },
    }
}

/// `error.message` from an OpenAI-style error body, else the body itself.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.trim().to_string())
}
