//! Hosted chat-completion model.
//!
//! The pipeline only needs "one prompt in, one text out". [`ChatModel`] is
//! that seam; [`GroqClient`] implements it against an OpenAI-compatible
//! `/chat/completions` endpoint.

mod groq;

pub use groq::GroqClient;

use std::future::Future;

use crate::error::LlmError;

/// Sampling temperature used for every extraction request.
pub const TEMPERATURE: f32 = 0.0;

/// A chat-completion model answering a single prompt.
pub trait ChatModel {
    /// Send `prompt` as one user message and return the reply text.
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String, LlmError>> + Send;
}
