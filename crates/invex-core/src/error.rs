//! Error types for the invex-core library.
//!
//! Only failures the caller has to handle live here. A model answer that is
//! not valid JSON is not an error: it becomes an
//! [`ExtractionError`](crate::models::invoice::ExtractionError) value inside the
//! result.

use thiserror::Error;

/// Main error type for the invex library.
#[derive(Error, Debug)]
pub enum InvexError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Hosted model error.
    #[error("model error: {0}")]
    Llm(#[from] LlmError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to read the PDF file.
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors from the hosted chat-completion endpoint.
#[derive(Error, Debug)]
pub enum LlmError {
    /// Transport failure (DNS, TLS, connection reset, timeout).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint rejected the credentials (401/403).
    #[error("authentication failed ({status}): {message}")]
    Auth { status: u16, message: String },

    /// The endpoint is rate limiting this key (429).
    #[error("rate limit exceeded{}", .retry_after_secs.map(|s| format!(", retry after {s}s")).unwrap_or_default())]
    RateLimited { retry_after_secs: Option<u64> },

    /// Any other non-success status.
    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The response body was not a chat-completion payload.
    #[error("invalid response body: {0}")]
    InvalidResponse(String),

    /// The response carried no choice with message content.
    #[error("response contained no message content")]
    EmptyResponse,
}

/// Result type for the invex library.
pub type Result<T> = std::result::Result<T, InvexError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_display() {
        let e = LlmError::RateLimited {
            retry_after_secs: Some(12),
        };
        assert_eq!(e.to_string(), "rate limit exceeded, retry after 12s");

        let e = LlmError::RateLimited {
            retry_after_secs: None,
        };
        assert_eq!(e.to_string(), "rate limit exceeded");
    }

    #[test]
    fn test_wrapped_display() {
        let e: InvexError = PdfError::NoPages.into();
        assert_eq!(e.to_string(), "PDF error: PDF has no pages");

        let e: InvexError = LlmError::Auth {
            status: 401,
            message: "invalid api key".to_string(),
        }
        .into();
        assert!(e.to_string().contains("invalid api key"));
    }
}
