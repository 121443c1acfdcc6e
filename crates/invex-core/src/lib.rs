//! Core library for AI invoice data extraction.
//!
//! This crate provides:
//! - PDF text extraction (page-ordered concatenation)
//! - The fixed extraction prompt and the hosted chat-completion client
//! - Best-effort parsing of the model's JSON answer, with code-fence handling
//! - The `process_invoice` pipeline producing a [`ProcessingResult`]

pub mod error;
pub mod invoice;
pub mod llm;
pub mod models;
pub mod pdf;

pub use error::{InvexError, LlmError, PdfError, Result};
pub use invoice::{InvoiceDataExtractor, InvoiceProcessor};
pub use llm::{ChatModel, GroqClient};
pub use models::config::InvexConfig;
pub use models::invoice::{
    ExtractionError, InvoiceRecord, LineItem, ProcessingResult, StructuredData, NOT_FOUND,
};
pub use pdf::{PdfExtractor, PdfProcessor, extract_text};
