//! Full pipeline: PDF -> text -> structured data.

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info};

use super::extractor::InvoiceDataExtractor;
use crate::error::Result;
use crate::llm::{ChatModel, GroqClient};
use crate::models::config::{InvexConfig, PdfConfig};
use crate::models::invoice::{ProcessingResult, StructuredData};
use crate::pdf::extract_text_with;

/// Runs text extraction and model extraction for one invoice.
pub struct InvoiceProcessor<M> {
    extractor: InvoiceDataExtractor<M>,
    pdf: PdfConfig,
}

impl InvoiceProcessor<GroqClient> {
    /// Build a processor backed by the hosted model.
    ///
    /// Fails up front when the API key is missing, before any invoice is read.
    pub fn from_config(config: &InvexConfig) -> Result<Self> {
        let client = GroqClient::from_config(&config.llm)?;
        info!("Using model {} at {}", client.model(), client.endpoint());
        Ok(Self::with_config(client, config))
    }
}

impl<M: ChatModel> InvoiceProcessor<M> {
    /// Create a processor with default settings.
    pub fn new(model: M) -> Self {
        Self::with_config(model, &InvexConfig::default())
    }

    /// Create a processor with explicit PDF and parsing settings.
    pub fn with_config(model: M, config: &InvexConfig) -> Self {
        Self {
            extractor: InvoiceDataExtractor::new(model).with_config(config.extraction.clone()),
            pdf: config.pdf.clone(),
        }
    }

    /// The model-facing half of the pipeline.
    pub fn extractor(&self) -> &InvoiceDataExtractor<M> {
        &self.extractor
    }

    /// Extract the text of every page, in page order.
    pub fn extract_text_from_pdf(&self, path: &Path) -> Result<String> {
        Ok(extract_text_with(path, &self.pdf)?)
    }

    /// Ask the model for invoice fields in `invoice_text`.
    pub async fn extract_invoice_data(&self, invoice_text: &str) -> Result<StructuredData> {
        Ok(self.extractor.extract(invoice_text).await?)
    }

    /// Process the PDF at `path`.
    ///
    /// Document and model failures abort the run. A reply that is not valid
    /// JSON still yields a result, with the failure in `structured_data`.
    pub async fn process_invoice(&self, path: &Path) -> Result<ProcessingResult> {
        let start = Instant::now();
        info!("Processing invoice: {}", path.display());

        let extracted_text = self.extract_text_from_pdf(path)?;
        debug!("Extracted {} chars of invoice text", extracted_text.len());

        let structured_data = self.extract_invoice_data(&extracted_text).await?;

        info!("Invoice processed in {:?}", start.elapsed());
        Ok(ProcessingResult {
            extracted_text,
            structured_data,
        })
    }
}
