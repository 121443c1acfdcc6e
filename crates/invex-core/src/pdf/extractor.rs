//! PDF text extraction using lopdf and pdf-extract.

use lopdf::Document;
use tracing::{debug, trace, warn};

use super::{PdfProcessor, Result};
use crate::error::PdfError;
use crate::models::config::{PdfConfig, TextEngine};

/// PDF text extractor using lopdf.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
    config: PdfConfig,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self::with_config(PdfConfig::default())
    }

    /// Create an extractor with explicit settings.
    pub fn with_config(config: PdfConfig) -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
            config,
        }
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("No document loaded".to_string()))
    }

    /// Concatenate page texts in page order, without separators.
    fn extract_pages(&self, doc: &Document) -> String {
        let mut text = String::new();
        for (page_num, _) in doc.get_pages() {
            match doc.extract_text(&[page_num]) {
                Ok(page_text) => {
                    trace!("Page {}: {} chars", page_num, page_text.len());
                    text.push_str(&page_text);
                }
                Err(e) => {
                    // Pages without decodable text count as empty.
                    warn!("No text extracted from page {}: {}", page_num, e);
                }
            }
        }
        text
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        if doc.is_encrypted() {
            if !self.config.decrypt_empty_password || doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract needs the decrypted bytes
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_text(&self) -> Result<String> {
        let doc = self.document()?;

        let text = match self.config.text_engine {
            TextEngine::PerPage => self.extract_pages(doc),
            TextEngine::Layout => pdf_extract::extract_text_from_mem(&self.raw_data)
                .map_err(|e| PdfError::TextExtraction(e.to_string()))?,
        };

        debug!(
            "Extracted {} chars from {} pages ({:?})",
            text.len(),
            self.page_count(),
            self.config.text_engine
        );
        Ok(text)
    }

    fn extract_page_text(&self, page: u32) -> Result<String> {
        let doc = self.document()?;
        if !doc.get_pages().contains_key(&page) {
            return Err(PdfError::InvalidPage(page));
        }
        doc.extract_text(&[page])
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures::text_pdf;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pdf_extractor_new() {
        let extractor = PdfExtractor::new();
        assert!(extractor.document.is_none());
        assert_eq!(extractor.page_count(), 0);
        assert!(matches!(extractor.extract_text(), Err(PdfError::Parse(_))));
    }

    #[test]
    fn test_pages_concatenated_in_order() {
        let data = text_pdf(&["First page", "Second page", "Third page"]);
        let mut extractor = PdfExtractor::new();
        extractor.load(&data).unwrap();
        assert_eq!(extractor.page_count(), 3);

        let text = extractor.extract_text().unwrap();
        let expected: String = (1..=3)
            .map(|p| extractor.extract_page_text(p).unwrap())
            .collect();
        assert_eq!(text, expected);

        let first = text.find("First page").unwrap();
        let second = text.find("Second page").unwrap();
        let third = text.find("Third page").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn test_textless_page_contributes_nothing() {
        let data = text_pdf(&["Alpha", "", "Gamma"]);
        let mut extractor = PdfExtractor::new();
        extractor.load(&data).unwrap();

        assert_eq!(extractor.extract_page_text(2).unwrap().trim(), "");
        let text = extractor.extract_text().unwrap();
        assert!(text.contains("Alpha"));
        assert!(text.contains("Gamma"));
    }

    #[test]
    fn test_invalid_page() {
        let mut extractor = PdfExtractor::new();
        extractor.load(&text_pdf(&["Only page"])).unwrap();
        assert!(matches!(
            extractor.extract_page_text(5),
            Err(PdfError::InvalidPage(5))
        ));
    }

    #[test]
    fn test_no_pages() {
        let mut extractor = PdfExtractor::new();
        assert!(matches!(
            extractor.load(&text_pdf(&[])),
            Err(PdfError::NoPages)
        ));
    }

    #[test]
    fn test_garbage_input() {
        let mut extractor = PdfExtractor::new();
        assert!(matches!(
            extractor.load(b"%PDF-garbage"),
            Err(PdfError::Parse(_))
        ));
    }
}
