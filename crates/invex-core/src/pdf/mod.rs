//! PDF processing module.

mod extractor;
#[cfg(test)]
pub(crate) mod fixtures;

pub use extractor::PdfExtractor;

use std::path::Path;

use crate::error::PdfError;
use crate::models::config::PdfConfig;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract text from the entire PDF.
    fn extract_text(&self) -> Result<String>;

    /// Extract text from a specific page (1-indexed).
    fn extract_page_text(&self, page: u32) -> Result<String>;
}

/// Extract the text of every page of the PDF at `path`, in page order.
pub fn extract_text(path: &Path) -> Result<String> {
    extract_text_with(path, &PdfConfig::default())
}

/// Same as [`extract_text`], with explicit PDF settings.
pub fn extract_text_with(path: &Path, config: &PdfConfig) -> Result<String> {
    let data = std::fs::read(path).map_err(|source| PdfError::Read {
        path: path.display().to_string(),
        source,
    })?;
    extract_text_from_mem(&data, config)
}

/// Extract the text of an in-memory PDF.
pub fn extract_text_from_mem(data: &[u8], config: &PdfConfig) -> Result<String> {
    let mut extractor = PdfExtractor::with_config(config.clone());
    extractor.load(data)?;
    extractor.extract_text()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file() {
        let err = extract_text(Path::new("/nonexistent/invoice.pdf")).unwrap_err();
        assert!(matches!(err, PdfError::Read { .. }));
        assert!(err.to_string().contains("/nonexistent/invoice.pdf"));
    }

    #[test]
    fn test_not_a_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoice.pdf");
        std::fs::write(&path, b"this is plain text").unwrap();

        let err = extract_text(&path).unwrap_err();
        assert!(matches!(err, PdfError::Parse(_)));
    }

    #[test]
    fn test_extract_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoice.pdf");
        std::fs::write(&path, fixtures::text_pdf(&["Invoice #123"])).unwrap();

        let text = extract_text(&path).unwrap();
        assert!(text.contains("Invoice #123"), "got: {text:?}");
    }
}
