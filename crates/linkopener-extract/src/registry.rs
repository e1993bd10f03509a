//! Extractor registry
//!
//! Maps a [`DocumentFormat`] to the extractor responsible for it.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use crate::document::ExtractedDocument;
use crate::error::ExtractError;
use crate::extractors;
use crate::format::DocumentFormat;
use crate::Result;

/// Turns one document into plain text
pub trait Extractor: Send + Sync {
    /// Name of the capability (Cargo feature) backing this extractor
    fn capability(&self) -> &'static str;

    /// Whether the backing library is compiled in
    fn is_available(&self) -> bool {
        true
    }

    fn extract(&self, path: &Path) -> Result<String>;
}

#[derive(Clone, Default)]
pub struct ExtractorRegistry {
    extractors: HashMap<DocumentFormat, Arc<dyn Extractor>>,
}

impl ExtractorRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with an extractor for every known format
    pub fn with_defaults() -> Self {
        use extractors::*;

        let mut registry = Self::new();
        registry.register(DocumentFormat::PlainText, PlainTextExtractor);
        registry.register(DocumentFormat::Docx, DocxExtractor);
        registry.register(DocumentFormat::Xlsx, XlsxExtractor);
        registry.register(DocumentFormat::Pptx, PptxExtractor);
        registry.register(DocumentFormat::Doc, LegacyBinaryExtractor);
        registry.register(DocumentFormat::Ppt, LegacyBinaryExtractor);
        registry.register(DocumentFormat::Xls, SpreadsheetExtractor);
        registry.register(DocumentFormat::Pdf, PdfExtractor);
        registry.register(DocumentFormat::Csv, DelimitedExtractor::comma());
        registry.register(DocumentFormat::Tsv, DelimitedExtractor::tab());
        registry.register(DocumentFormat::Rtf, RtfExtractor);
        registry.register(DocumentFormat::Odt, OpenDocumentExtractor);
        registry.register(DocumentFormat::Ods, OpenDocumentExtractor);
        registry.register(DocumentFormat::Odp, OpenDocumentExtractor);
        registry.register(DocumentFormat::Html, HtmlExtractor);
        registry
    }

    pub fn register<E: Extractor + 'static>(&mut self, format: DocumentFormat, extractor: E) {
        self.extractors.insert(format, Arc::new(extractor));
    }

    /// Whether `format` has a usable extractor in this build
    pub fn supports(&self, format: DocumentFormat) -> bool {
        self.extractors
            .get(&format)
            .map(|e| e.is_available())
            .unwrap_or(false)
    }

    /// Extract the text of the document at `path`
    pub fn extract(&self, path: &Path) -> Result<ExtractedDocument> {
        let format = DocumentFormat::from_path(path)?;

        let extractor = self
            .extractors
            .get(&format)
            .ok_or_else(|| ExtractError::UnsupportedFormat(format.to_string()))?;

        if !extractor.is_available() {
            return Err(ExtractError::MissingCapability {
                format: format.to_string(),
                capability: extractor.capability(),
            });
        }

        let text = extractor.extract(path)?;

        tracing::info!(
            path = %path.display(),
            format = %format,
            chars = text.len(),
            "Extracted document text"
        );

        Ok(ExtractedDocument::new(path.to_path_buf(), format, text))
    }
}
