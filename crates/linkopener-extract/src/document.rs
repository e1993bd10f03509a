//! Extracted document

use std::path::{Path, PathBuf};

use crate::format::DocumentFormat;

/// Text flattened out of one document. Created once per load and never mutated.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    source_path: PathBuf,
    format: DocumentFormat,
    raw_text: String,
}

impl ExtractedDocument {
    pub fn new(source_path: PathBuf, format: DocumentFormat, raw_text: String) -> Self {
        Self {
            source_path,
            format,
            raw_text,
        }
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }
}
