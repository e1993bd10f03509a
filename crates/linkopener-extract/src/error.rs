//! Extraction error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    /// No extractor is registered for the file extension
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The extractor exists but its backing library is not compiled in
    #[error("Missing capability: {format} documents need the `{capability}` feature")]
    MissingCapability {
        format: String,
        capability: &'static str,
    },

    /// The document exists but could not be read or parsed
    #[error("Extraction failed for {path}: {reason}")]
    Extraction { path: String, reason: String },
}

impl ExtractError {
    pub(crate) fn extraction(path: &std::path::Path, reason: impl ToString) -> Self {
        ExtractError::Extraction {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}
