//! LinkOpener Document Extraction
//!
//! Maps a file's format to a format-specific extractor that flattens the document
//! into one text blob: visible text plus any hyperlink targets stored as structured
//! metadata, so link discovery sees both.
//!
//! Optional format libraries sit behind Cargo features. An extractor whose feature
//! is compiled out reports [`ExtractError::MissingCapability`] rather than failing
//! as if the file were corrupt.

mod document;
mod encoding;
mod error;
pub mod extractors;
mod format;
mod registry;

pub use document::ExtractedDocument;
pub use encoding::{decode_with_fallback, TextEncoding};
pub use error::ExtractError;
pub use format::DocumentFormat;
pub use registry::{Extractor, ExtractorRegistry};

pub type Result<T> = std::result::Result<T, ExtractError>;
