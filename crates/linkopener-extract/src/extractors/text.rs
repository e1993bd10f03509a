//! Plain text

use std::path::Path;

use super::read_bytes;
use crate::registry::Extractor;
use crate::Result;

/// Reads the file verbatim; undecodable bytes become U+FFFD instead of failing
pub struct PlainTextExtractor;

impl Extractor for PlainTextExtractor {
    fn capability(&self) -> &'static str {
        "text"
    }

    fn extract(&self, path: &Path) -> Result<String> {
        let bytes = read_bytes(path)?;
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&bytes);
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}
