//! Delimited text (.csv, .tsv)

use std::path::Path;

use crate::registry::Extractor;
use crate::Result;

/// Reads records with a fixed delimiter; every non-empty field becomes one line.
#[derive(Debug, Clone, Copy)]
pub struct DelimitedExtractor {
    delimiter: u8,
}

impl DelimitedExtractor {
    pub fn comma() -> Self {
        Self { delimiter: b',' }
    }

    pub fn tab() -> Self {
        Self { delimiter: b'\t' }
    }
}

impl Extractor for DelimitedExtractor {
    fn capability(&self) -> &'static str {
        "delimited"
    }

    fn is_available(&self) -> bool {
        cfg!(feature = "delimited")
    }

    fn extract(&self, path: &Path) -> Result<String> {
        #[cfg(feature = "delimited")]
        {
            self.fields_text(path)
        }
        #[cfg(not(feature = "delimited"))]
        {
            let _ = path;
            Err(super::missing("delimited", "delimited"))
        }
    }
}

#[cfg(feature = "delimited")]
impl DelimitedExtractor {
    fn fields_text(&self, path: &Path) -> Result<String> {
        use crate::encoding::decode_with_fallback;
        use crate::error::ExtractError;

        let bytes = super::read_bytes(path)?;
        let (text, encoding) = decode_with_fallback(&bytes);
        tracing::debug!(encoding = encoding.as_str(), "Decoded delimited text");

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut out = String::new();
        for record in reader.records() {
            let record = record.map_err(|e| ExtractError::extraction(path, e))?;
            for field in record.iter().map(str::trim).filter(|f| !f.is_empty()) {
                out.push_str(field);
                out.push('\n');
            }
        }

        Ok(out)
    }
}
