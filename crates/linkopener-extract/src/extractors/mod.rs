//! Format-specific extractors

mod delimited;
mod html;
mod legacy;
mod office;
mod opendocument;
mod pdf;
mod rtf;
mod spreadsheet;
mod text;
#[cfg(feature = "office")]
mod xml;

pub use delimited::DelimitedExtractor;
pub use html::HtmlExtractor;
pub use legacy::LegacyBinaryExtractor;
pub use office::{DocxExtractor, PptxExtractor, XlsxExtractor};
pub use opendocument::OpenDocumentExtractor;
pub use pdf::PdfExtractor;
pub use rtf::RtfExtractor;
pub use spreadsheet::SpreadsheetExtractor;
pub use text::PlainTextExtractor;

use std::path::Path;

use crate::error::ExtractError;
use crate::Result;

pub(crate) fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| ExtractError::extraction(path, e))
}

/// Error for an extractor whose feature was compiled out
#[allow(dead_code)]
pub(crate) fn missing(format: &str, capability: &'static str) -> ExtractError {
    ExtractError::MissingCapability {
        format: format.to_string(),
        capability,
    }
}

/// Join visible text and hyperlink targets into a single stream
pub(crate) fn join_text_and_links(text: String, links: Vec<String>) -> String {
    if links.is_empty() {
        return text;
    }

    let mut out = text;
    for link in links {
        out.push('\n');
        out.push_str(&link);
    }
    out
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::io::Write;
    use tempfile::NamedTempFile;

    pub fn file_with(suffix: &str, bytes: &[u8]) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    #[cfg(feature = "office")]
    pub fn zip_with(suffix: &str, entries: &[(&str, &str)]) -> NamedTempFile {
        use zip::write::SimpleFileOptions;

        let file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        let mut writer = zip::ZipWriter::new(file.reopen().unwrap());
        for (name, content) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
        file
    }
}
