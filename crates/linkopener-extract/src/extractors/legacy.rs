//! Legacy binary office documents (.doc, .ppt)
//!
//! No structural parser: the raw bytes are decoded best-effort. Printable ASCII
//! survives, NUL bytes are dropped so UTF-16LE text reassembles into readable
//! runs, and every other byte becomes a space. Text stored compressed or in
//! non-ASCII scripts is lost.
//!
//! The container also carries OLE metadata that reads like a host name
//! (`Normal.dotm`, `Word.Document.8`). Those tokens are dropped so a document
//! with no links yields none; a real link that happens to end in a template
//! extension is lost with them.

use std::path::Path;

use super::read_bytes;
use crate::registry::Extractor;
use crate::Result;

pub struct LegacyBinaryExtractor;

impl Extractor for LegacyBinaryExtractor {
    fn capability(&self) -> &'static str {
        "legacy"
    }

    fn extract(&self, path: &Path) -> Result<String> {
        let bytes = read_bytes(path)?;
        Ok(strip_ole_metadata(&printable_text(&bytes)))
    }
}

/// ProgIDs written into the CompObj stream
const OLE_PROG_IDS: &[&str] = &[
    "word.document",
    "word.picture",
    "powerpoint.show",
    "powerpoint.slide",
    "excel.sheet",
    "excel.chart",
    "msgraph.chart",
    "equation.",
];

/// Template file names (`Normal.dotm`, `Blank.potx`)
const TEMPLATE_EXTENSIONS: &[&str] = &[".dot", ".dotm", ".dotx", ".pot", ".potm", ".potx", ".thmx"];

fn is_ole_metadata(token: &str) -> bool {
    let lower = token.to_ascii_lowercase();
    if lower.contains('/') {
        return false;
    }
    OLE_PROG_IDS.iter().any(|id| lower.starts_with(id))
        || TEMPLATE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

fn strip_ole_metadata(text: &str) -> String {
    text.split_inclusive(char::is_whitespace)
        .filter(|token| !is_ole_metadata(token.trim_end()))
        .collect()
}

pub(crate) fn printable_text(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() / 2);
    let mut last_was_space = false;

    for &byte in bytes {
        let ch = match byte {
            0 => continue,
            b'\n' | b'\r' | b'\t' | 0x20..=0x7E => byte as char,
            _ => ' ',
        };

        let is_space = ch == ' ';
        if is_space && last_was_space {
            continue;
        }
        last_was_space = is_space;
        out.push(ch);
    }

    out
}
