//! Document format tags
//!
//! The dispatch key is the lower-cased file extension.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ExtractError;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// Plain text, read verbatim
    PlainText,
    /// Word-processor XML zip
    Docx,
    /// Spreadsheet XML zip
    Xlsx,
    /// Presentation XML zip
    Pptx,
    /// Legacy binary word-processor document
    Doc,
    /// Legacy binary presentation
    Ppt,
    /// Legacy binary spreadsheet
    Xls,
    Pdf,
    Csv,
    Tsv,
    Rtf,
    /// OpenDocument text
    Odt,
    /// OpenDocument spreadsheet
    Ods,
    /// OpenDocument presentation
    Odp,
    Html,
}

impl DocumentFormat {
    pub const ALL: [DocumentFormat; 15] = [
        DocumentFormat::PlainText,
        DocumentFormat::Docx,
        DocumentFormat::Xlsx,
        DocumentFormat::Pptx,
        DocumentFormat::Doc,
        DocumentFormat::Ppt,
        DocumentFormat::Xls,
        DocumentFormat::Pdf,
        DocumentFormat::Csv,
        DocumentFormat::Tsv,
        DocumentFormat::Rtf,
        DocumentFormat::Odt,
        DocumentFormat::Ods,
        DocumentFormat::Odp,
        DocumentFormat::Html,
    ];

    /// Resolve the format of a file from its extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .ok_or_else(|| ExtractError::UnsupportedFormat(path.display().to_string()))?;

        Self::from_extension(&ext).ok_or(ExtractError::UnsupportedFormat(ext))
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.').to_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.extensions().contains(&ext.as_str()))
    }

    /// File extensions handled by this format
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            DocumentFormat::PlainText => &["txt", "text", "log", "md"],
            DocumentFormat::Docx => &["docx"],
            DocumentFormat::Xlsx => &["xlsx"],
            DocumentFormat::Pptx => &["pptx"],
            DocumentFormat::Doc => &["doc"],
            DocumentFormat::Ppt => &["ppt"],
            DocumentFormat::Xls => &["xls"],
            DocumentFormat::Pdf => &["pdf"],
            DocumentFormat::Csv => &["csv"],
            DocumentFormat::Tsv => &["tsv"],
            DocumentFormat::Rtf => &["rtf"],
            DocumentFormat::Odt => &["odt"],
            DocumentFormat::Ods => &["ods"],
            DocumentFormat::Odp => &["odp"],
            DocumentFormat::Html => &["html", "htm"],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentFormat::PlainText => "text",
            DocumentFormat::Docx => "docx",
            DocumentFormat::Xlsx => "xlsx",
            DocumentFormat::Pptx => "pptx",
            DocumentFormat::Doc => "doc",
            DocumentFormat::Ppt => "ppt",
            DocumentFormat::Xls => "xls",
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Csv => "csv",
            DocumentFormat::Tsv => "tsv",
            DocumentFormat::Rtf => "rtf",
            DocumentFormat::Odt => "odt",
            DocumentFormat::Ods => "ods",
            DocumentFormat::Odp => "odp",
            DocumentFormat::Html => "html",
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DocumentFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == s)
            .or_else(|| Self::from_extension(&s))
            .ok_or_else(|| format!("Unknown document format: {}", s))
    }
}
