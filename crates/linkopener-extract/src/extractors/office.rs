//! Zip-based XML office formats (.docx, .pptx, .xlsx)
//!
//! Visible text is walked in document order (paragraphs, slides, cells); hyperlink
//! targets live in the `_rels` parts and are appended after the text.

use std::path::Path;

use crate::registry::Extractor;
use crate::Result;

pub struct DocxExtractor;

pub struct PptxExtractor;

/// Cell walk via the spreadsheet backend plus hyperlink relationships
pub struct XlsxExtractor;

impl Extractor for DocxExtractor {
    fn capability(&self) -> &'static str {
        "office"
    }

    fn is_available(&self) -> bool {
        cfg!(feature = "office")
    }

    fn extract(&self, path: &Path) -> Result<String> {
        #[cfg(feature = "office")]
        {
            imp::docx(path)
        }
        #[cfg(not(feature = "office"))]
        {
            let _ = path;
            Err(super::missing("docx", "office"))
        }
    }
}

impl Extractor for PptxExtractor {
    fn capability(&self) -> &'static str {
        "office"
    }

    fn is_available(&self) -> bool {
        cfg!(feature = "office")
    }

    fn extract(&self, path: &Path) -> Result<String> {
        #[cfg(feature = "office")]
        {
            imp::pptx(path)
        }
        #[cfg(not(feature = "office"))]
        {
            let _ = path;
            Err(super::missing("pptx", "office"))
        }
    }
}

impl Extractor for XlsxExtractor {
    fn capability(&self) -> &'static str {
        "spreadsheet"
    }

    fn is_available(&self) -> bool {
        cfg!(feature = "spreadsheet")
    }

    fn extract(&self, path: &Path) -> Result<String> {
        #[cfg(feature = "spreadsheet")]
        {
            let text = super::spreadsheet::workbook_text(path)?;

            #[cfg(feature = "office")]
            let links = imp::xlsx_hyperlinks(path)?;
            #[cfg(not(feature = "office"))]
            let links = Vec::new();

            Ok(super::join_text_and_links(text, links))
        }
        #[cfg(not(feature = "spreadsheet"))]
        {
            let _ = path;
            Err(super::missing("xlsx", "spreadsheet"))
        }
    }
}

#[cfg(feature = "office")]
mod imp {
    use std::fs::File;
    use std::io::BufReader;
    use std::path::Path;

    use zip::ZipArchive;

    use crate::error::ExtractError;
    use crate::extractors::join_text_and_links;
    use crate::extractors::xml::{
        flatten, hyperlink_targets, numbered_entries, read_entry, TextLayout,
    };
    use crate::Result;

    /// WordprocessingML: `w:t` runs (and `w:instrText` field codes) inside `w:p`
    const WORD: TextLayout = TextLayout {
        text: Some(&[b"t", b"instrText"]),
        lines: &[b"p"],
        cells: &[b"tc"],
        breaks: &[b"br", b"cr"],
        tabs: &[b"tab"],
        spaces: &[],
    };

    /// DrawingML text bodies inside slides
    const SLIDE: TextLayout = TextLayout {
        text: Some(&[b"t"]),
        lines: &[b"p"],
        cells: &[b"tc"],
        breaks: &[b"br"],
        tabs: &[b"tab"],
        spaces: &[],
    };

    type Archive = ZipArchive<BufReader<File>>;

    fn open(path: &Path) -> Result<Archive> {
        let file = File::open(path).map_err(|e| ExtractError::extraction(path, e))?;
        ZipArchive::new(BufReader::new(file)).map_err(|e| ExtractError::extraction(path, e))
    }

    fn part(archive: &mut Archive, path: &Path, name: &str) -> Result<Option<String>> {
        read_entry(archive, name).map_err(|e| ExtractError::extraction(path, e))
    }

    fn flatten_part(path: &Path, name: &str, xml: &str, layout: &TextLayout) -> Result<String> {
        flatten(xml, layout)
            .map_err(|e| ExtractError::extraction(path, format!("{}: {}", name, e)))
    }

    fn rels_targets(archive: &mut Archive, path: &Path, names: &[String]) -> Result<Vec<String>> {
        let mut targets = Vec::new();
        for name in names {
            if let Some(xml) = part(archive, path, name)? {
                let found = hyperlink_targets(&xml)
                    .map_err(|e| ExtractError::extraction(path, format!("{}: {}", name, e)))?;
                targets.extend(found);
            }
        }
        Ok(targets)
    }

    fn rels_entries(archive: &Archive, dir: &str) -> Vec<String> {
        let mut names: Vec<String> = archive
            .file_names()
            .filter(|name| name.starts_with(dir) && name.ends_with(".rels"))
            .map(str::to_string)
            .collect();
        names.sort();
        names
    }

    pub(super) fn docx(path: &Path) -> Result<String> {
        let mut archive = open(path)?;

        let body = part(&mut archive, path, "word/document.xml")?
            .ok_or_else(|| ExtractError::extraction(path, "missing word/document.xml"))?;

        let mut parts = vec![("word/document.xml".to_string(), body)];
        let mut extra = numbered_entries(&archive, "word/header", ".xml");
        extra.extend(numbered_entries(&archive, "word/footer", ".xml"));
        extra.push("word/footnotes.xml".to_string());
        extra.push("word/endnotes.xml".to_string());
        for name in extra {
            if let Some(xml) = part(&mut archive, path, &name)? {
                parts.push((name, xml));
            }
        }

        let mut text = String::new();
        for (name, xml) in &parts {
            text.push_str(&flatten_part(path, name, xml, &WORD)?);
        }

        let rels = rels_entries(&archive, "word/_rels/");
        let links = rels_targets(&mut archive, path, &rels)?;

        tracing::debug!(parts = parts.len(), hyperlinks = links.len(), "Walked docx");

        Ok(join_text_and_links(text, links))
    }

    pub(super) fn pptx(path: &Path) -> Result<String> {
        let mut archive = open(path)?;

        let slides = numbered_entries(&archive, "ppt/slides/slide", ".xml");
        if slides.is_empty() && archive.index_for_name("ppt/presentation.xml").is_none() {
            return Err(ExtractError::extraction(path, "missing ppt/presentation.xml"));
        }
        let notes = numbered_entries(&archive, "ppt/notesSlides/notesSlide", ".xml");

        let mut text = String::new();
        for name in slides.iter().chain(notes.iter()) {
            if let Some(xml) = part(&mut archive, path, name)? {
                text.push_str(&flatten_part(path, name, &xml, &SLIDE)?);
                text.push('\n');
            }
        }

        let rels: Vec<String> = slides
            .iter()
            .map(|name| {
                let file = name.trim_start_matches("ppt/slides/");
                format!("ppt/slides/_rels/{}.rels", file)
            })
            .collect();
        let links = rels_targets(&mut archive, path, &rels)?;

        tracing::debug!(slides = slides.len(), hyperlinks = links.len(), "Walked pptx");

        Ok(join_text_and_links(text, links))
    }

    pub(super) fn xlsx_hyperlinks(path: &Path) -> Result<Vec<String>> {
        let mut archive = open(path)?;
        let rels = rels_entries(&archive, "xl/worksheets/_rels/");
        rels_targets(&mut archive, path, &rels)
    }
}
