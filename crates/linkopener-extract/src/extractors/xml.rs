//! XML walking shared by the zip-based formats

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use std::io::{Read, Seek};

/// How to flatten one XML vocabulary into text. Element names are local names.
pub(crate) struct TextLayout {
    /// Elements whose character data is visible text; `None` keeps all character data
    pub text: Option<&'static [&'static [u8]]>,
    /// Elements whose end starts a new line
    pub lines: &'static [&'static [u8]],
    /// Elements whose end inserts a tab
    pub cells: &'static [&'static [u8]],
    /// Empty elements standing for a line break
    pub breaks: &'static [&'static [u8]],
    /// Empty elements standing for a tab
    pub tabs: &'static [&'static [u8]],
    /// Empty elements standing for a space
    pub spaces: &'static [&'static [u8]],
}

impl TextLayout {
    fn is_text(&self, name: &[u8]) -> bool {
        self.text.map(|names| names.contains(&name)).unwrap_or(false)
    }
}

/// Flatten an XML part into text following `layout`
pub(crate) fn flatten(xml: &str, layout: &TextLayout) -> Result<String, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut text_depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if layout.is_text(e.local_name().as_ref()) {
                    text_depth += 1;
                }
            }
            Event::End(e) => {
                let name = e.local_name();
                let name = name.as_ref();
                if layout.is_text(name) {
                    text_depth = text_depth.saturating_sub(1);
                }
                if layout.lines.contains(&name) {
                    out.push('\n');
                } else if layout.cells.contains(&name) {
                    out.push('\t');
                }
            }
            Event::Empty(e) => {
                let name = e.local_name();
                let name = name.as_ref();
                if layout.breaks.contains(&name) || layout.lines.contains(&name) {
                    out.push('\n');
                } else if layout.tabs.contains(&name) || layout.cells.contains(&name) {
                    out.push('\t');
                } else if layout.spaces.contains(&name) {
                    out.push(' ');
                }
            }
            Event::Text(t) => {
                if layout.text.is_none() || text_depth > 0 {
                    out.push_str(&t.unescape()?);
                }
            }
            Event::CData(c) => {
                if layout.text.is_none() || text_depth > 0 {
                    out.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(out)
}

/// External hyperlink targets listed in an OOXML relationships part
pub(crate) fn hyperlink_targets(rels_xml: &str) -> Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(rels_xml);
    let mut targets = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                if let Some(target) = external_hyperlink(&e)? {
                    targets.push(target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(targets)
}

fn external_hyperlink(e: &BytesStart<'_>) -> Result<Option<String>, quick_xml::Error> {
    let mut is_hyperlink = false;
    let mut is_external = false;
    let mut target = None;

    for attr in e.attributes().flatten() {
        let value = attr.unescape_value()?;
        match attr.key.local_name().as_ref() {
            b"Type" => is_hyperlink = value.ends_with("/hyperlink"),
            b"TargetMode" => is_external = value.eq_ignore_ascii_case("External"),
            b"Target" => target = Some(value.into_owned()),
            _ => {}
        }
    }

    Ok(target.filter(|_| is_hyperlink && is_external))
}

/// Largest archive member we are willing to inflate
const MAX_ENTRY_BYTES: u64 = 256 * 1024 * 1024;

/// Read one archive member as UTF-8 text; `None` if the member does not exist
pub(crate) fn read_entry<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
    name: &str,
) -> Result<Option<String>, String> {
    read_entry_limited(archive, name, MAX_ENTRY_BYTES)
}

// The size in the zip header is untrusted, so nothing is preallocated from it
fn read_entry_limited<R: Read + Seek>(
    archive: &mut zip::ZipArchive<R>,
    name: &str,
    limit: u64,
) -> Result<Option<String>, String> {
    let entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.to_string()),
    };

    let mut bytes = Vec::new();
    entry
        .take(limit + 1)
        .read_to_end(&mut bytes)
        .map_err(|e| e.to_string())?;
    if bytes.len() as u64 > limit {
        return Err(format!("{} is larger than {} bytes", name, limit));
    }
    Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
}

/// Archive member names matching `prefix*suffix`, ordered by the number embedded in
/// the name (`slide2.xml` before `slide10.xml`)
pub(crate) fn numbered_entries<R: Read + Seek>(
    archive: &zip::ZipArchive<R>,
    prefix: &str,
    suffix: &str,
) -> Vec<String> {
    let mut names: Vec<(u32, String)> = archive
        .file_names()
        .filter(|name| name.len() >= prefix.len() + suffix.len())
        .filter(|name| name.starts_with(prefix) && name.ends_with(suffix))
        .filter(|name| !name[prefix.len()..].contains('/'))
        .map(|name| {
            let number = name[prefix.len()..name.len() - suffix.len()]
                .chars()
                .filter(char::is_ascii_digit)
                .collect::<String>()
                .parse()
                .unwrap_or(0);
            (number, name.to_string())
        })
        .collect();

    names.sort();
    names.into_iter().map(|(_, name)| name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::fixtures;

    const PARAGRAPHS: TextLayout = TextLayout {
        text: Some(&[b"t"]),
        lines: &[b"p"],
        cells: &[],
        breaks: &[b"br"],
        tabs: &[b"tab"],
        spaces: &[],
    };

    #[test]
    fn test_flatten_keeps_only_text_elements() {
        let xml = r#"<w:document xmlns:w="x"><w:body>
            <w:p><w:r><w:t>Hello</w:t></w:r><w:r><w:tab/><w:t xml:space="preserve"> world &amp; co</w:t></w:r></w:p>
            <w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:t>line</w:t><w:br/><w:t>two</w:t></w:r></w:p>
        </w:body></w:document>"#;

        let text = flatten(xml, &PARAGRAPHS).unwrap();
        assert_eq!(text, "Hello\t world & co\nline\ntwo\n");
    }

    #[test]
    fn test_hyperlink_targets_only_external_hyperlinks() {
        let rels = r##"<?xml version="1.0"?>
            <Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
              <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
              <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/a?x=1&amp;y=2" TargetMode="External"/>
              <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="#bookmark"/>
            </Relationships>"##;

        let targets = hyperlink_targets(rels).unwrap();
        assert_eq!(targets, vec!["https://example.com/a?x=1&y=2"]);
    }

    #[test]
    fn test_oversized_entry_is_an_error() {
        let file = fixtures::zip_with(".docx", &[("word/document.xml", "0123456789abcdef")]);
        let mut archive = zip::ZipArchive::new(file.reopen().unwrap()).unwrap();

        let err = read_entry_limited(&mut archive, "word/document.xml", 8).unwrap_err();
        assert!(err.contains("word/document.xml"));

        let text = read_entry_limited(&mut archive, "word/document.xml", 16).unwrap();
        assert_eq!(text.as_deref(), Some("0123456789abcdef"));
        assert_eq!(read_entry(&mut archive, "word/missing.xml").unwrap(), None);
    }

    #[test]
    fn test_forged_entry_size_does_not_allocate_it() {
        let file = fixtures::zip_with(".docx", &[("word/document.xml", "<w:t>hello</w:t>")]);
        let mut bytes = std::fs::read(file.path()).unwrap();

        // Claim a ~4 GiB uncompressed size in the central directory
        let central = bytes
            .windows(4)
            .position(|w| w == b"PK\x01\x02")
            .unwrap();
        bytes[central + 24..central + 28].copy_from_slice(&0xF000_0000u32.to_le_bytes());

        let Ok(mut archive) = zip::ZipArchive::new(std::io::Cursor::new(bytes)) else {
            return;
        };
        if let Ok(Some(text)) = read_entry(&mut archive, "word/document.xml") {
            assert!(text.contains("hello"));
        }
    }
}
