//! OpenDocument (.odt, .ods, .odp): `content.xml` inside a zip container

use std::path::Path;

use crate::registry::Extractor;
use crate::Result;

pub struct OpenDocumentExtractor;

impl Extractor for OpenDocumentExtractor {
    fn capability(&self) -> &'static str {
        "office"
    }

    fn is_available(&self) -> bool {
        cfg!(feature = "office")
    }

    fn extract(&self, path: &Path) -> Result<String> {
        #[cfg(feature = "office")]
        {
            imp::content_text(path)
        }
        #[cfg(not(feature = "office"))]
        {
            let _ = path;
            Err(super::missing("opendocument", "office"))
        }
    }
}

#[cfg(feature = "office")]
mod imp {
    use std::fs::File;
    use std::io::BufReader;
    use std::path::Path;

    use quick_xml::events::Event;
    use quick_xml::reader::Reader;
    use zip::ZipArchive;

    use crate::error::ExtractError;
    use crate::extractors::join_text_and_links;
    use crate::extractors::xml::{flatten, read_entry, TextLayout};
    use crate::Result;

    const CONTENT: TextLayout = TextLayout {
        text: None,
        lines: &[b"p", b"h", b"table-row"],
        cells: &[b"table-cell"],
        breaks: &[b"line-break"],
        tabs: &[b"tab"],
        spaces: &[b"s"],
    };

    pub(super) fn content_text(path: &Path) -> Result<String> {
        let file = File::open(path).map_err(|e| ExtractError::extraction(path, e))?;
        let mut archive =
            ZipArchive::new(BufReader::new(file)).map_err(|e| ExtractError::extraction(path, e))?;

        let xml = read_entry(&mut archive, "content.xml")
            .map_err(|e| ExtractError::extraction(path, e))?
            .ok_or_else(|| ExtractError::extraction(path, "missing content.xml"))?;

        let text = flatten(&xml, &CONTENT).map_err(|e| ExtractError::extraction(path, e))?;
        let links = anchor_targets(&xml).map_err(|e| ExtractError::extraction(path, e))?;

        Ok(join_text_and_links(text, links))
    }

    /// `xlink:href` of every `text:a` / `draw:a` anchor
    fn anchor_targets(xml: &str) -> std::result::Result<Vec<String>, quick_xml::Error> {
        let mut reader = Reader::from_str(xml);
        let mut targets = Vec::new();

        loop {
            match reader.read_event()? {
                Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"a" => {
                    for attr in e.attributes().flatten() {
                        if attr.key.local_name().as_ref() == b"href" {
                            targets.push(attr.unescape_value()?.into_owned());
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(targets)
    }
}
