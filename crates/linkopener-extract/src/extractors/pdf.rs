//! PDF: page text plus the URIs of link annotations

use std::path::Path;

use crate::registry::Extractor;
use crate::Result;

pub struct PdfExtractor;

impl Extractor for PdfExtractor {
    fn capability(&self) -> &'static str {
        "pdf"
    }

    fn is_available(&self) -> bool {
        cfg!(feature = "pdf")
    }

    fn extract(&self, path: &Path) -> Result<String> {
        #[cfg(feature = "pdf")]
        {
            imp::extract(path)
        }
        #[cfg(not(feature = "pdf"))]
        {
            let _ = path;
            Err(super::missing("pdf", "pdf"))
        }
    }
}

#[cfg(feature = "pdf")]
mod imp {
    use std::path::Path;

    use lopdf::{Dictionary, Document, Object, ObjectId};

    use crate::error::ExtractError;
    use crate::extractors::join_text_and_links;
    use crate::Result;

    pub(super) fn extract(path: &Path) -> Result<String> {
        let doc = Document::load(path).map_err(|e| ExtractError::extraction(path, e))?;
        let pages = doc.get_pages();

        let mut text = String::new();
        let mut links = Vec::new();

        for (number, page_id) in pages {
            // A page whose content stream cannot be decoded still has annotations
            match doc.extract_text(&[number]) {
                Ok(page_text) => {
                    text.push_str(&page_text);
                    if !page_text.ends_with('\n') {
                        text.push('\n');
                    }
                }
                Err(e) => {
                    tracing::warn!(page = number, error = %e, "Skipping unreadable PDF page text");
                }
            }

            links.extend(page_link_uris(&doc, page_id));
        }

        tracing::debug!(hyperlinks = links.len(), "Walked pdf");

        Ok(join_text_and_links(text, links))
    }

    fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Object> {
        match object {
            Object::Reference(id) => doc.get_object(*id).ok(),
            other => Some(other),
        }
    }

    fn resolve_dict<'a>(doc: &'a Document, object: &'a Object) -> Option<&'a Dictionary> {
        resolve(doc, object).and_then(|o| o.as_dict().ok())
    }

    /// `/URI` of every `/Link` annotation carrying a URI action
    fn page_link_uris(doc: &Document, page_id: ObjectId) -> Vec<String> {
        let Ok(page) = doc.get_dictionary(page_id) else {
            return Vec::new();
        };
        let Some(annots) = page
            .get(b"Annots")
            .ok()
            .and_then(|a| resolve(doc, a))
            .and_then(|a| a.as_array().ok())
        else {
            return Vec::new();
        };

        annots
            .iter()
            .filter_map(|annot| resolve_dict(doc, annot))
            .filter(|annot| {
                matches!(annot.get(b"Subtype").and_then(Object::as_name), Ok(b"Link"))
            })
            .filter_map(|annot| annot.get(b"A").ok().and_then(|a| resolve_dict(doc, a)))
            .filter(|action| matches!(action.get(b"S").and_then(Object::as_name), Ok(b"URI")))
            .filter_map(|action| match action.get(b"URI").ok().and_then(|u| resolve(doc, u)) {
                Some(Object::String(bytes, _)) => Some(String::from_utf8_lossy(bytes).into_owned()),
                _ => None,
            })
            .collect()
    }
}
