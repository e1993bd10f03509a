//! HTML: visible body text plus every anchor target

use std::path::Path;

use crate::registry::Extractor;
use crate::Result;

pub struct HtmlExtractor;

impl Extractor for HtmlExtractor {
    fn capability(&self) -> &'static str {
        "html"
    }

    fn is_available(&self) -> bool {
        cfg!(feature = "html")
    }

    fn extract(&self, path: &Path) -> Result<String> {
        #[cfg(feature = "html")]
        {
            let bytes = super::read_bytes(path)?;
            let (source, _) = crate::encoding::decode_with_fallback(&bytes);
            Ok(page_text(&source))
        }
        #[cfg(not(feature = "html"))]
        {
            let _ = path;
            Err(super::missing("html", "html"))
        }
    }
}

#[cfg(feature = "html")]
fn page_text(source: &str) -> String {
    use scraper::{Html, Selector};

    let doc = Html::parse_document(source);
    let mut text = String::new();

    if let Ok(body_sel) = Selector::parse("body") {
        for body in doc.select(&body_sel) {
            for node in body.descendants() {
                let Some(piece) = node.value().as_text() else {
                    continue;
                };
                let hidden = node
                    .parent()
                    .and_then(|p| p.value().as_element().map(|e| e.name()))
                    .map(|name| matches!(name, "script" | "style" | "noscript" | "template"))
                    .unwrap_or(false);
                let piece = piece.trim();
                if hidden || piece.is_empty() {
                    continue;
                }
                text.push_str(piece);
                text.push('\n');
            }
        }
    }

    let mut links = Vec::new();
    if let Ok(anchor_sel) = Selector::parse("a[href]") {
        for anchor in doc.select(&anchor_sel) {
            if let Some(href) = anchor.value().attr("href").map(str::trim) {
                if !href.is_empty() {
                    links.push(href.to_string());
                }
            }
        }
    }

    super::join_text_and_links(text, links)
}

#[cfg(all(test, feature = "html"))]
mod tests {
    use super::*;
    use crate::extractors::fixtures::file_with;

    #[test]
    fn test_body_text_and_anchor_targets() {
        let html = r#"<!doctype html><html><head><title>ignored</title>
            <style>.x { background: url(http://style.example.com/bg.png) }</style></head>
            <body><h1>Links</h1><p>Plain www.example.org mention</p>
            <a href="https://anchor.example.com/a?b=1&amp;c=2">anchor text</a>
            <script>var u = "https://script.example.com";</script></body></html>"#;

        let text = page_text(html);
        assert_eq!(
            text,
            "Links\nPlain www.example.org mention\nanchor text\n\nhttps://anchor.example.com/a?b=1&c=2"
        );
    }

    #[test]
    fn test_extract_from_file() {
        let file = file_with(".htm", b"<p>nothing to see</p>");
        assert_eq!(HtmlExtractor.extract(file.path()).unwrap(), "nothing to see\n");
    }
}
