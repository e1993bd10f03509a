//! Main coordinator state
//!
//! Holds the current link set and the browser session shared with the batch worker.

use parking_lot::{Mutex, MutexGuard};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use linkopener_batch::{BatchHandle, BatchOpener};
use linkopener_extract::ExtractorRegistry;
use linkopener_links::{is_valid_link, LinkNormalizer, LinkSet};
use linkopener_tabs::{
    ChromeDriverLauncher, CloseReport, DriverFactory, SessionState, TabHandle, TabSessionManager,
};

use crate::config::Config;
use crate::error::CoreError;
use crate::Result;

pub struct LinkOpener<F: DriverFactory = ChromeDriverLauncher> {
    config: Config,
    registry: ExtractorRegistry,
    normalizer: LinkNormalizer,
    /// Links of the last successfully loaded document
    links: LinkSet,
    source_path: Option<PathBuf>,
    tabs: Arc<Mutex<TabSessionManager<F>>>,
    batch: BatchOpener<F>,
}

impl LinkOpener<ChromeDriverLauncher> {
    /// A coordinator driving Chrome through the configured chromedriver
    pub fn new(config: Config) -> Self {
        let launcher = config.launcher();
        Self::with_factory(config, launcher)
    }
}

impl<F: DriverFactory> LinkOpener<F> {
    pub fn with_factory(config: Config, factory: F) -> Self {
        let tabs = Arc::new(Mutex::new(TabSessionManager::new(
            factory,
            config.session_options(),
        )));
        let batch = BatchOpener::new(Arc::clone(&tabs), config.open_delay());

        Self {
            config,
            registry: ExtractorRegistry::with_defaults(),
            normalizer: LinkNormalizer::new(),
            links: LinkSet::new(),
            source_path: None,
            tabs,
            batch,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // === Documents ===

    /// Extract and normalize the links of `path`, replacing the current set.
    ///
    /// On failure the previous set stays untouched.
    pub fn load_document(&mut self, path: &Path) -> Result<&LinkSet> {
        let document = self.registry.extract(path)?;
        let links = self.normalizer.normalize(document.raw_text());

        tracing::info!(
            path = %path.display(),
            format = %document.format(),
            links = links.len(),
            "Loaded document"
        );

        self.links = links;
        self.source_path = Some(path.to_path_buf());
        Ok(&self.links)
    }

    pub fn links(&self) -> &LinkSet {
        &self.links
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Current links as numbered `index. url` lines
    pub fn export_text(&self) -> String {
        self.links.to_export_text()
    }

    /// `<stem>_links.txt` beside the loaded document
    pub fn default_export_path(&self) -> Option<PathBuf> {
        let source = self.source_path.as_ref()?;
        let stem = source.file_stem()?.to_string_lossy();
        Some(source.with_file_name(format!("{}_links.txt", stem)))
    }

    // === Tabs ===

    /// Open one link, recovering a dead session first
    pub fn open_one(&self, url: &str) -> Result<TabHandle> {
        let url = url.trim();
        if !is_valid_link(url) {
            return Err(CoreError::InvalidLink(url.to_string()));
        }
        if self.batch.is_running() {
            return Err(CoreError::BatchInProgress);
        }

        Ok(self.tabs.lock().open_one(url)?)
    }

    /// Open the loaded link at `index` (0-based)
    pub fn open_index(&self, index: usize) -> Result<TabHandle> {
        let link = self.links.get(index).ok_or(CoreError::IndexOutOfRange {
            index,
            len: self.links.len(),
        })?;
        self.open_one(link.as_str())
    }

    /// Open every loaded link on a background worker; needs a tokio runtime
    pub fn start_batch(&self) -> Result<BatchHandle> {
        if self.links.is_empty() {
            return Err(CoreError::NoLinks);
        }
        Ok(self.batch.start(self.links.clone())?)
    }

    pub fn is_batch_running(&self) -> bool {
        self.batch.is_running()
    }

    /// Close every tab we opened
    pub fn close_all(&self) -> Result<CloseReport> {
        if self.batch.is_running() {
            return Err(CoreError::BatchInProgress);
        }
        Ok(self.tabs.lock().close_all())
    }

    /// Tabs opened so far; `BatchInProgress` while the batch worker owns the session
    pub fn owned_tabs(&self) -> Result<Vec<TabHandle>> {
        Ok(self.idle_tabs()?.owned_tabs().to_vec())
    }

    pub fn session_state(&self) -> Result<SessionState> {
        Ok(self.idle_tabs()?.state())
    }

    // The batch worker holds the manager for its whole run; never wait on it here
    fn idle_tabs(&self) -> Result<MutexGuard<'_, TabSessionManager<F>>> {
        if self.batch.is_running() {
            return Err(CoreError::BatchInProgress);
        }
        self.tabs.try_lock().ok_or(CoreError::BatchInProgress)
    }

    /// Quit the browser session, if any. Waits for a running batch to finish.
    pub fn shutdown(&self) {
        self.tabs.lock().shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkopener_batch::BatchEvent;
    use linkopener_extract::DocumentFormat;
    use linkopener_tabs::testing::FakeFactory;
    use std::io::Write;

    fn opener() -> (LinkOpener<FakeFactory>, FakeFactory) {
        let factory = FakeFactory::new();
        let config = Config {
            open_delay_ms: 0,
            ..Config::default()
        };
        (LinkOpener::with_factory(config, factory.clone()), factory)
    }

    fn text_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_replaces_links() {
        let dir = tempfile::tempdir().unwrap();
        let first = text_file(&dir, "first.txt", "see http://a.com and http://b.com and http://a.com");
        let second = text_file(&dir, "second.txt", "only www.c.org here");

        let (mut opener, _) = opener();
        let links = opener.load_document(&first).unwrap();
        assert_eq!(
            links.iter().map(|l| l.as_str()).collect::<Vec<_>>(),
            vec!["http://a.com", "http://b.com"]
        );

        opener.load_document(&second).unwrap();
        assert_eq!(opener.links().len(), 1);
        assert_eq!(opener.links().get(0).unwrap().as_str(), "https://www.c.org");
        assert_eq!(opener.source_path(), Some(second.as_path()));
    }

    #[test]
    fn test_failed_load_keeps_previous_links() {
        let dir = tempfile::tempdir().unwrap();
        let good = text_file(&dir, "good.txt", "http://a.com");
        let bad = text_file(&dir, "image.jpeg", "not a document");

        let (mut opener, _) = opener();
        opener.load_document(&good).unwrap();

        let err = opener.load_document(&bad).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::UnsupportedFormat);
        assert_eq!(opener.links().len(), 1);
        assert_eq!(opener.source_path(), Some(good.as_path()));
    }

    fn zip_file(dir: &tempfile::TempDir, name: &str, entries: &[(&str, &str)]) -> PathBuf {
        use zip::write::SimpleFileOptions;

        let path = dir.path().join(name);
        let mut writer = zip::ZipWriter::new(std::fs::File::create(&path).unwrap());
        for (entry, content) in entries {
            writer.start_file(*entry, SimpleFileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
        path
    }

    fn blank_pdf(dir: &tempfile::TempDir, name: &str) -> PathBuf {
        use lopdf::{dictionary, Document, Object};

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(595), Object::Integer(842)],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => Object::Integer(1),
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let path = dir.path().join(name);
        doc.save(&path).unwrap();
        path
    }

    /// A document of `format` whose content holds no link; `None` when the format
    /// cannot be written without its native application
    fn link_free_document(dir: &tempfile::TempDir, format: DocumentFormat) -> Option<PathBuf> {
        const XLSX_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#;
        const XLSX_ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;
        const XLSX_WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Budget" sheetId="1" r:id="rId1"/></sheets></workbook>"#;
        const XLSX_WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#;
        const XLSX_SHEET: &str = r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>rent</t></is></c><c r="B1"><v>1200</v></c></row></sheetData></worksheet>"#;
        const ODF_TEXT: &str = r#"<office:document-content xmlns:office="o" xmlns:text="t"><office:body><office:text><text:p>Meeting notes, nothing to visit</text:p></office:text></office:body></office:document-content>"#;
        const SLIDE: &str = r#"<p:sld xmlns:p="p" xmlns:a="a"><p:cSld><p:spTree><p:sp><p:txBody><a:p><a:r><a:t>Quarterly review</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:sld>"#;
        const DOCX_BODY: &str = r#"<w:document xmlns:w="w"><w:body><w:p><w:r><w:t>Dear team, see you Monday</w:t></w:r></w:p></w:body></w:document>"#;

        let ole = b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1 Template Normal.dotm \x01 Word.Document.8 \x02 plain words";

        let path = match format {
            DocumentFormat::PlainText => text_file(dir, "notes.txt", "Nothing but e.g. prose here."),
            DocumentFormat::Docx => zip_file(dir, "letter.docx", &[("word/document.xml", DOCX_BODY)]),
            DocumentFormat::Xlsx => zip_file(
                dir,
                "budget.xlsx",
                &[
                    ("[Content_Types].xml", XLSX_TYPES),
                    ("_rels/.rels", XLSX_ROOT_RELS),
                    ("xl/workbook.xml", XLSX_WORKBOOK),
                    ("xl/_rels/workbook.xml.rels", XLSX_WORKBOOK_RELS),
                    ("xl/worksheets/sheet1.xml", XLSX_SHEET),
                ],
            ),
            DocumentFormat::Pptx => zip_file(
                dir,
                "review.pptx",
                &[("ppt/presentation.xml", "<p:presentation/>"), ("ppt/slides/slide1.xml", SLIDE)],
            ),
            DocumentFormat::Doc => {
                let path = dir.path().join("legacy.doc");
                std::fs::write(&path, ole).unwrap();
                path
            }
            DocumentFormat::Ppt => {
                let path = dir.path().join("legacy.ppt");
                std::fs::write(&path, ole).unwrap();
                path
            }
            DocumentFormat::Xls => return None,
            DocumentFormat::Pdf => blank_pdf(dir, "blank.pdf"),
            DocumentFormat::Csv => text_file(dir, "table.csv", "name,amount\n\"Smith, J\",12\n"),
            DocumentFormat::Tsv => text_file(dir, "table.tsv", "name\tamount\nSmith\t12\n"),
            DocumentFormat::Rtf => text_file(dir, "memo.rtf", r"{\rtf1\ansi{\fonttbl{\f0 Arial;}}\f0 Plain memo\par}"),
            DocumentFormat::Odt => zip_file(dir, "notes.odt", &[("content.xml", ODF_TEXT)]),
            DocumentFormat::Ods => zip_file(dir, "sheet.ods", &[("content.xml", ODF_TEXT)]),
            DocumentFormat::Odp => zip_file(dir, "deck.odp", &[("content.xml", ODF_TEXT)]),
            DocumentFormat::Html => text_file(
                dir,
                "page.html",
                "<html><head><script>var host = 'cdn.example.com';</script></head><body><p>Hello there</p></body></html>",
            ),
        };
        Some(path)
    }

    #[test]
    fn test_documents_without_links_give_empty_set() {
        let dir = tempfile::tempdir().unwrap();
        let (mut opener, _) = opener();

        let mut covered = 0;
        for format in DocumentFormat::ALL {
            let Some(path) = link_free_document(&dir, format) else {
                continue;
            };
            let links = opener
                .load_document(&path)
                .unwrap_or_else(|e| panic!("{} failed to load: {}", format, e));
            assert!(links.is_empty(), "{} produced {:?}", format, links);
            covered += 1;
        }
        assert_eq!(covered, DocumentFormat::ALL.len() - 1);
    }

    #[test]
    fn test_export_text_and_default_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = text_file(&dir, "report.final.txt", "http://a.com http://b.com");

        let (mut opener, _) = opener();
        assert_eq!(opener.default_export_path(), None);

        opener.load_document(&path).unwrap();
        assert_eq!(opener.export_text(), "1. http://a.com\n2. http://b.com\n");
        assert_eq!(
            opener.default_export_path(),
            Some(dir.path().join("report.final_links.txt"))
        );
    }

    #[test]
    fn test_open_one_rejects_non_http() {
        let (opener, factory) = opener();
        for input in ["ftp://files.example.com", "example.com", "javascript:alert(1)"] {
            let err = opener.open_one(input).unwrap_err();
            assert!(matches!(err, CoreError::InvalidLink(_)));
        }
        assert_eq!(factory.launches(), 0);
    }

    #[test]
    fn test_open_and_close_all() {
        let (opener, factory) = opener();
        opener.open_one("https://a.com").unwrap();
        opener.open_one("https://b.com").unwrap();
        assert_eq!(opener.owned_tabs().unwrap().len(), 2);

        let report = opener.close_all().unwrap();
        assert_eq!(report, CloseReport { closed: 2, failed: 0 });
        assert_eq!(opener.session_state().unwrap(), SessionState::NoSession);
        assert!(factory.current().unwrap().is_quit());
    }

    #[test]
    fn test_open_index_out_of_range() {
        let (opener, _) = opener();
        let err = opener.open_index(3).unwrap_err();
        assert!(matches!(err, CoreError::IndexOutOfRange { index: 3, len: 0 }));
    }

    #[test]
    fn test_session_setup_error_kind() {
        let (opener, factory) = opener();
        factory.fail_launches(true);

        let err = opener.open_one("https://a.com").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::SessionSetupError);
    }

    #[tokio::test]
    async fn test_batch_requires_links() {
        let (opener, _) = opener();
        assert!(matches!(opener.start_batch(), Err(CoreError::NoLinks)));
    }

    #[tokio::test]
    async fn test_batch_then_close() {
        let dir = tempfile::tempdir().unwrap();
        let path = text_file(&dir, "links.md", "http://a.com\nhttp://b.com\nhttp://c.com");

        let (mut opener, _) = opener();
        opener.load_document(&path).unwrap();

        let mut handle = opener.start_batch().unwrap();
        let mut last = None;
        while let Some(event) = handle.next_event().await {
            last = Some(event);
        }
        assert_eq!(last, Some(BatchEvent::Completed { opened: 3, failed: 0 }));
        handle.wait().await.unwrap();

        assert!(!opener.is_batch_running());
        assert_eq!(opener.owned_tabs().unwrap().len(), 3);
        assert_eq!(opener.session_state().unwrap(), SessionState::Active);
        assert_eq!(opener.close_all().unwrap(), CloseReport { closed: 3, failed: 0 });
    }

    #[tokio::test]
    async fn test_single_open_rejected_during_batch() {
        let dir = tempfile::tempdir().unwrap();
        let path = text_file(&dir, "links.txt", "http://a.com");

        let (mut opener, _) = opener();
        opener.load_document(&path).unwrap();

        let held = opener.tabs.lock();
        let handle = opener.start_batch().unwrap();
        assert!(matches!(
            opener.open_one("https://b.com"),
            Err(CoreError::BatchInProgress)
        ));
        assert!(matches!(opener.close_all(), Err(CoreError::BatchInProgress)));
        assert!(matches!(opener.owned_tabs(), Err(CoreError::BatchInProgress)));
        assert!(matches!(opener.session_state(), Err(CoreError::BatchInProgress)));
        drop(held);

        handle.wait().await.unwrap();
    }
}
