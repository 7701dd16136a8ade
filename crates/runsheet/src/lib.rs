//! Runsheet - editing stage run sheets for live events.
//!
//! A run sheet is an ordered list of segments (headers, timed items, AV cues,
//! notes, speaker lines, stage diagrams and page breaks). This crate holds
//! the editing model and the session around it: every edit produces a new
//! [`Document`] version, which is persisted to a [`BlobStore`] before it
//! becomes current.
//!
//! Documents enter a session from three places: the built-in
//! [`templates`], a saved interchange file, or a scanned run sheet read by
//! an external [`LayoutReader`](service::LayoutReader) and repaired by
//! [`runsheet_import::normalize`].

pub mod config;
pub mod diagram;
pub mod document;
pub mod service;
pub mod store;
pub mod templates;

mod error;

pub use runsheet_core::{identifier, sanitize, segment, stage};
pub use runsheet_import::{
    ImportError,
    error::{Diagnostic, ErrorCode, Severity},
};

pub use document::{Direction, Document};
pub use error::RunSheetError;
pub use store::{BlobStore, DOCUMENT_KEY};

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use log::{debug, info, trace, warn};

use runsheet_import::interchange;

use config::AppConfig;
use diagram::{GestureMachine, StageDiagram, SystemClock};
use identifier::SegmentId;
use segment::{SegmentContent, SegmentType};
use service::{GeminiReader, LayoutReader, ServiceError};
use templates::Template;

/// MIME type sent to the layout reader for scanned run sheets.
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Lifecycle of the most recent layout import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ImportStatus {
    /// No layout import has run in this session.
    #[default]
    Idle,
    /// The layout reader has been called and has not answered yet.
    Pending,
    /// The last import replaced the document.
    Settled,
    /// The last import failed; the document was left unchanged.
    Failed(String),
}

impl fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportStatus::Idle => write!(f, "idle"),
            ImportStatus::Pending => write!(f, "pending"),
            ImportStatus::Settled => write!(f, "settled"),
            ImportStatus::Failed(message) => write!(f, "failed: {message}"),
        }
    }
}

/// The import path a file is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// A run sheet previously exported as JSON.
    Interchange,
    /// A scanned run sheet for the layout reader.
    Scan,
}

impl InputKind {
    /// Picks the import path for `path` from its extension.
    ///
    /// # Errors
    ///
    /// Returns [`RunSheetError::UnsupportedInputKind`] for anything other
    /// than `.json` and `.pdf` (in any letter case).
    pub fn from_path(path: &Path) -> Result<Self, RunSheetError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("json") => Ok(InputKind::Interchange),
            Some("pdf") => Ok(InputKind::Scan),
            _ => Err(RunSheetError::UnsupportedInputKind {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Returns the default export file name for a run sheet saved on `date`.
///
/// ```
/// # use chrono::NaiveDate;
/// let date = NaiveDate::from_ymd_opt(2025, 3, 8).unwrap();
/// assert_eq!(runsheet::export_file_name(date), "run-sheet-2025-03-08.json");
/// ```
pub fn export_file_name(date: NaiveDate) -> String {
    format!("run-sheet-{}.json", date.format("%Y-%m-%d"))
}

/// An editing session over a persisted run sheet.
///
/// The session owns the current [`Document`] version. Each operation
/// computes the next version, writes it to the store and only then makes
/// it current, so a failed write leaves the session on the previous
/// version. Operations that change nothing (an unknown id, a move past the
/// boundary) are not written.
///
/// # Examples
///
/// ```
/// use runsheet::{Direction, RunSheet, config::AppConfig, segment::SegmentType, store::MemoryStore};
///
/// let mut session = RunSheet::open(AppConfig::default(), MemoryStore::new())
///     .expect("Failed to open session");
/// assert!(session.document().is_empty());
///
/// session.add(SegmentType::Header).unwrap();
/// session.add(SegmentType::Cue).unwrap();
/// let cue = session.document().segments()[1].id().clone();
/// session.move_segment(&cue, Direction::Up).unwrap();
///
/// assert_eq!(session.document().segments()[0].segment_type(), &SegmentType::Cue);
/// ```
#[derive(Debug)]
pub struct RunSheet<S> {
    config: AppConfig,
    store: S,
    document: Document,
    import_status: ImportStatus,
}

impl<S: BlobStore> RunSheet<S> {
    /// Opens a session on the document persisted in `store`.
    ///
    /// A missing or undecodable blob is not an error: the session starts on
    /// the default (empty) document and logs a warning for the latter.
    ///
    /// # Errors
    ///
    /// Returns [`RunSheetError::Store`] if the store itself cannot be read.
    pub fn open(config: AppConfig, store: S) -> Result<Self, RunSheetError> {
        let document = match store.get(DOCUMENT_KEY)? {
            Some(blob) => match interchange::from_json(&blob) {
                Ok(imported) => {
                    for warning in imported.warnings() {
                        warn!(warning:% = warning; "Repaired stored document");
                    }
                    Document::new(imported.into_segments())
                }
                Err(err) => {
                    warn!(err:% = err; "Stored document is unreadable, starting from the default document");
                    default_document()
                }
            },
            None => {
                debug!("No stored document, starting from the default document");
                default_document()
            }
        };

        info!(segments = document.len(); "Session opened");
        Ok(Self {
            config,
            store,
            document,
            import_status: ImportStatus::Idle,
        })
    }

    /// Returns the current document version.
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the state of the most recent layout import.
    pub fn import_status(&self) -> &ImportStatus {
        &self.import_status
    }

    /// Creates a gesture machine for editing diagrams, using the configured
    /// double-click threshold.
    pub fn gestures(&self) -> GestureMachine<SystemClock> {
        GestureMachine::with_threshold(SystemClock, self.config.diagram().double_click())
    }

    /// Appends an empty segment of `segment_type`.
    pub fn add(&mut self, segment_type: SegmentType) -> Result<&Document, RunSheetError> {
        let next = self.document.add(segment_type);
        self.commit(next)
    }

    /// Inserts an empty segment of `segment_type` after `id`.
    pub fn insert_after(
        &mut self,
        id: &SegmentId,
        segment_type: SegmentType,
    ) -> Result<&Document, RunSheetError> {
        let next = self.document.insert_after(id, segment_type);
        self.commit(next)
    }

    /// Replaces the content of `id` wholesale (sanitized).
    pub fn update(
        &mut self,
        id: &SegmentId,
        content: SegmentContent,
    ) -> Result<&Document, RunSheetError> {
        let next = self.document.update(id, content);
        self.commit(next)
    }

    pub fn remove(&mut self, id: &SegmentId) -> Result<&Document, RunSheetError> {
        let next = self.document.remove(id);
        self.commit(next)
    }

    pub fn move_segment(
        &mut self,
        id: &SegmentId,
        direction: Direction,
    ) -> Result<&Document, RunSheetError> {
        let next = self.document.move_segment(id, direction);
        self.commit(next)
    }

    /// Replaces the document with the default document.
    pub fn reset(&mut self) -> Result<&Document, RunSheetError> {
        self.load_template(Template::default())
    }

    /// Replaces the document with an empty one.
    pub fn clear(&mut self) -> Result<&Document, RunSheetError> {
        let next = self.document.clear();
        self.commit(next)
    }

    /// Replaces the document with a fresh copy of `template`.
    pub fn load_template(&mut self, template: Template) -> Result<&Document, RunSheetError> {
        info!(template:% = template; "Loading template");
        let next = self.document.replace_all(template.load());
        self.commit(next)
    }

    /// Applies `edit` to the stage diagram of segment `id`.
    ///
    /// Does nothing when `id` is unknown or is not a diagram segment.
    pub fn edit_diagram(
        &mut self,
        id: &SegmentId,
        edit: impl FnOnce(&StageDiagram) -> StageDiagram,
    ) -> Result<&Document, RunSheetError> {
        let Some(segment) = self
            .document
            .get(id)
            .filter(|segment| segment.segment_type() == &SegmentType::Diagram)
        else {
            debug!(segment_id:% = id; "Diagram edit on unknown or non-diagram segment ignored");
            return Ok(&self.document);
        };

        let diagram = edit(&StageDiagram::of(segment));
        let next = diagram.commit(&self.document, id);
        self.commit(next)
    }

    /// Serializes the current document in the interchange format.
    pub fn export(&self) -> Result<String, RunSheetError> {
        let text = interchange::to_json(self.document.segments()).map_err(io::Error::from)?;
        info!(segments = self.document.len(); "Document exported");
        Ok(text)
    }

    /// Writes the current document to `path` in the interchange format.
    pub fn export_to(&self, path: &Path) -> Result<(), RunSheetError> {
        let text = self.export()?;
        fs::write(path, text)?;
        info!(path:? = path; "Document written");
        Ok(())
    }

    /// Replaces the document with a previously exported one.
    ///
    /// On success, returns the repairs applied while reading (duplicate ids
    /// replaced). On failure the document is unchanged.
    pub fn import_interchange(&mut self, text: &str) -> Result<Vec<Diagnostic>, RunSheetError> {
        let imported = interchange::from_json(text)?;
        let warnings = imported.warnings().to_vec();

        let next = self.document.replace_all(imported.into_segments());
        self.commit(next)?;
        info!(segments = self.document.len(), repairs = warnings.len(); "Run sheet imported");
        Ok(warnings)
    }

    /// Replaces the document with the layout `reader` finds in `bytes`.
    ///
    /// The reader's answer is repaired by [`runsheet_import::normalize`].
    /// Any failure, from the service call to decoding, leaves the document
    /// unchanged and sets the import status to [`ImportStatus::Failed`].
    pub fn import_scan(
        &mut self,
        bytes: &[u8],
        mime_type: &str,
        reader: &impl LayoutReader,
    ) -> Result<Vec<Diagnostic>, RunSheetError> {
        self.import_status = ImportStatus::Pending;

        let result = self.read_scan(bytes, mime_type, reader);
        self.import_status = match &result {
            Ok(_) => ImportStatus::Settled,
            Err(err) => {
                warn!(err:% = err; "Layout import failed, document unchanged");
                ImportStatus::Failed(err.to_string())
            }
        };
        result
    }

    fn read_scan(
        &mut self,
        bytes: &[u8],
        mime_type: &str,
        reader: &impl LayoutReader,
    ) -> Result<Vec<Diagnostic>, RunSheetError> {
        let response = reader.read_layout(bytes, mime_type)?;
        trace!(response = response; "Layout reader response");

        let imported = runsheet_import::normalize(&response)?;
        let warnings = imported.warnings().to_vec();
        for warning in &warnings {
            debug!(warning:% = warning; "Layout response repaired");
        }

        let next = self.document.replace_all(imported.into_segments());
        self.commit(next)?;
        info!(segments = self.document.len(), repairs = warnings.len(); "Scanned run sheet imported");
        Ok(warnings)
    }

    /// Imports the file at `path`, routed by its extension.
    ///
    /// Scans are sent to a [`GeminiReader`] built from the configuration.
    pub fn import_file(&mut self, path: &Path) -> Result<Vec<Diagnostic>, RunSheetError> {
        let service = self.config.service().clone();
        self.import_file_with(path, || GeminiReader::from_config(&service))
    }

    /// Imports the file at `path` with a caller-supplied layout reader.
    ///
    /// The extension is checked before anything is read, and the reader is
    /// only created for scans.
    pub fn import_file_with<R: LayoutReader>(
        &mut self,
        path: &Path,
        reader: impl FnOnce() -> Result<R, ServiceError>,
    ) -> Result<Vec<Diagnostic>, RunSheetError> {
        match InputKind::from_path(path)? {
            InputKind::Interchange => {
                debug!(path:? = path; "Importing run sheet");
                let text = fs::read_to_string(path)?;
                self.import_interchange(&text)
            }
            InputKind::Scan => {
                debug!(path:? = path; "Importing scanned run sheet");
                let reader = match reader() {
                    Ok(reader) => reader,
                    Err(err) => {
                        self.import_status = ImportStatus::Failed(err.to_string());
                        return Err(err.into());
                    }
                };
                let bytes = fs::read(path)?;
                self.import_scan(&bytes, PDF_MIME_TYPE, &reader)
            }
        }
    }

    /// Persists `next` and makes it the current version.
    fn commit(&mut self, next: Document) -> Result<&Document, RunSheetError> {
        if next.version() == self.document.version() {
            return Ok(&self.document);
        }

        let blob = serde_json::to_string(next.segments()).map_err(io::Error::from)?;
        self.store.set(DOCUMENT_KEY, &blob)?;
        debug!(version = next.version(), segments = next.len(); "Document persisted");

        self.document = next;
        Ok(&self.document)
    }
}

/// Returns the directory-backed session for `dir`, a shorthand used by
/// front ends.
pub fn open_dir(
    config: AppConfig,
    dir: impl Into<PathBuf>,
) -> Result<RunSheet<store::FileStore>, RunSheetError> {
    RunSheet::open(config, store::FileStore::new(dir))
}

fn default_document() -> Document {
    Document::new(Template::default().load())
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use store::MemoryStore;

    struct FixedReader(Result<&'static str, u16>);

    impl LayoutReader for FixedReader {
        fn read_layout(&self, _bytes: &[u8], _mime_type: &str) -> Result<String, ServiceError> {
            match self.0 {
                Ok(text) => Ok(text.to_string()),
                Err(status) => Err(ServiceError::Status {
                    status,
                    body: "quota exceeded".to_string(),
                }),
            }
        }
    }

    /// A store whose writes can be made to fail.
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail: Cell<bool>,
    }

    impl BlobStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>, store::StoreError> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), store::StoreError> {
            if self.fail.get() {
                return Err(store::StoreError::InvalidKey(key.to_string()));
            }
            self.inner.set(key, value)
        }
    }

    fn session() -> RunSheet<MemoryStore> {
        RunSheet::open(AppConfig::default(), MemoryStore::new()).unwrap()
    }

    #[test]
    fn test_open_empty_store_uses_default() {
        let session = session();
        assert!(session.document().is_empty());
        assert_eq!(session.import_status(), &ImportStatus::Idle);
    }

    #[test]
    fn test_open_falls_back_on_garbage() {
        let mut store = MemoryStore::new();
        store.set(DOCUMENT_KEY, "{not json").unwrap();

        let session = RunSheet::open(AppConfig::default(), store).unwrap();
        assert!(session.document().is_empty());
    }

    #[test]
    fn test_every_change_is_persisted() {
        let mut session = session();
        session.add(SegmentType::Note).unwrap();

        let blob = session.store().get(DOCUMENT_KEY).unwrap().unwrap();
        let reopened = RunSheet::open(AppConfig::default(), session.store().clone()).unwrap();
        assert!(blob.contains("\"NOTE\""));
        assert_eq!(reopened.document().segments(), session.document().segments());
    }

    #[test]
    fn test_noop_is_not_written() {
        let mut session = RunSheet::open(AppConfig::default(), FlakyStore::default()).unwrap();
        session.store.fail.set(true);

        // Nothing changes, so the failing store is never hit.
        session.remove(&SegmentId::new("missing")).unwrap();
        assert_eq!(session.document().version(), 0);
    }

    #[test]
    fn test_failed_write_keeps_previous_version() {
        let mut session = RunSheet::open(AppConfig::default(), FlakyStore::default()).unwrap();
        session.add(SegmentType::Header).unwrap();
        let before = session.document().clone();

        session.store.fail.set(true);
        let err = session.add(SegmentType::Note).unwrap_err();
        assert!(matches!(err, RunSheetError::Store(_)));
        assert_eq!(session.document(), &before);
    }

    #[test]
    fn test_reset_and_template() {
        let mut session = session();
        session.load_template(Template::CircuitAssembly).unwrap();
        assert_eq!(session.document().len(), 6);

        session.reset().unwrap();
        assert!(session.document().is_empty());
    }

    #[test]
    fn test_edit_diagram_only_touches_diagrams() {
        let mut session = session();
        session.add(SegmentType::Note).unwrap();
        session.add(SegmentType::Diagram).unwrap();
        let note = session.document().segments()[0].id().clone();
        let diagram = session.document().segments()[1].id().clone();

        let version = session.document().version();
        session
            .edit_diagram(&note, |d| d.add_item(stage::PropKind::Chair))
            .unwrap();
        assert_eq!(session.document().version(), version);

        session
            .edit_diagram(&diagram, |d| d.add_item(stage::PropKind::Chair))
            .unwrap();
        let items = session.document().segments()[1].content().stage_items();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_scan_import_replaces_document() {
        let mut session = session();
        session.add(SegmentType::Note).unwrap();

        let reader = FixedReader(Ok(r#"[{"type": "HEADER", "content": {"title": "A"}}, {"type": "HEADER", "content": {}}]"#));
        let warnings = session.import_scan(b"%PDF", PDF_MIME_TYPE, &reader).unwrap();

        assert_eq!(session.document().len(), 1);
        assert_eq!(warnings.len(), 1);
        assert_eq!(session.import_status(), &ImportStatus::Settled);
    }

    #[test]
    fn test_failed_scan_leaves_document() {
        let mut session = session();
        session.add(SegmentType::Note).unwrap();
        let before = session.document().clone();

        let err = session
            .import_scan(b"%PDF", PDF_MIME_TYPE, &FixedReader(Err(503)))
            .unwrap_err();
        assert!(matches!(err, RunSheetError::ServiceUnavailable(_)));
        assert_eq!(session.document(), &before);
        assert!(matches!(session.import_status(), ImportStatus::Failed(_)));

        let err = session
            .import_scan(b"%PDF", PDF_MIME_TYPE, &FixedReader(Ok("")))
            .unwrap_err();
        assert!(err.import_error().is_some());
        assert_eq!(session.document(), &before);
    }

    #[test]
    fn test_input_kind_routing() {
        assert_eq!(InputKind::from_path(Path::new("a.json")).unwrap(), InputKind::Interchange);
        assert_eq!(InputKind::from_path(Path::new("SCAN.PDF")).unwrap(), InputKind::Scan);
        for path in ["notes.txt", "noext", "archive.json.gz"] {
            assert!(matches!(
                InputKind::from_path(Path::new(path)),
                Err(RunSheetError::UnsupportedInputKind { .. })
            ));
        }
    }

    #[test]
    fn test_unsupported_file_is_rejected_before_reading() {
        let mut session = session();
        // The file does not exist; an I/O error would mean it was read.
        let err = session
            .import_file_with(Path::new("/nonexistent/run.docx"), || Ok(FixedReader(Ok("[]"))))
            .unwrap_err();
        assert!(matches!(err, RunSheetError::UnsupportedInputKind { .. }));
    }

    #[test]
    fn test_export_is_pretty_interchange() {
        let mut session = session();
        session.load_template(Template::CircuitAssembly).unwrap();

        let text = session.export().unwrap();
        assert!(text.starts_with("[\n  {"));
        let reloaded = interchange::from_json(&text).unwrap();
        assert_eq!(reloaded.segments(), session.document().segments());
    }
}
