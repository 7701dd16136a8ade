//! Repair of external layout-reader output into a well-formed document.
//!
//! The external service reads a scanned run sheet and answers with
//! something that should be a JSON array of `{type, content}` records. Its
//! output is noisy in two known ways, both repaired here deterministically:
//!
//! 1. The page title is repeated as a header on every page. Only the first
//!    header is kept; later ones are dropped entirely.
//! 2. Session breaks ("MORNING", "Session 2") and stage diagram call-outs
//!    come back as plain notes. Session labels become headers carrying the
//!    label as an upper-cased subtitle; diagram call-outs become empty
//!    diagrams for the operator to fill in.
//!
//! Reclassification runs after header deduplication, so a session label
//! header is never dropped as a duplicate.

use std::sync::LazyLock;

use log::{debug, info};
use regex::Regex;

use runsheet_core::{
    identifier::SegmentId,
    sanitize::sanitize_content,
    segment::{Segment, SegmentContent, SegmentType},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ImportError},
    fence::strip_code_fence,
    record::{self, RawRecord},
};

static STAGE_DIAGRAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)stage\s+diagram").expect("stage diagram pattern is valid"));

static SESSION_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(morning|afternoon|evening|session\s+\d+)$")
        .expect("session label pattern is valid")
});

/// A successfully decoded document together with the repairs applied to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Imported {
    segments: Vec<Segment>,
    warnings: Vec<Diagnostic>,
}

impl Imported {
    pub(crate) fn new(segments: Vec<Segment>, warnings: Vec<Diagnostic>) -> Self {
        Self { segments, warnings }
    }

    /// Returns the decoded segments in document order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the repairs applied while decoding, as warning diagnostics.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// Consumes the result, returning the segments.
    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }
}

/// Normalizes a raw layout-reader response into an ordered segment list.
///
/// The response may be wrapped in a markdown code fence. Every record is
/// given a fresh id (ids in the response are ignored), its title is
/// sanitized, duplicate headers are dropped and notes matching the session
/// label or stage diagram patterns are reclassified.
///
/// # Errors
///
/// Returns an [`ImportError`] if the response is empty, is not JSON, or is
/// not a JSON array. Anything wrong inside the array is repaired and
/// reported through [`Imported::warnings`] instead.
///
/// # Examples
///
/// ```
/// # use runsheet_import::normalize;
/// # use runsheet_core::segment::SegmentType;
/// let raw = concat!(
///     "```json\n",
///     r#"[{"type": "HEADER", "content": {"title": "Assembly Stage Layout"}},"#,
///     r#" {"type": "NOTE", "content": {"text": "Morning"}}]"#,
///     "\n```",
/// );
///
/// let imported = normalize(raw).unwrap();
/// let segments = imported.segments();
/// assert_eq!(segments[0].content().title.as_deref(), Some("Assembly"));
/// assert_eq!(segments[1].segment_type(), &SegmentType::Header);
/// assert_eq!(segments[1].content().subtitle.as_deref(), Some("MORNING"));
/// ```
pub fn normalize(raw: &str) -> Result<Imported, ImportError> {
    let records = record::decode_list(strip_code_fence(raw))?;
    let record_count = records.len();

    let mut collector = DiagnosticCollector::default();
    let mut seen_header = false;
    let mut segments = Vec::with_capacity(record_count);

    for (index, value) in records.into_iter().enumerate() {
        let Some(RawRecord {
            segment_type,
            content,
        }) = record::decode_lenient(index, value, &mut collector)
        else {
            continue;
        };

        if segment_type == SegmentType::Header {
            if seen_header {
                collector.emit(
                    Diagnostic::warning("dropped repeated header")
                        .with_code(ErrorCode::W200)
                        .at_record(index),
                );
                continue;
            }
            seen_header = true;
        }

        segments.push(Segment::new(
            SegmentId::generate(),
            segment_type,
            sanitize_content(content),
        ));
    }

    let segments = segments.into_iter().map(reclassify).collect::<Vec<_>>();
    let warnings = collector.finish()?;

    info!(
        records = record_count,
        segments = segments.len(),
        repairs = warnings.len();
        "Layout reader response normalized"
    );

    Ok(Imported::new(segments, warnings))
}

/// Retypes notes that the service should have classified differently.
fn reclassify(segment: Segment) -> Segment {
    if segment.segment_type() != &SegmentType::Note {
        return segment;
    }
    let Some(text) = segment.content().text.clone() else {
        return segment;
    };

    if STAGE_DIAGRAM.is_match(&text) {
        debug!(segment_id:% = segment.id(); "Note reclassified as stage diagram");
        let content = SegmentContent::empty_for(&SegmentType::Diagram);
        return segment.with_type(SegmentType::Diagram).with_content(content);
    }

    let label = text.trim();
    if SESSION_LABEL.is_match(label) {
        debug!(segment_id:% = segment.id(), label = label; "Note reclassified as session header");
        let content = SegmentContent {
            subtitle: Some(label.to_uppercase()),
            ..SegmentContent::default()
        };
        return segment.with_type(SegmentType::Header).with_content(content);
    }

    segment
}
