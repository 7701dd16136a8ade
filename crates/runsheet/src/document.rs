//! The document model: an ordered, versioned list of segments.
//!
//! A [`Document`] is a value. Every operation borrows the current version
//! and returns the next one, leaving the original untouched, so a reader
//! holding an older version never observes a half-applied edit.
//!
//! Operations are total. Referring to an id that is not in the document is
//! a silent no-op that returns an identical document (same segments, same
//! version), never an error.

use std::fmt;

use log::{debug, trace};

use runsheet_core::{
    identifier::SegmentId,
    sanitize::sanitize_content,
    segment::{Segment, SegmentContent, SegmentType},
};

/// Direction for [`Document::move_segment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards the start of the document.
    Up,
    /// Towards the end of the document.
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// An immutable version of a run sheet.
///
/// # Examples
///
/// ```
/// use runsheet::document::{Direction, Document};
/// use runsheet_core::segment::SegmentType;
///
/// let doc = Document::default()
///     .add(SegmentType::Header)
///     .add(SegmentType::Note);
/// let note = doc.segments()[1].id().clone();
///
/// let moved = doc.move_segment(&note, Direction::Up);
/// assert_eq!(moved.segments()[0].id(), &note);
///
/// // The previous version is unchanged.
/// assert_eq!(doc.segments()[1].id(), &note);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    segments: Vec<Segment>,
    version: u64,
}

impl Document {
    /// Creates version 0 of a document holding `segments`.
    pub fn new(segments: Vec<Segment>) -> Self {
        Self {
            segments,
            version: 0,
        }
    }

    /// Returns the segments in document order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the version number, incremented by every effective change.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the segment with `id`, if any.
    pub fn get(&self, id: &SegmentId) -> Option<&Segment> {
        self.segments.iter().find(|segment| segment.id() == id)
    }

    /// Returns the position of the segment with `id`, if any.
    pub fn position(&self, id: &SegmentId) -> Option<usize> {
        self.segments.iter().position(|segment| segment.id() == id)
    }

    /// Appends a new empty segment of `segment_type`.
    pub fn add(&self, segment_type: SegmentType) -> Self {
        let segment = Segment::empty(segment_type);
        debug!(segment_id:% = segment.id(), segment_type:% = segment.segment_type(); "Segment added");

        let mut segments = self.segments.clone();
        segments.push(segment);
        self.next(segments)
    }

    /// Inserts a new segment of `segment_type` with blank content right
    /// after `id`.
    ///
    /// Unlike [`add`](Self::add), no type defaults are applied: an inserted
    /// cue has no `is_media` flag and an inserted diagram no item list.
    /// Does nothing if `id` is not in the document; in particular the new
    /// segment is never prepended as a fallback.
    pub fn insert_after(&self, id: &SegmentId, segment_type: SegmentType) -> Self {
        let Some(index) = self.position(id) else {
            debug!(segment_id:% = id; "Insert after unknown segment ignored");
            return self.clone();
        };

        let segment = Segment::new(SegmentId::generate(), segment_type, SegmentContent::default());
        debug!(segment_id:% = segment.id(), after:% = id; "Segment inserted");

        let mut segments = self.segments.clone();
        segments.insert(index + 1, segment);
        self.next(segments)
    }

    /// Replaces the content of the segment `id` with a sanitized `content`.
    ///
    /// The content is replaced as a whole. To change a single field, build
    /// the full content from the current one first, for example with
    /// [`SegmentContent::merged_with`].
    pub fn update(&self, id: &SegmentId, content: SegmentContent) -> Self {
        let Some(index) = self.position(id) else {
            debug!(segment_id:% = id; "Update of unknown segment ignored");
            return self.clone();
        };

        trace!(segment_id:% = id, content:? = content; "Segment content replaced");
        let mut segments = self.segments.clone();
        segments[index] = segments[index].clone().with_content(sanitize_content(content));
        self.next(segments)
    }

    /// Removes the segment `id`.
    pub fn remove(&self, id: &SegmentId) -> Self {
        let Some(index) = self.position(id) else {
            debug!(segment_id:% = id; "Removal of unknown segment ignored");
            return self.clone();
        };

        debug!(segment_id:% = id; "Segment removed");
        let mut segments = self.segments.clone();
        segments.remove(index);
        self.next(segments)
    }

    /// Swaps the segment `id` with its neighbour in `direction`.
    ///
    /// Does nothing if `id` is unknown or already first (moving up) or last
    /// (moving down).
    pub fn move_segment(&self, id: &SegmentId, direction: Direction) -> Self {
        let Some(index) = self.position(id) else {
            debug!(segment_id:% = id; "Move of unknown segment ignored");
            return self.clone();
        };

        let neighbour = match direction {
            Direction::Up => index.checked_sub(1),
            Direction::Down => Some(index + 1).filter(|&next| next < self.segments.len()),
        };
        let Some(neighbour) = neighbour else {
            debug!(segment_id:% = id, direction:% = direction; "Segment already at boundary");
            return self.clone();
        };

        debug!(segment_id:% = id, direction:% = direction; "Segment moved");
        let mut segments = self.segments.clone();
        segments.swap(index, neighbour);
        self.next(segments)
    }

    /// Replaces every segment at once.
    ///
    /// Used by import, template loading and clearing. An empty list is a
    /// valid, empty document.
    pub fn replace_all(&self, segments: Vec<Segment>) -> Self {
        debug!(segments = segments.len(); "Document replaced");
        self.next(segments)
    }

    /// Replaces the document with an empty one.
    pub fn clear(&self) -> Self {
        self.replace_all(Vec::new())
    }

    /// Consumes the document, returning its segments.
    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }

    fn next(&self, segments: Vec<Segment>) -> Self {
        Self {
            segments,
            version: self.version + 1,
        }
    }
}
