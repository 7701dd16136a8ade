//! Free-text cleanup for title fields.
//!
//! Scanned run sheets routinely carry a "Stage Layout" caption next to the
//! event title. The phrase is noise in a title, so it is removed wherever a
//! title is written: on every segment update and on every imported segment.
//!
//! The phrase is matched case-insensitively as two words separated by any
//! run of whitespace. Whitespace around a removed phrase collapses to a
//! single space and the result is trimmed, so the cleanup is idempotent.

use std::sync::LazyLock;

use regex::Regex;

use crate::segment::SegmentContent;

static STAGE_LAYOUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*stage\s+layout\s*").expect("stage layout pattern is valid")
});

/// Removes every "stage layout" phrase from `title` and trims the result.
///
/// # Examples
///
/// ```
/// # use runsheet_core::sanitize::sanitize_title;
/// assert_eq!(sanitize_title("Q3 Stage   Layout Plan"), "Q3 Plan");
/// assert_eq!(sanitize_title("  STAGE LAYOUT  "), "");
/// assert_eq!(sanitize_title("Circuit Assembly"), "Circuit Assembly");
/// ```
pub fn sanitize_title(title: &str) -> String {
    let mut cleaned = title.to_string();
    // Removing one occurrence can join the words around it into a new one.
    while STAGE_LAYOUT.is_match(&cleaned) {
        cleaned = STAGE_LAYOUT.replace_all(&cleaned, " ").into_owned();
    }
    cleaned.trim().to_string()
}

/// Returns `content` with its title sanitized and every other field untouched.
pub fn sanitize_content(mut content: SegmentContent) -> SegmentContent {
    if let Some(title) = content.title.take() {
        content.title = Some(sanitize_title(&title));
    }
    content
}
