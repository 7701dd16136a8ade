//! Plain-text listing of a run sheet for the `show` command.
//!
//! One line per segment: position, type, id, then the fields that matter for
//! the type. Diagram props follow their segment on indented lines so their
//! ids can be passed to `stage place` and `stage remove`.

use std::io::{self, Write};

use runsheet::{
    Document,
    segment::{Segment, SegmentContent, SegmentType},
};

/// Writes a listing of `document` to `out`.
pub fn write_listing(out: &mut impl Write, document: &Document) -> io::Result<()> {
    if document.is_empty() {
        writeln!(out, "(empty run sheet)")?;
        return Ok(());
    }

    for (index, segment) in document.segments().iter().enumerate() {
        writeln!(
            out,
            "{:>3}  {:<10}  {}  {}",
            index + 1,
            segment.segment_type().as_str(),
            segment.id(),
            summary(segment)
        )?;

        for item in segment.content().stage_items() {
            let position = item.position();
            writeln!(
                out,
                "       - {:<12} {}  ({:.1}, {:.1})",
                item.kind().as_str(),
                item.id(),
                position.x(),
                position.y()
            )?;
        }
    }
    Ok(())
}

fn summary(segment: &Segment) -> String {
    let content = segment.content();
    match segment.segment_type() {
        SegmentType::Header => joined(&[&content.title, &content.subtitle, &content.date]),
        SegmentType::TimeBox => joined(&[&content.time, &content.text]),
        SegmentType::Cue => {
            let fields = joined(&[&content.cue_label, &content.cue_id, &content.cue_desc]);
            if content.is_media == Some(true) {
                format!("[media] {fields}")
            } else {
                fields
            }
        }
        SegmentType::Diagram => {
            let count = content.stage_items().len();
            format!("{count} prop{}", if count == 1 { "" } else { "s" })
        }
        SegmentType::PageBreak => String::new(),
        SegmentType::Note | SegmentType::Speaker | SegmentType::Unrecognized(_) => {
            text_of(content)
        }
    }
}

fn text_of(content: &SegmentContent) -> String {
    content.text.clone().unwrap_or_default()
}

fn joined(fields: &[&Option<String>]) -> String {
    fields
        .iter()
        .filter_map(|field| field.as_deref())
        .filter(|field| !field.is_empty())
        .collect::<Vec<_>>()
        .join(" | ")
}
