//! The interchange format: a full document as pretty-printed JSON.
//!
//! An interchange file is a JSON array of `{id, type, content}` objects, the
//! segments in document order with every content field and stage item
//! verbatim. Reading a file back is the inverse of writing it: no title
//! cleanup, header deduplication or reclassification is applied.
//!
//! The only structural check on read is that every record is an object
//! with both `type` and `content`. Everything else is read leniently:
//!
//! - a record without an `id` gets a fresh one, and a record reusing an id
//!   already seen earlier in the file (or carrying one that is not a
//!   string) is given a fresh one as well;
//! - a content field of the wrong JSON type is kept verbatim among the
//!   unknown keys, so it survives the next export;
//! - stage items get the same repairs as imported scans.

use std::collections::HashSet;

use log::debug;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use runsheet_core::{
    identifier::SegmentId,
    segment::{Segment, SegmentContent, SegmentType},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ImportError},
    normalize::Imported,
    record,
};

/// Serializes `segments` into the interchange format.
///
/// # Errors
///
/// Returns an error only if serialization itself fails, which the segment
/// types never trigger in practice.
pub fn to_json(segments: &[Segment]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(segments)
}

/// Reads a document previously written by [`to_json`].
///
/// # Errors
///
/// Returns an [`ImportError`] carrying one diagnostic per problem if the text
/// is not a JSON array, or if any record is not an object or lacks `type` or
/// `content`. Nothing is returned for a partially valid file.
///
/// # Examples
///
/// ```
/// # use runsheet_import::interchange;
/// let text = r#"[{"id": "a", "type": "PAGE_BREAK", "content": {}}]"#;
/// let imported = interchange::from_json(text).unwrap();
/// assert_eq!(imported.segments()[0].id(), &"a");
///
/// assert!(interchange::from_json(r#"{"id": "a"}"#).is_err());
/// ```
pub fn from_json(text: &str) -> Result<Imported, ImportError> {
    let records = record::decode_list(text)?;

    let mut collector = DiagnosticCollector::default();
    let mut seen = HashSet::new();
    let mut segments = Vec::with_capacity(records.len());

    for (index, value) in records.into_iter().enumerate() {
        let Some(segment) = decode_strict(index, value, &mut collector) else {
            continue;
        };

        let segment = if seen.contains(segment.id()) {
            let fresh = SegmentId::generate();
            collector.emit(
                Diagnostic::warning(format!("id `{}` already used, assigned `{fresh}`", segment.id()))
                    .with_code(ErrorCode::W204)
                    .at_record(index),
            );
            segment.with_id(fresh)
        } else {
            segment
        };

        seen.insert(segment.id().clone());
        segments.push(segment);
    }

    let warnings = collector.finish()?;
    debug!(segments = segments.len(); "Interchange document decoded");

    Ok(Imported::new(segments, warnings))
}

fn decode_strict(
    index: usize,
    value: Value,
    collector: &mut DiagnosticCollector,
) -> Option<Segment> {
    let mut fields = match value {
        Value::Object(fields) => fields,
        other => {
            collector.emit(
                Diagnostic::error(format!("expected a segment object, found {}", record::json_kind(&other)))
                    .with_code(ErrorCode::E100)
                    .at_record(index),
            );
            return None;
        }
    };

    let segment_type = fields.remove("type");
    let content = fields.remove("content");
    if segment_type.is_none() {
        collector.emit(
            Diagnostic::error("segment is missing `type`")
                .with_code(ErrorCode::E101)
                .at_record(index),
        );
    }
    if content.is_none() {
        collector.emit(
            Diagnostic::error("segment is missing `content`")
                .with_code(ErrorCode::E102)
                .at_record(index),
        );
    }
    let (segment_type, content) = (segment_type?, content?);

    let segment_type = match segment_type {
        Value::String(tag) => SegmentType::from(tag),
        other => {
            collector.emit(
                Diagnostic::warning(format!("segment type is {}", record::json_kind(&other)))
                    .with_code(ErrorCode::W202)
                    .at_record(index),
            );
            SegmentType::Unrecognized(String::new())
        }
    };

    let content = match content {
        Value::Object(content) => decode_content(index, content, collector),
        Value::Null => SegmentContent::default(),
        other => {
            collector.emit(
                Diagnostic::warning(format!("content is {}, using empty content", record::json_kind(&other)))
                    .with_code(ErrorCode::W203)
                    .at_record(index),
            );
            SegmentContent::default()
        }
    };

    let id = match fields.remove("id") {
        Some(Value::String(id)) => SegmentId::new(id),
        Some(Value::Null) | None => SegmentId::generate(),
        Some(other) => {
            let fresh = SegmentId::generate();
            collector.emit(
                Diagnostic::warning(format!("id is {}, assigned `{fresh}`", record::json_kind(&other)))
                    .with_code(ErrorCode::W204)
                    .at_record(index),
            );
            fresh
        }
    };

    Some(Segment::new(id, segment_type, content))
}

/// Decodes content fields by their exported shape.
///
/// A field that does not have that shape is kept as an unknown key.
fn decode_content(
    index: usize,
    fields: Map<String, Value>,
    collector: &mut DiagnosticCollector,
) -> SegmentContent {
    let mut content = SegmentContent::default();

    for (key, value) in fields {
        let decoded = match key.as_str() {
            "title" => decode_slot(&mut content.title, &value),
            "subtitle" => decode_slot(&mut content.subtitle, &value),
            "date" => decode_slot(&mut content.date, &value),
            "text" => decode_slot(&mut content.text, &value),
            "time" => decode_slot(&mut content.time, &value),
            "cueLabel" => decode_slot(&mut content.cue_label, &value),
            "cueId" => decode_slot(&mut content.cue_id, &value),
            "cueDesc" => decode_slot(&mut content.cue_desc, &value),
            "isMedia" => decode_slot(&mut content.is_media, &value),
            "stageItems" => match &value {
                Value::Array(items) => {
                    let items = record::decode_stage_items(index, items.clone(), collector);
                    content.stage_items = Some(items);
                    continue;
                }
                Value::Null => true,
                _ => false,
            },
            _ => {
                content.extra.insert(key, value);
                continue;
            }
        };

        if !decoded {
            collector.emit(
                Diagnostic::warning(format!(
                    "`{key}` is {}, kept as is",
                    record::json_kind(&value)
                ))
                .with_code(ErrorCode::W203)
                .at_record(index),
            );
            content.extra.insert(key, value);
        }
    }

    content
}

fn decode_slot<T: DeserializeOwned>(slot: &mut Option<T>, value: &Value) -> bool {
    match serde_json::from_value(value.clone()) {
        Ok(decoded) => {
            *slot = decoded;
            true
        }
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use runsheet_core::{
        identifier::StageItemId,
        stage::{PropKind, StageItem, StagePoint},
    };

    use super::*;

    fn sample_document() -> Vec<Segment> {
        vec![
            Segment::new(
                SegmentId::new("h"),
                SegmentType::Header,
                SegmentContent {
                    title: Some("Stage Layout kept verbatim".to_string()),
                    subtitle: Some("2025-2026".to_string()),
                    ..SegmentContent::default()
                },
            ),
            Segment::new(
                SegmentId::new("d"),
                SegmentType::Diagram,
                SegmentContent {
                    stage_items: Some(vec![StageItem::new(
                        StageItemId::new("l"),
                        PropKind::LecternBlue,
                        StagePoint::new(33.25, 71.5),
                    )]),
                    ..SegmentContent::default()
                },
            ),
            Segment::new(
                SegmentId::new("n"),
                SegmentType::Note,
                SegmentContent {
                    text: Some("Stage diagram follows".to_string()),
                    ..SegmentContent::default()
                },
            ),
            Segment::new(
                SegmentId::new("h2"),
                SegmentType::Header,
                SegmentContent::default(),
            ),
            Segment::new(
                SegmentId::new("x"),
                SegmentType::Unrecognized("SLIDE".to_string()),
                SegmentContent::default(),
            ),
        ]
    }

    #[test]
    fn test_roundtrip_applies_no_repairs() {
        let document = sample_document();
        let text = to_json(&document).unwrap();
        let imported = from_json(&text).unwrap();

        assert_eq!(imported.segments(), document.as_slice());
        assert!(imported.warnings().is_empty());
    }

    #[test]
    fn test_export_is_pretty_printed() {
        let text = to_json(&sample_document()[..1]).unwrap();
        assert!(text.starts_with("[\n  {\n    \"id\": \"h\""));
    }

    #[test]
    fn test_empty_array_is_valid() {
        assert!(from_json("[]").unwrap().segments().is_empty());
    }

    #[test]
    fn test_non_array_is_rejected() {
        let err = from_json(r#"{"segments": []}"#).unwrap_err();
        assert_eq!(err.diagnostics()[0].code(), Some(ErrorCode::E003));
    }

    #[test]
    fn test_every_bad_record_is_reported() {
        let text = json!([
            {"id": "ok", "type": "NOTE", "content": {}},
            {"id": "a", "content": {}},
            {"id": "b", "type": "NOTE"},
            42,
            {"id": "c", "type": "NOTE", "content": {"isMedia": "maybe"}}
        ])
        .to_string();

        let err = from_json(&text).unwrap_err();
        let codes: Vec<_> = err.diagnostics().iter().filter_map(|d| d.code()).collect();
        assert_eq!(codes, vec![ErrorCode::E101, ErrorCode::E102, ErrorCode::E100]);
        let records: Vec<_> = err.diagnostics().iter().filter_map(|d| d.record()).collect();
        assert_eq!(records, vec![1, 2, 3]);
    }

    #[test]
    fn test_misshapen_content_is_kept() {
        let text = json!([
            {"id": "c", "type": "CUE", "content": {"cueLabel": 7, "cueId": "Video 1", "isMedia": "maybe"}},
            {"id": "d", "type": "DIAGRAM", "content": {"stageItems": [{"id": "m", "type": "chair", "x": 20}]}}
        ])
        .to_string();

        let imported = from_json(&text).unwrap();
        let cue = imported.segments()[0].content();
        assert_eq!(cue.cue_label, None);
        assert_eq!(cue.cue_id.as_deref(), Some("Video 1"));
        assert_eq!(cue.extra.get("cueLabel"), Some(&json!(7)));
        assert_eq!(cue.extra.get("isMedia"), Some(&json!("maybe")));

        let items = imported.segments()[1].content().stage_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].position(), StagePoint::new(20.0, 50.0));

        let codes: Vec<_> = imported.warnings().iter().filter_map(|d| d.code()).collect();
        assert_eq!(codes, vec![ErrorCode::W203, ErrorCode::W203]);

        // Kept fields are written back unchanged.
        let exported: Value = serde_json::from_str(&to_json(imported.segments()).unwrap()).unwrap();
        assert_eq!(exported[0]["content"]["cueLabel"], json!(7));
        assert_eq!(exported[0]["content"]["isMedia"], json!("maybe"));
    }

    #[test]
    fn test_duplicate_stage_item_ids_are_replaced() {
        let text = json!([
            {"id": "d", "type": "DIAGRAM", "content": {"stageItems": [
                {"id": "m", "type": "chair", "x": 10, "y": 10},
                {"id": "m", "type": "table", "x": 90, "y": 90},
                "lectern"
            ]}}
        ])
        .to_string();

        let imported = from_json(&text).unwrap();
        let items = imported.segments()[0].content().stage_items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id(), &StageItemId::new("m"));
        assert_ne!(items[1].id(), items[0].id());

        let codes: Vec<_> = imported.warnings().iter().filter_map(|d| d.code()).collect();
        assert_eq!(codes, vec![ErrorCode::W204, ErrorCode::W203]);
    }

    #[test]
    fn test_missing_id_gets_fresh_one() {
        let imported = from_json(r#"[{"type": "NOTE", "content": {"text": "hi"}}]"#).unwrap();
        assert!(!imported.segments()[0].id().as_str().is_empty());
        assert!(imported.warnings().is_empty());
    }

    #[test]
    fn test_duplicate_id_is_replaced() {
        let text = json!([
            {"id": "dup", "type": "NOTE", "content": {"text": "first"}},
            {"id": "dup", "type": "NOTE", "content": {"text": "second"}}
        ])
        .to_string();

        let imported = from_json(&text).unwrap();
        assert_eq!(imported.segments()[0].id(), &"dup");
        assert_ne!(imported.segments()[1].id(), &"dup");
        assert_eq!(imported.warnings()[0].code(), Some(ErrorCode::W204));
    }

    fn segment_strategy() -> impl Strategy<Value = Segment> {
        let segment_type = prop_oneof![
            Just(SegmentType::Header),
            Just(SegmentType::Note),
            Just(SegmentType::TimeBox),
            Just(SegmentType::Cue),
            Just(SegmentType::Speaker),
            Just(SegmentType::Diagram),
            Just(SegmentType::PageBreak),
        ];
        let items = proptest::collection::vec((0.0f64..=100.0, 0.0f64..=100.0), 0..4);
        (
            segment_type,
            proptest::option::of("[ -~]{0,24}"),
            proptest::option::of(any::<bool>()),
            proptest::option::of(items),
        )
            .prop_map(|(segment_type, text, is_media, items)| {
                let stage_items = items.map(|items| {
                    items
                        .into_iter()
                        .enumerate()
                        .map(|(i, (x, y))| {
                            StageItem::new(
                                StageItemId::new(format!("item-{i}")),
                                PropKind::Chair,
                                StagePoint::new(x, y),
                            )
                        })
                        .collect()
                });
                Segment::new(
                    SegmentId::generate(),
                    segment_type,
                    SegmentContent {
                        title: text.clone(),
                        text,
                        is_media,
                        stage_items,
                        ..SegmentContent::default()
                    },
                )
            })
    }

    proptest! {
        #[test]
        fn interchange_roundtrip_is_identity(
            document in proptest::collection::vec(segment_strategy(), 0..8)
        ) {
            let text = to_json(&document).unwrap();
            let imported = from_json(&text).unwrap();
            prop_assert_eq!(imported.segments(), document.as_slice());
        }
    }
}
