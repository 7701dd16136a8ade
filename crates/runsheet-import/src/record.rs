//! Defensive decoding of untrusted segment records.
//!
//! The external service is asked for a list of `{type, content}` records,
//! but nothing guarantees what comes back. Every value is inspected by hand
//! rather than cast: fields of the wrong shape are dropped with a warning,
//! unknown keys are kept, and stage items get usable ids and positions.

use std::collections::HashSet;

use serde_json::{Map, Value};

use runsheet_core::{
    identifier::StageItemId,
    segment::{SegmentContent, SegmentType},
    stage::{DEFAULT_DROP_POINT, PropKind, StageItem, StagePoint},
};

use crate::error::{Diagnostic, DiagnosticCollector, ErrorCode, ImportError};

/// A record that survived defensive decoding, not yet given an identity.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawRecord {
    pub(crate) segment_type: SegmentType,
    pub(crate) content: SegmentContent,
}

/// Decodes `payload` as a JSON array, returning its elements.
pub(crate) fn decode_list(payload: &str) -> Result<Vec<Value>, ImportError> {
    if payload.trim().is_empty() {
        return Err(Diagnostic::error("payload is empty")
            .with_code(ErrorCode::E001)
            .into());
    }

    let value: Value = serde_json::from_str(payload).map_err(|err| {
        Diagnostic::error(format!("payload is not valid JSON: {err}"))
            .with_code(ErrorCode::E002)
            .with_help("expected a JSON array of segments")
    })?;

    match value {
        Value::Array(records) => Ok(records),
        other => Err(Diagnostic::error(format!(
            "expected a list of segments, found {}",
            json_kind(&other)
        ))
        .with_code(ErrorCode::E003)
        .with_help("the payload must contain a list of segments")
        .into()),
    }
}

/// Returns a human-readable name for the JSON type of `value`.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Decodes one untrusted record, or returns `None` when it has to be skipped.
pub(crate) fn decode_lenient(
    index: usize,
    value: Value,
    collector: &mut DiagnosticCollector,
) -> Option<RawRecord> {
    let mut fields = match value {
        Value::Object(fields) => fields,
        other => {
            collector.emit(
                Diagnostic::warning(format!("skipped {}, expected a segment", json_kind(&other)))
                    .with_code(ErrorCode::W201)
                    .at_record(index),
            );
            return None;
        }
    };

    let segment_type = match fields.remove("type") {
        Some(Value::String(tag)) => SegmentType::from(tag),
        Some(other) => {
            collector.emit(
                Diagnostic::warning(format!("segment type is {}", json_kind(&other)))
                    .with_code(ErrorCode::W202)
                    .at_record(index),
            );
            SegmentType::Unrecognized(String::new())
        }
        None => {
            collector.emit(
                Diagnostic::warning("segment has no type")
                    .with_code(ErrorCode::W202)
                    .at_record(index),
            );
            SegmentType::Unrecognized(String::new())
        }
    };

    let content = match fields.remove("content") {
        Some(Value::Object(content)) => decode_content(index, content, collector),
        Some(Value::Null) | None => SegmentContent::default(),
        Some(other) => {
            collector.emit(
                Diagnostic::warning(format!("content is {}, using empty content", json_kind(&other)))
                    .with_code(ErrorCode::W203)
                    .at_record(index),
            );
            SegmentContent::default()
        }
    };

    Some(RawRecord {
        segment_type,
        content,
    })
}

fn decode_content(
    index: usize,
    fields: Map<String, Value>,
    collector: &mut DiagnosticCollector,
) -> SegmentContent {
    let mut content = SegmentContent::default();

    for (key, value) in fields {
        let text_slot = match key.as_str() {
            "title" => Some(&mut content.title),
            "subtitle" => Some(&mut content.subtitle),
            "date" => Some(&mut content.date),
            "text" => Some(&mut content.text),
            "time" => Some(&mut content.time),
            "cueLabel" => Some(&mut content.cue_label),
            "cueId" => Some(&mut content.cue_id),
            "cueDesc" => Some(&mut content.cue_desc),
            _ => None,
        };

        if let Some(slot) = text_slot {
            match lenient_text(&value) {
                Ok(text) => *slot = text,
                Err(()) => discard(collector, index, &key, &value),
            }
            continue;
        }

        match key.as_str() {
            "isMedia" => match lenient_flag(&value) {
                Ok(flag) => content.is_media = flag,
                Err(()) => discard(collector, index, &key, &value),
            },
            "stageItems" => match value {
                Value::Array(items) => {
                    content.stage_items = Some(decode_stage_items(index, items, collector));
                }
                Value::Null => {}
                other => discard(collector, index, &key, &other),
            },
            _ => {
                content.extra.insert(key, value);
            }
        }
    }

    content
}

fn discard(collector: &mut DiagnosticCollector, index: usize, key: &str, value: &Value) {
    collector.emit(
        Diagnostic::warning(format!("discarded `{key}`: unexpected {}", json_kind(value)))
            .with_code(ErrorCode::W203)
            .at_record(index),
    );
}

/// Strings are taken as is; numbers and booleans are rendered as text.
fn lenient_text(value: &Value) -> Result<Option<String>, ()> {
    match value {
        Value::String(text) => Ok(Some(text.clone())),
        Value::Number(number) => Ok(Some(number.to_string())),
        Value::Bool(flag) => Ok(Some(flag.to_string())),
        Value::Null => Ok(None),
        Value::Array(_) | Value::Object(_) => Err(()),
    }
}

fn lenient_flag(value: &Value) -> Result<Option<bool>, ()> {
    match value {
        Value::Bool(flag) => Ok(Some(*flag)),
        Value::String(text) if text.eq_ignore_ascii_case("true") => Ok(Some(true)),
        Value::String(text) if text.eq_ignore_ascii_case("false") => Ok(Some(false)),
        Value::Null => Ok(None),
        _ => Err(()),
    }
}

fn lenient_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Decodes the stage items of record `index`, giving every item a position
/// and an id unique within the diagram.
///
/// Elements that are not objects are dropped (W203). A missing id is
/// generated and a reused one replaced (W204).
pub(crate) fn decode_stage_items(
    index: usize,
    items: Vec<Value>,
    collector: &mut DiagnosticCollector,
) -> Vec<StageItem> {
    let mut seen = HashSet::new();
    let mut decoded = Vec::with_capacity(items.len());

    for item in items {
        let fields = match item {
            Value::Object(fields) => fields,
            other => {
                collector.emit(
                    Diagnostic::warning(format!("discarded stage item: unexpected {}", json_kind(&other)))
                        .with_code(ErrorCode::W203)
                        .at_record(index),
                );
                continue;
            }
        };

        let id = match fields.get("id") {
            Some(Value::String(id)) if !seen.contains(id.as_str()) => StageItemId::new(id.clone()),
            Some(Value::String(id)) => {
                let fresh = StageItemId::generate();
                collector.emit(
                    Diagnostic::warning(format!("stage item id `{id}` already used, assigned `{fresh}`"))
                        .with_code(ErrorCode::W204)
                        .at_record(index),
                );
                fresh
            }
            _ => StageItemId::generate(),
        };
        seen.insert(id.as_str().to_string());

        let kind = match fields.get("type") {
            Some(Value::String(kind)) => PropKind::from(kind.as_str()),
            _ => PropKind::Other(String::new()),
        };
        let position = StagePoint::new(
            lenient_number(fields.get("x")).unwrap_or(DEFAULT_DROP_POINT.x()),
            lenient_number(fields.get("y")).unwrap_or(DEFAULT_DROP_POINT.y()),
        );

        decoded.push(StageItem::new(id, kind, position));
    }

    decoded
}
