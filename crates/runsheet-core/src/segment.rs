//! Segments, the ordered units of a run sheet.
//!
//! A [`Segment`] couples an identity, a [`SegmentType`] tag and a
//! [`SegmentContent`] payload. The payload is one flat record shared by all
//! types; which fields matter depends on the tag:
//!
//! | type | fields |
//! |---|---|
//! | `Header` | `title`, `subtitle`, `date` |
//! | `Note` | `text` |
//! | `TimeBox` | `time`, `text` |
//! | `Cue` | `cue_label`, `cue_id`, `cue_desc`, `is_media` |
//! | `Speaker` | `text` |
//! | `Diagram` | `stage_items` |
//! | `PageBreak` | none |
//!
//! Fields that do not apply to a type are carried along untouched, and keys
//! this version does not know are kept in [`SegmentContent::extra`].

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{identifier::SegmentId, stage::StageItem};

/// The type tag of a segment.
///
/// Serialized as the upper snake case wire names (`HEADER`, `TIME_BOX`, ...).
/// Tags outside the closed set are kept verbatim as
/// [`SegmentType::Unrecognized`]; the presentation layer treats them as
/// no-ops.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SegmentType {
    Header,
    Note,
    TimeBox,
    Cue,
    Speaker,
    Diagram,
    PageBreak,
    /// A tag outside the closed set, preserved as received.
    Unrecognized(String),
}

impl SegmentType {
    /// Every recognized segment type, in toolbar order.
    pub const ALL: [SegmentType; 7] = [
        SegmentType::Header,
        SegmentType::TimeBox,
        SegmentType::Cue,
        SegmentType::Speaker,
        SegmentType::Diagram,
        SegmentType::Note,
        SegmentType::PageBreak,
    ];

    /// Returns the wire name of this type.
    pub fn as_str(&self) -> &str {
        match self {
            SegmentType::Header => "HEADER",
            SegmentType::Note => "NOTE",
            SegmentType::TimeBox => "TIME_BOX",
            SegmentType::Cue => "CUE",
            SegmentType::Speaker => "SPEAKER",
            SegmentType::Diagram => "DIAGRAM",
            SegmentType::PageBreak => "PAGE_BREAK",
            SegmentType::Unrecognized(tag) => tag,
        }
    }

    /// Returns `true` unless this is [`SegmentType::Unrecognized`].
    pub fn is_recognized(&self) -> bool {
        !matches!(self, SegmentType::Unrecognized(_))
    }
}

impl From<&str> for SegmentType {
    fn from(tag: &str) -> Self {
        match tag {
            "HEADER" => SegmentType::Header,
            "NOTE" => SegmentType::Note,
            "TIME_BOX" => SegmentType::TimeBox,
            "CUE" => SegmentType::Cue,
            "SPEAKER" => SegmentType::Speaker,
            "DIAGRAM" => SegmentType::Diagram,
            "PAGE_BREAK" => SegmentType::PageBreak,
            other => SegmentType::Unrecognized(other.to_string()),
        }
    }
}

impl From<String> for SegmentType {
    fn from(tag: String) -> Self {
        match SegmentType::from(tag.as_str()) {
            SegmentType::Unrecognized(_) => SegmentType::Unrecognized(tag),
            known => known,
        }
    }
}

impl From<SegmentType> for String {
    fn from(segment_type: SegmentType) -> Self {
        match segment_type {
            SegmentType::Unrecognized(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for SegmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an operator-typed segment type name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown segment type `{0}` (expected one of: header, note, time-box, cue, speaker, diagram, page-break)")]
pub struct UnknownSegmentType(pub String);

/// Parses operator spelling of a type name.
///
/// Accepts the wire names as well as lower case with `-` or `_` separators
/// (`time-box`, `page_break`). Unlike deserialization this never yields
/// [`SegmentType::Unrecognized`]; an operator can only create known types.
impl FromStr for SegmentType {
    type Err = UnknownSegmentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        match SegmentType::from(normalized.as_str()) {
            SegmentType::Unrecognized(_) => Err(UnknownSegmentType(s.to_string())),
            known => Ok(known),
        }
    }
}

/// The payload of a segment.
///
/// # Examples
///
/// ```
/// # use runsheet_core::segment::SegmentContent;
/// let content = SegmentContent {
///     time: Some("9:30".to_string()),
///     text: Some("Music".to_string()),
///     ..SegmentContent::default()
/// };
/// let json = serde_json::to_string(&content).unwrap();
/// assert_eq!(json, r#"{"text":"Music","time":"9:30"}"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cue_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cue_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cue_desc: Option<String>,
    /// Media cues are printed in red.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_media: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_items: Option<Vec<StageItem>>,
    /// Keys this version does not know, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SegmentContent {
    /// Returns the empty content a freshly added segment of `segment_type` starts with.
    ///
    /// Only cues (`is_media = true`) and diagrams (an empty item list) carry
    /// defaults; every other type starts empty.
    pub fn empty_for(segment_type: &SegmentType) -> Self {
        match segment_type {
            SegmentType::Cue => Self {
                is_media: Some(true),
                ..Self::default()
            },
            SegmentType::Diagram => Self {
                stage_items: Some(Vec::new()),
                ..Self::default()
            },
            _ => Self::default(),
        }
    }

    /// Returns the stage items, or an empty slice when none are set.
    pub fn stage_items(&self) -> &[StageItem] {
        self.stage_items.as_deref().unwrap_or_default()
    }

    /// Returns a copy of this content where every field set on `patch`
    /// replaces the corresponding field here.
    ///
    /// Callers use this to build the full content for an update from a
    /// partial edit; the update itself always replaces content wholesale.
    pub fn merged_with(&self, patch: SegmentContent) -> Self {
        let mut extra = self.extra.clone();
        extra.extend(patch.extra);
        Self {
            title: patch.title.or_else(|| self.title.clone()),
            subtitle: patch.subtitle.or_else(|| self.subtitle.clone()),
            date: patch.date.or_else(|| self.date.clone()),
            text: patch.text.or_else(|| self.text.clone()),
            time: patch.time.or_else(|| self.time.clone()),
            cue_label: patch.cue_label.or_else(|| self.cue_label.clone()),
            cue_id: patch.cue_id.or_else(|| self.cue_id.clone()),
            cue_desc: patch.cue_desc.or_else(|| self.cue_desc.clone()),
            is_media: patch.is_media.or(self.is_media),
            stage_items: patch.stage_items.or_else(|| self.stage_items.clone()),
            extra,
        }
    }
}

/// One unit of a run sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    id: SegmentId,
    #[serde(rename = "type")]
    segment_type: SegmentType,
    content: SegmentContent,
}

impl Segment {
    /// Creates a segment from its parts.
    pub fn new(id: SegmentId, segment_type: SegmentType, content: SegmentContent) -> Self {
        Self {
            id,
            segment_type,
            content,
        }
    }

    /// Creates a segment with a fresh id and the type's empty content.
    pub fn empty(segment_type: SegmentType) -> Self {
        let content = SegmentContent::empty_for(&segment_type);
        Self::new(SegmentId::generate(), segment_type, content)
    }

    /// Returns the segment id.
    pub fn id(&self) -> &SegmentId {
        &self.id
    }

    /// Returns the segment type tag.
    pub fn segment_type(&self) -> &SegmentType {
        &self.segment_type
    }

    /// Returns the segment content.
    pub fn content(&self) -> &SegmentContent {
        &self.content
    }

    /// Returns this segment with its content replaced.
    pub fn with_content(mut self, content: SegmentContent) -> Self {
        self.content = content;
        self
    }

    /// Returns this segment with a different id.
    pub fn with_id(mut self, id: SegmentId) -> Self {
        self.id = id;
        self
    }

    /// Returns this segment retyped, keeping its content as is.
    pub fn with_type(mut self, segment_type: SegmentType) -> Self {
        self.segment_type = segment_type;
        self
    }

    /// Returns `true` if this is a header segment.
    pub fn is_header(&self) -> bool {
        self.segment_type == SegmentType::Header
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_segment_type_wire_names_roundtrip() {
        for segment_type in SegmentType::ALL {
            let json = serde_json::to_value(&segment_type).unwrap();
            let back: SegmentType = serde_json::from_value(json).unwrap();
            assert_eq!(back, segment_type);
        }
        assert_eq!(
            serde_json::to_value(SegmentType::TimeBox).unwrap(),
            json!("TIME_BOX")
        );
    }

    #[test]
    fn test_unknown_tag_is_preserved() {
        let tag: SegmentType = serde_json::from_value(json!("SLIDE")).unwrap();
        assert_eq!(tag, SegmentType::Unrecognized("SLIDE".to_string()));
        assert!(!tag.is_recognized());
        assert_eq!(serde_json::to_value(&tag).unwrap(), json!("SLIDE"));
    }

    #[test]
    fn test_operator_spelling() {
        assert_eq!("time-box".parse::<SegmentType>(), Ok(SegmentType::TimeBox));
        assert_eq!("page_break".parse::<SegmentType>(), Ok(SegmentType::PageBreak));
        assert_eq!(" Header ".parse::<SegmentType>(), Ok(SegmentType::Header));
        assert!("slide".parse::<SegmentType>().is_err());
    }

    #[test]
    fn test_empty_content_defaults() {
        let cue = SegmentContent::empty_for(&SegmentType::Cue);
        assert_eq!(cue.is_media, Some(true));
        assert_eq!(cue.stage_items, None);

        let diagram = SegmentContent::empty_for(&SegmentType::Diagram);
        assert_eq!(diagram.stage_items, Some(Vec::new()));
        assert_eq!(diagram.is_media, None);

        assert_eq!(
            SegmentContent::empty_for(&SegmentType::Note),
            SegmentContent::default()
        );
    }

    #[test]
    fn test_content_keeps_unknown_keys() {
        let raw = json!({"text": "hello", "items": [], "color": "red"});
        let content: SegmentContent = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(content.text.as_deref(), Some("hello"));
        assert_eq!(content.extra.get("color"), Some(&json!("red")));
        assert_eq!(serde_json::to_value(&content).unwrap(), raw);
    }

    #[test]
    fn test_merged_with_overrides_only_set_fields() {
        let base = SegmentContent {
            title: Some("Assembly".to_string()),
            subtitle: Some("Morning".to_string()),
            ..SegmentContent::default()
        };
        let patch = SegmentContent {
            subtitle: Some("Afternoon".to_string()),
            ..SegmentContent::default()
        };

        let merged = base.merged_with(patch);
        assert_eq!(merged.title.as_deref(), Some("Assembly"));
        assert_eq!(merged.subtitle.as_deref(), Some("Afternoon"));
    }

    #[test]
    fn test_segment_wire_format() {
        let segment = Segment::new(
            SegmentId::new("s1"),
            SegmentType::Cue,
            SegmentContent::empty_for(&SegmentType::Cue),
        );
        assert_eq!(
            serde_json::to_value(&segment).unwrap(),
            json!({"id": "s1", "type": "CUE", "content": {"isMedia": true}})
        );
    }
}
