//! Built-in run sheet templates.
//!
//! Loading a template replaces the whole document. Every segment gets a
//! fresh id on each load, so loading the same template twice never yields
//! two segments sharing an id across versions.

use std::{fmt, str::FromStr};

use thiserror::Error;

use runsheet_core::{
    identifier::SegmentId,
    segment::{Segment, SegmentContent, SegmentType},
};

/// A named template from the built-in library.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Template {
    /// The empty default document.
    #[default]
    Blank,
    /// A sample morning session of a circuit assembly.
    CircuitAssembly,
}

/// Error returned when a template name is not in the library.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown template `{0}`")]
pub struct UnknownTemplate(pub String);

impl Template {
    /// Every template, in the order they are listed to the operator.
    pub const ALL: [Template; 2] = [Template::Blank, Template::CircuitAssembly];

    /// Returns the template's name.
    pub fn name(self) -> &'static str {
        match self {
            Template::Blank => "blank",
            Template::CircuitAssembly => "circuit-assembly",
        }
    }

    /// Returns a one-line description for listings.
    pub fn description(self) -> &'static str {
        match self {
            Template::Blank => "An empty run sheet",
            Template::CircuitAssembly => "Circuit assembly morning session with music, song and media cue",
        }
    }

    /// Returns the template's segments, each under a fresh id.
    pub fn load(self) -> Vec<Segment> {
        match self {
            Template::Blank => Vec::new(),
            Template::CircuitAssembly => circuit_assembly(),
        }
        .into_iter()
        .map(|segment| segment.with_id(SegmentId::generate()))
        .collect()
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Template {
    type Err = UnknownTemplate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Template::ALL
            .into_iter()
            .find(|template| template.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownTemplate(s.to_string()))
    }
}

fn segment(segment_type: SegmentType, id: &str, content: SegmentContent) -> Segment {
    Segment::new(SegmentId::new(id), segment_type, content)
}

fn time_box(id: &str, time: &str, label: &str) -> Segment {
    segment(
        SegmentType::TimeBox,
        id,
        SegmentContent {
            time: Some(time.to_string()),
            text: Some(label.to_string()),
            ..SegmentContent::default()
        },
    )
}

fn circuit_assembly() -> Vec<Segment> {
    vec![
        segment(
            SegmentType::Header,
            "ca-header",
            SegmentContent {
                title: Some("CIRCUIT ASSEMBLY".to_string()),
                subtitle: Some("WITH BRANCH REPRESENTATIVE | 2025-2026".to_string()),
                date: Some("MORNING SESSION".to_string()),
                ..SegmentContent::default()
            },
        ),
        time_box("ca-music", "9:30", "Music"),
        time_box("ca-song-1", "9:40", "Song No. 73 and Prayer"),
        segment(
            SegmentType::Note,
            "ca-chairman-note",
            SegmentContent {
                text: Some("Chairman waits at the lectern while the song is introduced.".to_string()),
                ..SegmentContent::default()
            },
        ),
        time_box("ca-symposium-intro", "9:50", "Symposium: Maintain Your Joy!"),
        segment(
            SegmentType::Cue,
            "ca-media-cue",
            SegmentContent {
                cue_label: Some("Media".to_string()),
                cue_id: Some("Video 1".to_string()),
                cue_desc: Some("Intro Video".to_string()),
                is_media: Some(true),
                ..SegmentContent::default()
            },
        ),
    ]
}
