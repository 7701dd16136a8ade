//! Command-line argument definitions for the Runsheet CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Global arguments select the configuration file, the
//! store directory and logging verbosity; the [`Command`] picks the
//! operation applied to the persisted run sheet.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use runsheet::{
    Direction,
    segment::{SegmentContent, SegmentType},
    stage::PropKind,
    templates::Template,
};

/// Command-line arguments for the Runsheet tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Directory holding the persisted run sheet
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Operations on the persisted run sheet.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the run sheet
    Show {
        /// Print the interchange JSON instead of a listing
        #[arg(long)]
        json: bool,
    },

    /// Append an empty segment
    Add {
        /// Segment type (HEADER, NOTE, TIME_BOX, CUE, SPEAKER, DIAGRAM, PAGE_BREAK)
        segment_type: SegmentType,
    },

    /// Insert an empty segment after another one
    InsertAfter {
        id: String,
        segment_type: SegmentType,
    },

    /// Change fields of a segment, keeping the fields not given
    Update {
        id: String,
        #[command(flatten)]
        fields: ContentArgs,
    },

    /// Remove a segment
    Remove { id: String },

    /// Move a segment one position up or down
    Move { id: String, direction: MoveDirection },

    /// Replace the run sheet with the default document
    Reset,

    /// Remove every segment
    Clear,

    /// Load a built-in template, or list them when no name is given
    Template { name: Option<Template> },

    /// Write the run sheet to a JSON file
    Export {
        /// Output path (default: run-sheet-YYYY-MM-DD.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace the run sheet with a .json export or a scanned .pdf
    Import { path: PathBuf },

    /// Edit the props of a stage diagram segment
    #[command(subcommand)]
    Stage(StageCommand),
}

/// Stage diagram edits.
#[derive(Subcommand, Debug)]
pub enum StageCommand {
    /// Drop a new prop at the center of the stage
    Add {
        segment: String,
        #[arg(value_parser = parse_prop_kind)]
        kind: PropKind,
    },

    /// Move a prop to stage coordinates (0-100, clamped)
    Place {
        segment: String,
        item: String,
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
    },

    /// Remove a prop
    Remove { segment: String, item: String },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

impl From<MoveDirection> for Direction {
    fn from(direction: MoveDirection) -> Self {
        match direction {
            MoveDirection::Up => Direction::Up,
            MoveDirection::Down => Direction::Down,
        }
    }
}

/// Content fields settable from the command line.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct ContentArgs {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub subtitle: Option<String>,
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub text: Option<String>,
    #[arg(long)]
    pub time: Option<String>,
    #[arg(long)]
    pub cue_label: Option<String>,
    #[arg(long)]
    pub cue_id: Option<String>,
    #[arg(long)]
    pub cue_desc: Option<String>,
    /// Whether a cue plays media (printed in red)
    #[arg(long)]
    pub media: Option<bool>,
}

impl ContentArgs {
    /// Returns the given fields as a content patch.
    pub fn to_patch(&self) -> SegmentContent {
        SegmentContent {
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            date: self.date.clone(),
            text: self.text.clone(),
            time: self.time.clone(),
            cue_label: self.cue_label.clone(),
            cue_id: self.cue_id.clone(),
            cue_desc: self.cue_desc.clone(),
            is_media: self.media,
            ..SegmentContent::default()
        }
    }
}

fn parse_prop_kind(value: &str) -> Result<PropKind, String> {
    let kind = PropKind::from(value);
    if PropKind::PALETTE.contains(&kind) {
        Ok(kind)
    } else {
        let names: Vec<_> = PropKind::PALETTE.iter().map(PropKind::as_str).collect();
        Err(format!("expected one of: {}", names.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_args_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_update_fields() {
        let args = Args::try_parse_from([
            "runsheet", "update", "abc", "--title", "Assembly", "--media", "false",
        ])
        .unwrap();

        match args.command {
            Command::Update { id, fields } => {
                assert_eq!(id, "abc");
                let patch = fields.to_patch();
                assert_eq!(patch.title.as_deref(), Some("Assembly"));
                assert_eq!(patch.is_media, Some(false));
                assert_eq!(patch.text, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_segment_types() {
        let args = Args::try_parse_from(["runsheet", "add", "time-box"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Add {
                segment_type: SegmentType::TimeBox
            }
        ));
        assert!(Args::try_parse_from(["runsheet", "add", "slide"]).is_err());
    }

    #[test]
    fn test_parse_stage_commands() {
        let args =
            Args::try_parse_from(["runsheet", "stage", "place", "seg", "item", "-5", "120"]).unwrap();
        match args.command {
            Command::Stage(StageCommand::Place { x, y, .. }) => {
                assert_eq!(x, -5.0);
                assert_eq!(y, 120.0);
            }
            other => panic!("unexpected command {other:?}"),
        }

        assert!(Args::try_parse_from(["runsheet", "stage", "add", "seg", "mic-red"]).is_ok());
        assert!(Args::try_parse_from(["runsheet", "stage", "add", "seg", "piano"]).is_err());
    }
}
