//! Stage props and the normalized stage coordinate space.
//!
//! A stage diagram places props on a fixed-aspect stage silhouette. Positions
//! are expressed in a logical coordinate space that is independent of any
//! rendering surface:
//!
//! ```text
//!   (0,0) ──────────────► (100,0)
//!     │   stage right        stage left
//!     │
//!     ▼
//!   (0,100)      downstage / front
//! ```
//!
//! Both axes are percentages of the diagram area. A [`StagePoint`] may hold
//! any value (a pointer can wander outside the diagram); a [`StageItem`]
//! always stores a position clamped to `[0, 100]` on both axes.

use std::{convert::Infallible, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::identifier::StageItemId;

/// Lower bound of the logical stage coordinate space.
pub const STAGE_MIN: f64 = 0.0;

/// Upper bound of the logical stage coordinate space.
pub const STAGE_MAX: f64 = 100.0;

/// Where freshly added props are dropped before the operator moves them.
pub const DEFAULT_DROP_POINT: StagePoint = StagePoint { x: 50.0, y: 50.0 };

/// A point in logical stage coordinates.
///
/// The point is not clamped on construction; use [`StagePoint::clamped`]
/// before storing it on an item.
///
/// # Examples
///
/// ```
/// # use runsheet_core::stage::StagePoint;
/// let outside = StagePoint::new(-12.0, 140.0);
/// let inside = outside.clamped();
/// assert_eq!(inside.x(), 0.0);
/// assert_eq!(inside.y(), 100.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StagePoint {
    x: f64,
    y: f64,
}

impl StagePoint {
    /// Creates a new point with the specified logical coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate (percent of diagram width).
    pub fn x(self) -> f64 {
        self.x
    }

    /// Returns the y-coordinate (percent of diagram height).
    pub fn y(self) -> f64 {
        self.y
    }

    /// Returns this point clamped into the stage area.
    ///
    /// Non-finite coordinates are pulled into range as well: `NaN` becomes
    /// [`STAGE_MIN`] and infinities saturate at the nearest bound.
    pub fn clamped(self) -> Self {
        Self {
            x: clamp_axis(self.x),
            y: clamp_axis(self.y),
        }
    }

    /// Returns `true` if both coordinates already lie within the stage area.
    pub fn is_on_stage(self) -> bool {
        (STAGE_MIN..=STAGE_MAX).contains(&self.x) && (STAGE_MIN..=STAGE_MAX).contains(&self.y)
    }
}

fn clamp_axis(value: f64) -> f64 {
    if value.is_nan() {
        STAGE_MIN
    } else {
        value.clamp(STAGE_MIN, STAGE_MAX)
    }
}

/// The kind of prop placed on a stage diagram.
///
/// The set is closed for the editing surface, but kinds read from a file
/// that this version does not know are kept as [`PropKind::Other`] so they
/// survive a load/save cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PropKind {
    LecternBlue,
    StandBlue,
    MicGrey,
    MicYellow,
    MicRed,
    MicBlue,
    Chair,
    Table,
    /// A prop kind this version does not recognize.
    Other(String),
}

impl PropKind {
    /// All props the editing surface offers, in toolbar order.
    pub const PALETTE: [PropKind; 8] = [
        PropKind::StandBlue,
        PropKind::LecternBlue,
        PropKind::MicGrey,
        PropKind::MicYellow,
        PropKind::MicRed,
        PropKind::MicBlue,
        PropKind::Chair,
        PropKind::Table,
    ];

    /// Returns the wire name of this prop kind.
    pub fn as_str(&self) -> &str {
        match self {
            PropKind::LecternBlue => "lectern-blue",
            PropKind::StandBlue => "stand-blue",
            PropKind::MicGrey => "mic-grey",
            PropKind::MicYellow => "mic-yellow",
            PropKind::MicRed => "mic-red",
            PropKind::MicBlue => "mic-blue",
            PropKind::Chair => "chair",
            PropKind::Table => "table",
            PropKind::Other(name) => name,
        }
    }

    /// Returns `true` for any of the colored microphones.
    pub fn is_microphone(&self) -> bool {
        matches!(
            self,
            PropKind::MicGrey | PropKind::MicYellow | PropKind::MicRed | PropKind::MicBlue
        )
    }
}

impl From<&str> for PropKind {
    fn from(name: &str) -> Self {
        match name {
            "lectern-blue" => PropKind::LecternBlue,
            "stand-blue" => PropKind::StandBlue,
            "mic-grey" => PropKind::MicGrey,
            "mic-yellow" => PropKind::MicYellow,
            "mic-red" => PropKind::MicRed,
            "mic-blue" => PropKind::MicBlue,
            "chair" => PropKind::Chair,
            "table" => PropKind::Table,
            other => PropKind::Other(other.to_string()),
        }
    }
}

impl From<String> for PropKind {
    fn from(name: String) -> Self {
        match PropKind::from(name.as_str()) {
            PropKind::Other(_) => PropKind::Other(name),
            known => known,
        }
    }
}

impl From<PropKind> for String {
    fn from(kind: PropKind) -> Self {
        match kind {
            PropKind::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl FromStr for PropKind {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(PropKind::from(s))
    }
}

impl fmt::Display for PropKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A prop placed on a stage diagram.
///
/// The position is always inside the stage area; every constructor and
/// setter clamps, and so does deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "StageItemRecord")]
pub struct StageItem {
    id: StageItemId,
    #[serde(rename = "type")]
    kind: PropKind,
    x: f64,
    y: f64,
}

impl StageItem {
    /// Creates a new item at the given position (clamped).
    pub fn new(id: StageItemId, kind: PropKind, position: StagePoint) -> Self {
        let position = position.clamped();
        Self {
            id,
            kind,
            x: position.x(),
            y: position.y(),
        }
    }

    /// Creates an item with a fresh id at [`DEFAULT_DROP_POINT`].
    pub fn dropped(kind: PropKind) -> Self {
        Self::new(StageItemId::generate(), kind, DEFAULT_DROP_POINT)
    }

    /// Returns the item id.
    pub fn id(&self) -> &StageItemId {
        &self.id
    }

    /// Returns the prop kind.
    pub fn kind(&self) -> &PropKind {
        &self.kind
    }

    /// Returns the item position in logical stage coordinates.
    pub fn position(&self) -> StagePoint {
        StagePoint::new(self.x, self.y)
    }

    /// Returns a copy of this item moved to `position` (clamped).
    pub fn with_position(&self, position: StagePoint) -> Self {
        Self::new(self.id.clone(), self.kind.clone(), position)
    }

    /// Returns a copy of this item under a different id.
    pub fn with_id(&self, id: StageItemId) -> Self {
        Self {
            id,
            ..self.clone()
        }
    }
}

/// Unvalidated wire shape of a [`StageItem`].
#[derive(Deserialize)]
struct StageItemRecord {
    id: StageItemId,
    #[serde(rename = "type")]
    kind: PropKind,
    x: f64,
    y: f64,
}

impl From<StageItemRecord> for StageItem {
    fn from(record: StageItemRecord) -> Self {
        StageItem::new(record.id, record.kind, StagePoint::new(record.x, record.y))
    }
}
