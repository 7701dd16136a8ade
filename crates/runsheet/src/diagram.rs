//! Stage diagrams and the pointer gesture state machine that edits them.
//!
//! A [`StageDiagram`] is the item list of one `Diagram` segment, treated as
//! a value like the document itself. The [`GestureMachine`] turns a single
//! pointer's events into new diagram versions:
//!
//! ```text
//!            down (slow)            move
//!   Idle ───────────────► Pressed ───────► Dragging ─┐ move
//!    ▲  ▲                    │                 │  ◄──┘
//!    │  └── down (fast) ─────┤ up / leave      │ up / leave
//!    │      removes item     ▼                 │
//!    └─────────────────────────────────────────┘
//! ```
//!
//! A press that comes within the double-click threshold of the previous
//! press removes the pressed item. The previous press may have been on any
//! item, not necessarily the same one.
//!
//! The machine only sees logical stage coordinates. Rendering surfaces use
//! a [`Viewport`] to convert their pointer positions first.

use std::{
    cell::Cell,
    fmt,
    time::{Duration, Instant},
};

use log::{debug, trace};

use runsheet_core::{
    identifier::{SegmentId, StageItemId},
    segment::Segment,
    stage::{PropKind, StageItem, StagePoint},
};

use crate::document::Document;

/// Default double-click threshold.
pub const DEFAULT_DOUBLE_CLICK: Duration = Duration::from_millis(300);

/// The items of one diagram segment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageDiagram {
    items: Vec<StageItem>,
}

impl StageDiagram {
    pub fn new(items: Vec<StageItem>) -> Self {
        Self { items }
    }

    /// Reads the diagram stored on `segment`.
    ///
    /// A segment without stage items yields an empty diagram.
    pub fn of(segment: &Segment) -> Self {
        Self::new(segment.content().stage_items().to_vec())
    }

    pub fn items(&self) -> &[StageItem] {
        &self.items
    }

    pub fn get(&self, id: &StageItemId) -> Option<&StageItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn contains(&self, id: &StageItemId) -> bool {
        self.get(id).is_some()
    }

    /// Appends a new prop of `kind` at the default drop point.
    pub fn add_item(&self, kind: PropKind) -> Self {
        let item = StageItem::dropped(kind);
        debug!(item_id:% = item.id(), kind:% = item.kind(); "Stage item added");

        let mut items = self.items.clone();
        items.push(item);
        Self { items }
    }

    /// Removes the item `id`. Unknown ids are ignored.
    pub fn remove_item(&self, id: &StageItemId) -> Self {
        Self {
            items: self
                .items
                .iter()
                .filter(|item| item.id() != id)
                .cloned()
                .collect(),
        }
    }

    /// Moves the item `id` to `position`, clamped to the stage area.
    pub fn place_item(&self, id: &StageItemId, position: StagePoint) -> Self {
        Self {
            items: self
                .items
                .iter()
                .map(|item| {
                    if item.id() == id {
                        item.with_position(position)
                    } else {
                        item.clone()
                    }
                })
                .collect(),
        }
    }

    /// Writes this diagram onto the segment `segment_id` of `document`.
    ///
    /// Only the stage items are replaced; every other content field of the
    /// segment is carried over. An unknown segment id leaves the document
    /// unchanged.
    pub fn commit(&self, document: &Document, segment_id: &SegmentId) -> Document {
        let Some(segment) = document.get(segment_id) else {
            return document.clone();
        };

        let mut content = segment.content().clone();
        content.stage_items = Some(self.items.clone());
        document.update(segment_id, content)
    }
}

/// Source of press timestamps.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// The wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Cell::new(Instant::now()),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Where the active pointer is in its gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureState {
    Idle,
    Pressed(StageItemId),
    Dragging(StageItemId),
}

impl GestureState {
    /// Returns the item under the active pointer, if any.
    pub fn item(&self) -> Option<&StageItemId> {
        match self {
            GestureState::Idle => None,
            GestureState::Pressed(id) | GestureState::Dragging(id) => Some(id),
        }
    }
}

impl fmt::Display for GestureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GestureState::Idle => write!(f, "idle"),
            GestureState::Pressed(id) => write!(f, "pressed({id})"),
            GestureState::Dragging(id) => write!(f, "dragging({id})"),
        }
    }
}

/// Single-pointer gesture state machine over a [`StageDiagram`].
///
/// Every event takes the current diagram and returns `Some(next)` when the
/// event changed it, or `None` when the diagram is unchanged. Drags produce
/// a new version on every move.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use runsheet::diagram::{GestureMachine, ManualClock, StageDiagram};
/// use runsheet_core::stage::{PropKind, StagePoint};
///
/// let clock = ManualClock::new();
/// let mut gestures = GestureMachine::new(&clock);
///
/// let diagram = StageDiagram::default().add_item(PropKind::Chair);
/// let chair = diagram.items()[0].id().clone();
///
/// assert!(gestures.pointer_down(&diagram, &chair).is_none());
/// let moved = gestures.pointer_move(&diagram, StagePoint::new(130.0, 20.0)).unwrap();
/// gestures.pointer_up();
/// assert_eq!(moved.items()[0].position(), StagePoint::new(100.0, 20.0));
///
/// // Two quick presses remove the item.
/// clock.advance(Duration::from_secs(1));
/// gestures.pointer_down(&moved, &chair);
/// gestures.pointer_up();
/// clock.advance(Duration::from_millis(120));
/// let removed = gestures.pointer_down(&moved, &chair).unwrap();
/// assert!(removed.items().is_empty());
/// ```
#[derive(Debug)]
pub struct GestureMachine<C> {
    clock: C,
    threshold: Duration,
    state: GestureState,
    last_press: Option<Instant>,
    read_only: bool,
}

impl<C: Clock> GestureMachine<C> {
    /// Creates a machine with the default double-click threshold.
    pub fn new(clock: C) -> Self {
        Self::with_threshold(clock, DEFAULT_DOUBLE_CLICK)
    }

    pub fn with_threshold(clock: C, threshold: Duration) -> Self {
        Self {
            clock,
            threshold,
            state: GestureState::Idle,
            last_press: None,
            read_only: false,
        }
    }

    /// Puts the machine in read-only mode, in which every event is ignored.
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
        if read_only {
            self.state = GestureState::Idle;
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    /// Handles a press on the item `id`.
    ///
    /// Returns the diagram without the item when the press completes a
    /// double-click, `None` otherwise. Presses on items not in `diagram`
    /// are ignored.
    pub fn pointer_down(&mut self, diagram: &StageDiagram, id: &StageItemId) -> Option<StageDiagram> {
        if self.read_only || !diagram.contains(id) {
            return None;
        }

        let now = self.clock.now();
        let is_double_click = self
            .last_press
            .is_some_and(|last| now.saturating_duration_since(last) < self.threshold);

        if is_double_click {
            debug!(item_id:% = id; "Stage item removed by double click");
            self.last_press = None;
            self.state = GestureState::Idle;
            return Some(diagram.remove_item(id));
        }

        trace!(item_id:% = id; "Stage item pressed");
        self.last_press = Some(now);
        self.state = GestureState::Pressed(id.clone());
        None
    }

    /// Handles pointer movement to `point`, in logical coordinates.
    ///
    /// While an item is pressed or dragged, it follows the pointer, clamped
    /// to the stage area. Returns the updated diagram.
    pub fn pointer_move(&mut self, diagram: &StageDiagram, point: StagePoint) -> Option<StageDiagram> {
        if self.read_only {
            return None;
        }
        let id = self.state.item()?.clone();
        if !diagram.contains(&id) {
            self.state = GestureState::Idle;
            return None;
        }

        let position = point.clamped();
        trace!(item_id:% = id, x = position.x(), y = position.y(); "Stage item dragged");
        let next = diagram.place_item(&id, position);
        self.state = GestureState::Dragging(id);
        Some(next)
    }

    /// Handles the pointer being released.
    pub fn pointer_up(&mut self) {
        self.release();
    }

    /// Handles the pointer leaving the diagram bounds.
    pub fn pointer_leave(&mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.state != GestureState::Idle {
            trace!(state:% = self.state; "Gesture released");
        }
        self.state = GestureState::Idle;
    }
}

/// The pixel bounding box a diagram is rendered into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl Viewport {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Converts a device-space pointer position to logical coordinates.
    ///
    /// The result is not clamped; a pointer outside the box maps outside
    /// `[0, 100]`. A degenerate box maps every axis without extent to 0.
    pub fn to_logical(&self, x: f64, y: f64) -> StagePoint {
        StagePoint::new(percent(x - self.left, self.width), percent(y - self.top, self.height))
    }

    /// Converts a logical point back to device space.
    pub fn to_device(&self, point: StagePoint) -> (f64, f64) {
        (
            self.left + point.x() / 100.0 * self.width,
            self.top + point.y() / 100.0 * self.height,
        )
    }
}

fn percent(offset: f64, extent: f64) -> f64 {
    if extent > 0.0 {
        offset / extent * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use proptest::prelude::*;

    use runsheet_core::segment::SegmentType;

    use super::*;

    fn three_props() -> StageDiagram {
        StageDiagram::default()
            .add_item(PropKind::LecternBlue)
            .add_item(PropKind::MicRed)
            .add_item(PropKind::Chair)
    }

    fn id_at(diagram: &StageDiagram, index: usize) -> StageItemId {
        diagram.items()[index].id().clone()
    }

    #[test]
    fn test_add_item_drops_at_center() {
        let diagram = StageDiagram::default().add_item(PropKind::Table);
        let item = &diagram.items()[0];
        assert_eq!(item.kind(), &PropKind::Table);
        assert_approx_eq!(f64, item.position().x(), 50.0);
        assert_approx_eq!(f64, item.position().y(), 50.0);
    }

    #[test]
    fn test_single_press_is_inert() {
        let clock = ManualClock::new();
        let mut gestures = GestureMachine::new(&clock);
        let diagram = three_props();
        let id = id_at(&diagram, 0);

        assert!(gestures.pointer_down(&diagram, &id).is_none());
        assert_eq!(gestures.state(), &GestureState::Pressed(id));
        gestures.pointer_up();
        assert_eq!(gestures.state(), &GestureState::Idle);
    }

    #[test]
    fn test_drag_updates_on_every_move() {
        let clock = ManualClock::new();
        let mut gestures = GestureMachine::new(&clock);
        let diagram = three_props();
        let id = id_at(&diagram, 1);

        gestures.pointer_down(&diagram, &id);
        let first = gestures.pointer_move(&diagram, StagePoint::new(10.0, 20.0)).unwrap();
        let second = gestures.pointer_move(&first, StagePoint::new(15.5, 25.0)).unwrap();
        assert_eq!(gestures.state(), &GestureState::Dragging(id.clone()));

        let item = second.get(&id).unwrap();
        assert_approx_eq!(f64, item.position().x(), 15.5);
        assert_approx_eq!(f64, item.position().y(), 25.0);
        // Other items stay put.
        assert_eq!(second.items()[0], diagram.items()[0]);
        assert_eq!(second.items()[2], diagram.items()[2]);
    }

    #[test]
    fn test_move_without_press_does_nothing() {
        let mut gestures = GestureMachine::new(ManualClock::new());
        assert!(
            gestures
                .pointer_move(&three_props(), StagePoint::new(1.0, 1.0))
                .is_none()
        );
    }

    #[test]
    fn test_leave_ends_drag() {
        let clock = ManualClock::new();
        let mut gestures = GestureMachine::new(&clock);
        let diagram = three_props();
        let id = id_at(&diagram, 0);

        gestures.pointer_down(&diagram, &id);
        gestures.pointer_move(&diagram, StagePoint::new(0.0, 0.0));
        gestures.pointer_leave();
        assert_eq!(gestures.state(), &GestureState::Idle);
        assert!(gestures.pointer_move(&diagram, StagePoint::new(9.0, 9.0)).is_none());
    }

    #[test]
    fn test_double_click_removes_exactly_one() {
        let clock = ManualClock::new();
        let mut gestures = GestureMachine::new(&clock);
        let diagram = three_props();
        let id = id_at(&diagram, 1);

        gestures.pointer_down(&diagram, &id);
        gestures.pointer_up();
        clock.advance(Duration::from_millis(299));
        let next = gestures.pointer_down(&diagram, &id).unwrap();

        assert_eq!(next.items().len(), 2);
        assert!(!next.contains(&id));
        assert_eq!(next.items()[0], diagram.items()[0]);
        assert_eq!(next.items()[1], diagram.items()[2]);
        assert_eq!(gestures.state(), &GestureState::Idle);
    }

    #[test]
    fn test_slow_second_press_does_not_remove() {
        let clock = ManualClock::new();
        let mut gestures = GestureMachine::new(&clock);
        let diagram = three_props();
        let id = id_at(&diagram, 0);

        gestures.pointer_down(&diagram, &id);
        gestures.pointer_up();
        clock.advance(DEFAULT_DOUBLE_CLICK);
        assert!(gestures.pointer_down(&diagram, &id).is_none());
        assert_eq!(gestures.state(), &GestureState::Pressed(id));
    }

    #[test]
    fn test_quick_press_on_other_item_removes_it() {
        let clock = ManualClock::new();
        let mut gestures = GestureMachine::new(&clock);
        let diagram = three_props();
        let first = id_at(&diagram, 0);
        let second = id_at(&diagram, 2);

        gestures.pointer_down(&diagram, &first);
        gestures.pointer_up();
        clock.advance(Duration::from_millis(50));
        let next = gestures.pointer_down(&diagram, &second).unwrap();

        assert!(next.contains(&first));
        assert!(!next.contains(&second));
    }

    #[test]
    fn test_removal_resets_double_click_window() {
        let clock = ManualClock::new();
        let mut gestures = GestureMachine::new(&clock);
        let diagram = three_props();
        let a = id_at(&diagram, 0);
        let b = id_at(&diagram, 1);

        gestures.pointer_down(&diagram, &a);
        clock.advance(Duration::from_millis(10));
        let diagram = gestures.pointer_down(&diagram, &a).unwrap();
        clock.advance(Duration::from_millis(10));
        // A third quick press starts a fresh gesture instead of removing.
        assert!(gestures.pointer_down(&diagram, &b).is_none());
        assert_eq!(diagram.items().len(), 2);
    }

    #[test]
    fn test_configurable_threshold() {
        let clock = ManualClock::new();
        let mut gestures = GestureMachine::with_threshold(&clock, Duration::from_millis(50));
        let diagram = three_props();
        let id = id_at(&diagram, 0);

        gestures.pointer_down(&diagram, &id);
        clock.advance(Duration::from_millis(100));
        assert!(gestures.pointer_down(&diagram, &id).is_none());
    }

    #[test]
    fn test_read_only_ignores_everything() {
        let clock = ManualClock::new();
        let mut gestures = GestureMachine::new(&clock).read_only(true);
        let diagram = three_props();
        let id = id_at(&diagram, 0);

        assert!(gestures.pointer_down(&diagram, &id).is_none());
        assert!(gestures.pointer_down(&diagram, &id).is_none());
        assert!(gestures.pointer_move(&diagram, StagePoint::new(3.0, 3.0)).is_none());
        assert_eq!(gestures.state(), &GestureState::Idle);
    }

    #[test]
    fn test_press_on_unknown_item_is_ignored() {
        let mut gestures = GestureMachine::new(ManualClock::new());
        let diagram = three_props();
        assert!(
            gestures
                .pointer_down(&diagram, &StageItemId::new("ghost"))
                .is_none()
        );
        assert_eq!(gestures.state(), &GestureState::Idle);
    }

    #[test]
    fn test_commit_keeps_other_content() {
        let document = Document::default().add(SegmentType::Diagram);
        let segment_id = document.segments()[0].id().clone();
        let diagram = StageDiagram::of(&document.segments()[0]).add_item(PropKind::StandBlue);

        let committed = diagram.commit(&document, &segment_id);
        let content = committed.get(&segment_id).unwrap().content();
        assert_eq!(content.stage_items(), diagram.items());
        assert_eq!(committed.version(), document.version() + 1);

        let untouched = diagram.commit(&document, &SegmentId::new("missing"));
        assert_eq!(untouched, document);
    }

    #[test]
    fn test_viewport_maps_percentages() {
        let viewport = Viewport::new(100.0, 50.0, 400.0, 200.0);

        let point = viewport.to_logical(300.0, 100.0);
        assert_approx_eq!(f64, point.x(), 50.0);
        assert_approx_eq!(f64, point.y(), 25.0);

        let outside = viewport.to_logical(0.0, 300.0);
        assert_approx_eq!(f64, outside.x(), -25.0);
        assert_approx_eq!(f64, outside.y(), 125.0);

        let (x, y) = viewport.to_device(StagePoint::new(50.0, 25.0));
        assert_approx_eq!(f64, x, 300.0);
        assert_approx_eq!(f64, y, 100.0);
    }

    #[test]
    fn test_degenerate_viewport() {
        let point = Viewport::new(0.0, 0.0, 0.0, 10.0).to_logical(5.0, 5.0);
        assert_approx_eq!(f64, point.x(), 0.0);
        assert_approx_eq!(f64, point.y(), 50.0);
    }

    fn check_drag_stays_on_stage(
        excursions: &[(f64, f64)],
        viewport: Viewport,
    ) -> Result<(), TestCaseError> {
        let clock = ManualClock::new();
        let mut gestures = GestureMachine::new(&clock);
        let mut diagram = three_props();
        let id = id_at(&diagram, 0);

        gestures.pointer_down(&diagram, &id);
        for &(x, y) in excursions {
            if let Some(next) = gestures.pointer_move(&diagram, viewport.to_logical(x, y)) {
                diagram = next;
            }
            for item in diagram.items() {
                prop_assert!(item.position().is_on_stage());
            }
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn drag_stays_on_stage(
            excursions in proptest::collection::vec((-5000.0f64..5000.0, -5000.0f64..5000.0), 1..40),
            left in -100.0f64..100.0,
            top in -100.0f64..100.0,
            width in 1.0f64..2000.0,
            height in 1.0f64..2000.0,
        ) {
            check_drag_stays_on_stage(&excursions, Viewport::new(left, top, width, height))?;
        }
    }
}
