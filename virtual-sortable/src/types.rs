/// Where a scrolled-to item should land in the viewport.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Align {
    /// Item start at the viewport start.
    #[default]
    Top,
    /// Item end at the viewport end.
    Bottom,
    /// Only scroll when the item is not fully visible, to the nearer edge.
    Auto,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Axis {
    #[default]
    Vertical,
    Horizontal,
}

impl Axis {
    /// Splits a point into `(main, cross)` coordinates for this axis.
    pub fn split(self, point: Point) -> (i64, i64) {
        match self {
            Self::Vertical => (point.y, point.x),
            Self::Horizontal => (point.x, point.y),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollDirection {
    Forward,
    Backward,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Edge {
    Top,
    Bottom,
}

/// Viewport geometry. `main` runs along the scroll axis, `cross` across it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub main: u32,
    pub cross: u32,
}

/// A pointer position relative to the viewport's top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// The window of items to render plus the spacer lengths around it.
///
/// `start` and `end` are inclusive. `front` is the combined size of every item before `start`,
/// `behind` of every item after `end`. For an empty list all fields are zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    pub start: usize,
    pub end: usize,
    pub front: u64,
    pub behind: u64,
}

impl Range {
    /// The indexes to render for a list of `count` items.
    pub fn indices(&self, count: usize) -> core::ops::Range<usize> {
        let end = self.end.saturating_add(1).min(count);
        self.start.min(end)..end
    }

    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index <= self.end
    }

    fn same_window(&self, other: &Self) -> bool {
        self.start == other.start && self.end == other.end
    }
}

/// Why a range update was produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UpdateCause {
    /// A user or programmatic scroll.
    Scroll,
    /// Auto-scroll driven by an open drag session.
    DragScroll,
    /// The viewport was resized.
    Resize,
    /// The key sequence (list length or content) changed.
    Data,
    /// An item was measured.
    Measure,
    /// Options were reconfigured.
    Options,
}

/// Payload of the `on_update` callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RangeUpdate {
    pub range: Range,
    /// Whether `start`/`end` moved. Padding-only updates report `false`.
    pub changed: bool,
    /// Set while a drag session excludes an item from layout.
    pub dragging: bool,
    pub cause: UpdateCause,
}

impl RangeUpdate {
    pub(crate) fn new(prev: &Range, range: Range, dragging: bool, cause: UpdateCause) -> Self {
        Self {
            range,
            changed: !prev.same_window(&range),
            dragging,
            cause,
        }
    }
}

/// Payload of the `on_scroll` callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollEvent {
    pub offset: u64,
    pub direction: Option<ScrollDirection>,
    /// The offset is within the edge threshold of the start.
    pub top: bool,
    /// The viewport end is within the edge threshold of the scroll size.
    pub bottom: bool,
}

impl ScrollEvent {
    /// The edges reached by this event, top first.
    pub fn edges(&self) -> impl Iterator<Item = Edge> {
        let top = self.top.then_some(Edge::Top);
        let bottom = self.bottom.then_some(Edge::Bottom);
        top.into_iter().chain(bottom)
    }
}
