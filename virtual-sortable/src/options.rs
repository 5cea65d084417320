use alloc::sync::Arc;

use crate::sortable::{DragEvent, DropEvent};
use crate::{Axis, Error, RangeUpdate, Rect, ScrollEvent};

/// Fired whenever the rendered range (or its paddings) changes.
pub type OnUpdateCallback = Arc<dyn Fn(RangeUpdate) + Send + Sync>;

/// Fired for every accepted scroll event, with edge flags.
pub type OnScrollCallback = Arc<dyn Fn(ScrollEvent) + Send + Sync>;

/// Fired when a drag session opens on an item of this list.
pub type OnDragCallback<K, T> = Arc<dyn Fn(&DragEvent<K, T>) + Send + Sync>;

/// Fired when a drag session is dropped.
pub type OnDropCallback<K, T> = Arc<dyn Fn(&DropEvent<K, T>) + Send + Sync>;

/// Number of items kept rendered when the caller does not say otherwise.
pub const DEFAULT_KEEPS: usize = 30;

/// Estimated item size used before anything is measured.
pub const DEFAULT_ESTIMATED_SIZE: u32 = 50;

/// Configuration for [`crate::Virtual`].
///
/// Cheap to clone: keys and callbacks live behind `Arc`s, so adapters can tweak a field and call
/// `Virtual::set_options` without copying the key sequence.
pub struct VirtualOptions<K> {
    /// The unique key of every item, in list order.
    pub keys: Arc<[K]>,

    /// How many items to keep rendered (before the viewport asks for more).
    pub keeps: usize,

    /// Items over-rendered beyond each visible edge. `None` means `ceil(keeps / 3)`.
    pub buffer: Option<usize>,

    /// Size assumed for unmeasured items until the first measurement arrives.
    pub estimated_size: u32,

    pub axis: Axis,

    /// Distance from an edge at which `top`/`bottom` are reported.
    pub edge_threshold: u32,

    /// The viewport geometry known at construction time.
    pub initial_rect: Option<Rect>,

    pub initial_offset: u64,

    pub on_update: Option<OnUpdateCallback>,

    pub on_scroll: Option<OnScrollCallback>,
}

impl<K> Clone for VirtualOptions<K> {
    fn clone(&self) -> Self {
        Self {
            keys: Arc::clone(&self.keys),
            keeps: self.keeps,
            buffer: self.buffer,
            estimated_size: self.estimated_size,
            axis: self.axis,
            edge_threshold: self.edge_threshold,
            initial_rect: self.initial_rect,
            initial_offset: self.initial_offset,
            on_update: self.on_update.clone(),
            on_scroll: self.on_scroll.clone(),
        }
    }
}

impl<K> VirtualOptions<K> {
    pub fn new(keys: impl Into<Arc<[K]>>) -> Self {
        Self {
            keys: keys.into(),
            keeps: DEFAULT_KEEPS,
            buffer: None,
            estimated_size: DEFAULT_ESTIMATED_SIZE,
            axis: Axis::Vertical,
            edge_threshold: 0,
            initial_rect: None,
            initial_offset: 0,
            on_update: None,
            on_scroll: None,
        }
    }

    /// The effective buffer: the configured value or `ceil(keeps / 3)`.
    pub fn buffer(&self) -> usize {
        self.buffer.unwrap_or_else(|| self.keeps.div_ceil(3))
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.keeps == 0 {
            return Err(Error::InvalidKeeps(self.keeps));
        }
        let buffer = self.buffer();
        if buffer == 0 {
            return Err(Error::InvalidBuffer(buffer));
        }
        Ok(())
    }

    pub fn with_keys(mut self, keys: impl Into<Arc<[K]>>) -> Self {
        self.keys = keys.into();
        self
    }

    pub fn with_keeps(mut self, keeps: usize) -> Self {
        self.keeps = keeps;
        self
    }

    pub fn with_buffer(mut self, buffer: usize) -> Self {
        self.buffer = Some(buffer);
        self
    }

    pub fn with_estimated_size(mut self, estimated_size: u32) -> Self {
        self.estimated_size = estimated_size;
        self
    }

    pub fn with_axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }

    pub fn with_edge_threshold(mut self, edge_threshold: u32) -> Self {
        self.edge_threshold = edge_threshold;
        self
    }

    pub fn with_initial_rect(mut self, initial_rect: Option<Rect>) -> Self {
        self.initial_rect = initial_rect;
        self
    }

    pub fn with_initial_offset(mut self, initial_offset: u64) -> Self {
        self.initial_offset = initial_offset;
        self
    }

    pub fn with_on_update(
        mut self,
        on_update: Option<impl Fn(RangeUpdate) + Send + Sync + 'static>,
    ) -> Self {
        self.on_update = on_update.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_on_scroll(
        mut self,
        on_scroll: Option<impl Fn(ScrollEvent) + Send + Sync + 'static>,
    ) -> Self {
        self.on_scroll = on_scroll.map(|f| Arc::new(f) as _);
        self
    }
}

impl<K> core::fmt::Debug for VirtualOptions<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VirtualOptions")
            .field("len", &self.keys.len())
            .field("keeps", &self.keeps)
            .field("buffer", &self.buffer)
            .field("estimated_size", &self.estimated_size)
            .field("axis", &self.axis)
            .field("edge_threshold", &self.edge_threshold)
            .field("initial_rect", &self.initial_rect)
            .field("initial_offset", &self.initial_offset)
            .finish_non_exhaustive()
    }
}

/// Edge auto-scroll while dragging: a fixed `speed` per tick whenever the pointer is within
/// `threshold` of the viewport start or end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AutoScroll {
    pub enabled: bool,
    pub speed: u32,
    pub threshold: u32,
}

impl Default for AutoScroll {
    fn default() -> Self {
        Self {
            enabled: true,
            speed: 10,
            threshold: 55,
        }
    }
}

/// Configuration for [`crate::Sortable`].
pub struct SortableOptions<K, T> {
    /// Keys of `items`, index for index.
    pub keys: Arc<[K]>,
    pub items: Arc<[T]>,

    /// Whether dragging reorders the list. When `false` an item can still be picked up (and
    /// dropped into another list), but the list neither reorders nor scrolls during the drag.
    pub sortable: bool,

    /// Disables drag sessions entirely.
    pub disabled: bool,

    pub auto_scroll: AutoScroll,

    pub on_drag: Option<OnDragCallback<K, T>>,
    pub on_drop: Option<OnDropCallback<K, T>>,
}

impl<K, T> Clone for SortableOptions<K, T> {
    fn clone(&self) -> Self {
        Self {
            keys: Arc::clone(&self.keys),
            items: Arc::clone(&self.items),
            sortable: self.sortable,
            disabled: self.disabled,
            auto_scroll: self.auto_scroll,
            on_drag: self.on_drag.clone(),
            on_drop: self.on_drop.clone(),
        }
    }
}

impl<K, T> SortableOptions<K, T> {
    pub fn new(keys: impl Into<Arc<[K]>>, items: impl Into<Arc<[T]>>) -> Self {
        Self {
            keys: keys.into(),
            items: items.into(),
            sortable: true,
            disabled: false,
            auto_scroll: AutoScroll::default(),
            on_drag: None,
            on_drop: None,
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.keys.len() != self.items.len() {
            return Err(Error::LengthMismatch {
                keys: self.keys.len(),
                items: self.items.len(),
            });
        }
        Ok(())
    }

    pub fn with_sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn with_auto_scroll(mut self, auto_scroll: AutoScroll) -> Self {
        self.auto_scroll = auto_scroll;
        self
    }

    pub fn with_on_drag(
        mut self,
        on_drag: Option<impl Fn(&DragEvent<K, T>) + Send + Sync + 'static>,
    ) -> Self {
        self.on_drag = on_drag.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_on_drop(
        mut self,
        on_drop: Option<impl Fn(&DropEvent<K, T>) + Send + Sync + 'static>,
    ) -> Self {
        self.on_drop = on_drop.map(|f| Arc::new(f) as _);
        self
    }
}

impl<K, T> core::fmt::Debug for SortableOptions<K, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SortableOptions")
            .field("len", &self.items.len())
            .field("sortable", &self.sortable)
            .field("disabled", &self.disabled)
            .field("auto_scroll", &self.auto_scroll)
            .finish_non_exhaustive()
    }
}
