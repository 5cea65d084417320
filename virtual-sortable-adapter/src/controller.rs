use alloc::sync::Arc;

use virtual_sortable::{
    Align, DragEvent, DropEvent, Edge, Error, Point, Range, Rect, ScrollEvent, Sortable,
    SortableOptions, UniqueKey, Virtual, VirtualOptions,
};

use crate::{ScrollAnchor, Throttle, apply_anchor, capture_first_visible_anchor};

/// Extracts an item's unique key.
pub type KeyFn<K, T> = Arc<dyn Fn(&T) -> K + Send + Sync>;

/// Default interval between two `Top` (or two `Bottom`) edge signals.
pub const DEFAULT_EDGE_THROTTLE_MS: u64 = 50;

/// List-level behavior that sits on top of the two engines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListOptions {
    /// After a `Top` signal, rows loaded above the viewport do not move the visible content.
    pub keep_offset: bool,
    pub edge_throttle_ms: u64,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            keep_offset: false,
            edge_throttle_ms: DEFAULT_EDGE_THROTTLE_MS,
        }
    }
}

/// A framework-neutral list controller wrapping a [`Virtual`] and a [`Sortable`].
///
/// It owns the items and the key extraction, keeps both engines in sync with the item list and
/// commits drops. It does not hold any UI objects. Adapters drive it by calling:
/// - `set_items` when the data changes
/// - `on_resize` / `on_item_resized` / `on_scroll` when UI events occur
/// - `drag_*`, `tick` and `commit_drop` while the user drags
///
/// and render `rendered()` between spacers of `range().front` and `range().behind`.
pub struct VirtualList<K, T> {
    items: Arc<[T]>,
    key_of: KeyFn<K, T>,
    v: Virtual<K>,
    s: Sortable<K, T>,
    options: ListOptions,
    top: Throttle,
    bottom: Throttle,
    // Captured on a `Top` signal, consumed by the next `set_items`.
    top_anchor: Option<ScrollAnchor<K>>,
}

impl<K: Clone, T: Clone> Clone for VirtualList<K, T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            key_of: Arc::clone(&self.key_of),
            v: self.v.clone(),
            s: self.s.clone(),
            options: self.options,
            top: self.top,
            bottom: self.bottom,
            top_anchor: self.top_anchor.clone(),
        }
    }
}

impl<K: UniqueKey + core::fmt::Debug, T: Clone> core::fmt::Debug for VirtualList<K, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VirtualList")
            .field("len", &self.items.len())
            .field("range", &self.v.range())
            .field("offset", &self.v.offset())
            .field("dragging", &self.s.is_dragging())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<K: UniqueKey, T: Clone> VirtualList<K, T> {
    /// Creates a list with default engine options.
    ///
    /// Use [`Self::update_virtual_options`] and [`Self::update_sortable_options`] to configure
    /// keeps, geometry, drag behavior and callbacks.
    pub fn new(
        items: impl Into<Arc<[T]>>,
        key_of: impl Fn(&T) -> K + Send + Sync + 'static,
        options: ListOptions,
    ) -> Result<Self, Error> {
        let items = items.into();
        let key_of: KeyFn<K, T> = Arc::new(key_of);
        let keys: Arc<[K]> = items.iter().map(|item| key_of(item)).collect();
        let v = Virtual::new(VirtualOptions::new(Arc::clone(&keys)))?;
        let s = Sortable::new(SortableOptions::new(keys, Arc::clone(&items)))?;
        Ok(Self {
            items,
            key_of,
            v,
            s,
            options,
            top: Throttle::new(options.edge_throttle_ms),
            bottom: Throttle::new(options.edge_throttle_ms),
            top_anchor: None,
        })
    }

    pub fn options(&self) -> ListOptions {
        self.options
    }

    pub fn set_options(&mut self, options: ListOptions) {
        if options.edge_throttle_ms != self.options.edge_throttle_ms {
            self.top = Throttle::new(options.edge_throttle_ms);
            self.bottom = Throttle::new(options.edge_throttle_ms);
        }
        if !options.keep_offset {
            self.top_anchor = None;
        }
        self.options = options;
    }

    /// Reconfigures the windowing engine. The key sequence stays owned by the list.
    pub fn update_virtual_options(
        &mut self,
        f: impl FnOnce(&mut VirtualOptions<K>),
    ) -> Result<(), Error> {
        let keys = Arc::clone(self.v.keys());
        self.v.update_options(|o| {
            f(o);
            o.keys = keys;
        })
    }

    /// Reconfigures the reorder engine. Keys and items stay owned by the list.
    pub fn update_sortable_options(
        &mut self,
        f: impl FnOnce(&mut SortableOptions<K, T>),
    ) -> Result<(), Error> {
        let mut next = self.s.options().clone();
        f(&mut next);
        next.keys = Arc::clone(self.v.keys());
        next.items = Arc::clone(&self.items);
        self.s.set_options(next)
    }

    // ---------------------------------------------------------------- queries

    pub fn items(&self) -> &Arc<[T]> {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn virtual_engine(&self) -> &Virtual<K> {
        &self.v
    }

    pub fn sortable(&self) -> &Sortable<K, T> {
        &self.s
    }

    pub fn range(&self) -> Range {
        self.v.range()
    }

    /// The items to render, in order.
    pub fn rendered(&self) -> &[T] {
        &self.items[self.v.range().indices(self.items.len())]
    }

    pub fn size_of_key(&self, key: &K) -> Option<u32> {
        self.v.size_of_key(key)
    }

    pub fn offset(&self) -> u64 {
        self.v.offset()
    }

    pub fn client_size(&self) -> u32 {
        self.v.client_size()
    }

    pub fn scroll_size(&self) -> u64 {
        self.v.scroll_size()
    }

    pub fn is_dragging(&self) -> bool {
        self.s.is_dragging()
    }

    // ---------------------------------------------------------------- data

    /// Replaces the items.
    ///
    /// When `keep_offset` is on and the list grew after a `Top` signal, the viewport is moved so
    /// the rows that were visible stay in place. Returns the offset the scroll container should
    /// adopt in that case.
    pub fn set_items(&mut self, items: impl Into<Arc<[T]>>) -> Result<Option<u64>, Error> {
        let items = items.into();
        let grew = items.len() > self.items.len();
        let keys: Arc<[K]> = items.iter().map(|item| (self.key_of)(item)).collect();

        self.s.set_list(Arc::clone(&keys), Arc::clone(&items))?;
        self.v.set_keys(keys);
        self.items = items;

        let Some(anchor) = self.top_anchor.take() else {
            return Ok(None);
        };
        if !(grew && self.options.keep_offset) {
            return Ok(None);
        }
        let offset = apply_anchor(&mut self.v, &anchor);
        vlog!(debug, ?offset, "keep_offset: re-anchored after top load");
        Ok(offset)
    }

    // ---------------------------------------------------------------- UI events

    pub fn on_resize(&mut self, rect: Rect) {
        self.v.set_viewport(rect);
    }

    /// Forwards a measurement. Measurements of the dragged item are ignored.
    pub fn on_item_resized(&mut self, key: K, size: u32) -> bool {
        self.v.report_size(key, size)
    }

    /// Forwards a scroll event and returns the edge signal it raised, if any.
    ///
    /// `Top` is reported only for a non-empty list and takes precedence over `Bottom`. Each edge
    /// is throttled to one signal per `edge_throttle_ms`.
    pub fn on_scroll(&mut self, offset: u64, now_ms: u64) -> Option<Edge> {
        self.top_anchor = None;
        let event = self.v.on_scroll(offset)?;
        self.edge_signal(event, now_ms)
    }

    fn edge_signal(&mut self, event: ScrollEvent, now_ms: u64) -> Option<Edge> {
        if !self.items.is_empty() && event.top {
            if !self.top.ready(now_ms) {
                return None;
            }
            if self.options.keep_offset {
                self.top_anchor = capture_first_visible_anchor(&self.v);
            }
            vlog!(debug, offset = event.offset, "edge: top");
            return Some(Edge::Top);
        }
        if event.bottom && self.bottom.ready(now_ms) {
            vlog!(debug, offset = event.offset, "edge: bottom");
            return Some(Edge::Bottom);
        }
        None
    }

    // ---------------------------------------------------------------- drag and drop

    pub fn drag_start(&mut self, index: usize) -> Option<DragEvent<K, T>> {
        self.s.on_drag_start(&mut self.v, index)
    }

    /// Accepts an item dragged in from another list.
    pub fn drag_enter(&mut self, item: T) -> bool {
        let key = (self.key_of)(&item);
        self.s.on_drag_enter(&mut self.v, key, item)
    }

    /// Moves the pointer (viewport coordinates) and returns the current drop target.
    pub fn drag_move(&mut self, point: Point) -> Option<usize> {
        self.s.on_drag_move(&self.v, point)
    }

    /// Advances edge auto-scroll by one step. Call it on a timer while dragging.
    pub fn tick(&mut self) -> Option<ScrollEvent> {
        self.s.auto_scroll(&mut self.v)
    }

    /// Ends the drag and, when the order changed, adopts the resulting list.
    pub fn commit_drop(&mut self) -> Option<DropEvent<K, T>> {
        let event = self.s.on_drop(&mut self.v)?;
        if event.changed {
            let list: Arc<[T]> = event.list.as_slice().into();
            // Keys of `list` come from the same extractor; lengths always agree.
            if let Err(_err) = self.set_items(list) {
                vlog!(warn, err = %_err, "drop: could not commit list");
            }
        }
        Some(event)
    }

    pub fn cancel(&mut self) -> bool {
        self.s.on_cancel(&mut self.v)
    }

    // ---------------------------------------------------------------- lifecycle

    /// Resumes after [`Self::deactivate`]. Returns the offset to restore on the scroll container,
    /// or `None` if the list was already active.
    pub fn activate(&mut self) -> Option<u64> {
        if !self.v.attach() {
            return None;
        }
        let offset = self.v.offset();
        vlog!(debug, offset, "activate");
        Some(self.v.scroll_to_offset(offset))
    }

    /// Suspends scroll handling (e.g. while the list is hidden). Returns `false` if already
    /// inactive.
    pub fn deactivate(&mut self) -> bool {
        self.v.detach()
    }

    pub fn destroy(&mut self) {
        self.s.on_cancel(&mut self.v);
        self.v.destroy();
        self.top_anchor = None;
        self.top.reset();
        self.bottom.reset();
    }

    // ---------------------------------------------------------------- commands

    pub fn scroll_to_index(&mut self, index: usize, align: Align) -> u64 {
        self.top_anchor = None;
        self.v.scroll_to_index(index, align)
    }

    pub fn scroll_to_key(&mut self, key: &K, align: Align) -> Option<u64> {
        self.top_anchor = None;
        self.v.scroll_to_key(key, align)
    }

    pub fn scroll_to_offset(&mut self, offset: u64) -> u64 {
        self.top_anchor = None;
        self.v.scroll_to_offset(offset)
    }

    pub fn scroll_to_top(&mut self) -> u64 {
        self.scroll_to_offset(0)
    }

    pub fn scroll_to_bottom(&mut self) -> u64 {
        self.top_anchor = None;
        self.v.scroll_to_bottom()
    }
}
