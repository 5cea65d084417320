use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::Cell;
use core::cmp;

use crate::fenwick::{Fenwick, Span};
use crate::key::{KeyMap, UniqueKey};
use crate::ledger::SizeLedger;
use crate::state::ViewportState;
use crate::{
    Align, Error, Range, RangeUpdate, Rect, ScrollDirection, ScrollEvent, UpdateCause,
    VirtualOptions,
};

/// The windowing engine.
///
/// `Virtual` answers "which indexes should be rendered, and how long are the spacers around
/// them" for a list whose item sizes are only known after they have been rendered once.
///
/// It holds no UI objects. The presentation layer drives it with:
/// - the key sequence (`set_keys`)
/// - viewport geometry (`set_viewport`)
/// - scroll offsets (`on_scroll`)
/// - measurements (`report_size`)
///
/// and renders `range()` with `front`/`behind` spacers.
#[derive(Clone, Debug)]
pub struct Virtual<K> {
    options: VirtualOptions<K>,
    index: KeyMap<K, usize>,
    ledger: SizeLedger<K>,
    sums: Fenwick,

    offset: u64,
    rect: Rect,
    direction: Option<ScrollDirection>,
    range: Range,

    scroll_enabled: bool,
    attached: bool,
    excluded: Option<K>,
    // Every rendered item has been measured at least once since the list was filled.
    settled: bool,
    // `scroll_to_bottom` keeps following the bottom while measurements grow the list.
    pin_bottom: bool,

    notify_depth: Cell<usize>,
    notify_pending: Cell<Option<RangeUpdate>>,
}

impl<K: UniqueKey> Virtual<K> {
    /// Creates an engine from options, rejecting a zero `keeps` or `buffer`.
    pub fn new(options: VirtualOptions<K>) -> Result<Self, Error> {
        options.validate()?;
        vlog!(
            debug,
            len = options.keys.len(),
            keeps = options.keeps,
            buffer = options.buffer(),
            "Virtual::new"
        );
        let mut v = Self {
            index: KeyMap::new(),
            ledger: SizeLedger::new(options.estimated_size),
            sums: Fenwick::default(),
            offset: options.initial_offset,
            rect: options.initial_rect.unwrap_or_default(),
            direction: None,
            range: Range::default(),
            scroll_enabled: true,
            attached: true,
            excluded: None,
            settled: false,
            pin_bottom: false,
            notify_depth: Cell::new(0),
            notify_pending: Cell::new(None),
            options,
        };
        v.rebuild_index();
        v.rebuild_sums();
        v.range = v.fresh_range();
        Ok(v)
    }

    pub fn options(&self) -> &VirtualOptions<K> {
        &self.options
    }

    /// Applies new options. Geometry-affecting changes recompute the range.
    ///
    /// A new key sequence goes through the same length policy as [`Self::set_keys`].
    pub fn set_options(&mut self, options: VirtualOptions<K>) -> Result<(), Error> {
        options.validate()?;
        let keys_changed = !Arc::ptr_eq(&self.options.keys, &options.keys);
        let geometry_changed = self.options.keeps != options.keeps
            || self.options.buffer() != options.buffer()
            || self.options.estimated_size != options.estimated_size;

        let prev = core::mem::replace(&mut self.options, options);
        let next_keys = core::mem::replace(&mut self.options.keys, prev.keys);
        self.ledger.set_fallback(self.options.estimated_size);
        vlog!(
            trace,
            keeps = self.options.keeps,
            buffer = self.options.buffer(),
            keys_changed,
            geometry_changed,
            "Virtual::set_options"
        );

        self.batch_update(|v| {
            if keys_changed {
                v.set_keys(next_keys);
            }
            if geometry_changed {
                let range = v.fresh_range();
                v.apply(range, UpdateCause::Options, true);
            }
        });
        Ok(())
    }

    /// Clones the current options, applies `f`, then delegates to `set_options`.
    pub fn update_options(&mut self, f: impl FnOnce(&mut VirtualOptions<K>)) -> Result<(), Error> {
        let mut next = self.options.clone();
        f(&mut next);
        self.set_options(next)
    }

    /// Batches range notifications raised inside `f` into a single `on_update` call.
    pub fn batch_update(&mut self, f: impl FnOnce(&mut Self)) {
        let depth = self.notify_depth.get();
        self.notify_depth.set(depth.saturating_add(1));

        f(self);

        let depth = self.notify_depth.get();
        debug_assert!(depth > 0, "notify_depth underflow");
        let next = depth.saturating_sub(1);
        self.notify_depth.set(next);

        if next == 0 {
            if let Some(update) = self.notify_pending.take() {
                self.notify_now(update);
            }
        }
    }

    fn notify_now(&self, update: RangeUpdate) {
        if let Some(cb) = &self.options.on_update {
            cb(update);
        }
    }

    fn notify(&self, update: RangeUpdate) {
        if self.notify_depth.get() > 0 {
            let merged = match self.notify_pending.get() {
                Some(prev) => RangeUpdate {
                    changed: prev.changed || update.changed,
                    ..update
                },
                None => update,
            };
            self.notify_pending.set(Some(merged));
            return;
        }
        self.notify_now(update);
    }

    // ---------------------------------------------------------------- queries

    pub fn len(&self) -> usize {
        self.options.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.keys.is_empty()
    }

    pub fn keys(&self) -> &Arc<[K]> {
        &self.options.keys
    }

    pub fn key_at(&self, index: usize) -> Option<&K> {
        self.options.keys.get(index)
    }

    pub fn index_of(&self, key: &K) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn keeps(&self) -> usize {
        self.options.keeps
    }

    pub fn buffer(&self) -> usize {
        self.options.buffer()
    }

    pub fn range(&self) -> Range {
        self.range
    }

    pub fn ledger(&self) -> &SizeLedger<K> {
        &self.ledger
    }

    /// The measured size of `key`, if it has been reported.
    pub fn size_of_key(&self, key: &K) -> Option<u32> {
        self.ledger.get(key)
    }

    /// The size used for `index`: its measurement, or the estimate.
    pub fn size_of(&self, index: usize) -> Option<u32> {
        let key = self.options.keys.get(index)?;
        Some(self.ledger.size_or_estimate(key))
    }

    pub fn is_measured(&self, index: usize) -> bool {
        self.options
            .keys
            .get(index)
            .is_some_and(|k| self.ledger.contains(k))
    }

    /// The estimate currently used for unmeasured items.
    pub fn average_size(&self) -> u32 {
        self.ledger.average()
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn client_size(&self) -> u32 {
        self.rect.main
    }

    /// Total scrollable length: measured sizes plus the estimate for everything else.
    pub fn scroll_size(&self) -> u64 {
        self.sums.total().length(self.ledger.average())
    }

    pub fn max_offset(&self) -> u64 {
        self.scroll_size()
            .saturating_sub(self.rect.main as u64)
    }

    pub fn direction(&self) -> Option<ScrollDirection> {
        self.direction
    }

    /// Start offset of `index` (the sum of every size before it). Clamped to the list length.
    pub fn offset_of(&self, index: usize) -> u64 {
        self.sums.prefix(index).length(self.ledger.average())
    }

    /// The index of the item covering `offset`, clamped to the last item.
    pub fn index_at_offset(&self, offset: u64) -> Option<usize> {
        let last = self.len().checked_sub(1)?;
        let consumed = self.sums.lower_bound(offset, self.ledger.average());
        Some(consumed.min(last))
    }

    pub fn is_reached_top(&self) -> bool {
        self.offset <= self.options.edge_threshold as u64
    }

    pub fn is_reached_bottom(&self) -> bool {
        let end = self.offset.saturating_add(self.rect.main as u64);
        end >= self
            .scroll_size()
            .saturating_sub(self.options.edge_threshold as u64)
    }

    pub fn is_scroll_enabled(&self) -> bool {
        self.scroll_enabled
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// The key currently excluded from layout by a drag session.
    pub fn excluded_key(&self) -> Option<&K> {
        self.excluded.as_ref()
    }

    pub fn viewport_state(&self) -> ViewportState {
        ViewportState {
            offset: self.offset,
            client_size: self.rect.main,
            scroll_size: self.scroll_size(),
            reached_top: self.is_reached_top(),
            reached_bottom: self.is_reached_bottom(),
        }
    }

    // ---------------------------------------------------------------- inputs

    /// Replaces the key sequence.
    ///
    /// Measurements of keys that are no longer present are evicted. Length policy:
    /// - same length: the window stays where it is, paddings are refreshed;
    /// - the list grew while the window ended on the old last item and the viewport sat at the
    ///   bottom: the window start moves forward by one so the view stays anchored;
    /// - otherwise the range is recomputed from the current offset.
    pub fn set_keys(&mut self, keys: impl Into<Arc<[K]>>) {
        let old_len = self.len();
        let prev = self.range;
        let was_bottom = self.is_reached_bottom();

        self.options.keys = keys.into();
        self.rebuild_index();
        let index = &self.index;
        let _evicted = self.ledger.retain(|k| index.contains_key(k));
        self.rebuild_sums();
        self.clamp_offset();

        let new_len = self.len();
        vlog!(debug, old_len, new_len, evicted = _evicted, "Virtual::set_keys");
        if old_len == 0 {
            self.settled = false;
        }
        if old_len != new_len {
            // A new sequence ends the bottom follow started by `scroll_to_bottom`.
            self.pin_bottom = false;
        }

        if new_len == 0 {
            self.apply(Range::default(), UpdateCause::Data, old_len != 0);
            return;
        }

        if old_len == new_len {
            let (start, end) = self.pad(prev.start, prev.end.max(prev.start));
            let range = self.range_for(start, end);
            self.apply(range, UpdateCause::Data, false);
            return;
        }

        let mut candidate = prev;
        if old_len > self.options.keeps
            && new_len > old_len
            && prev.end == old_len - 1
            && was_bottom
        {
            candidate.start += 1;
        }
        self.update_range_with(candidate, UpdateCause::Data);
    }

    /// Applies a candidate window start (used when the list changes out of band).
    ///
    /// The end is derived from `keeps` and the visible items. If the candidate no longer covers
    /// the viewport, the range is recomputed from the current offset instead. Always notifies.
    pub fn update_range(&mut self, candidate: Range) {
        self.update_range_with(candidate, UpdateCause::Data);
    }

    fn update_range_with(&mut self, candidate: Range, cause: UpdateCause) {
        let Some((first, last)) = self.visible_bounds() else {
            self.apply(Range::default(), cause, true);
            return;
        };
        let last_index = self.len() - 1;
        let start = candidate.start.min(last_index);
        let end = start
            .saturating_add(self.options.keeps - 1)
            .max(last)
            .min(last_index);
        let (mut start, mut end) = self.pad(start, end);
        if start > first {
            (start, end) = self.window(first, last);
        }
        let range = self.range_for(start, end);
        self.apply(range, cause, true);
    }

    /// Updates the viewport geometry.
    pub fn set_viewport(&mut self, rect: Rect) {
        if self.rect == rect {
            return;
        }
        vlog!(trace, main = rect.main, cross = rect.cross, "Virtual::set_viewport");
        self.rect = rect;
        self.recompute(None, UpdateCause::Resize, false);
        if self.pin_bottom {
            self.follow_bottom();
        }
    }

    /// Records a measured size for `key`.
    ///
    /// Returns `false` when the report was ignored: the key is excluded by a drag session, or it
    /// is not part of the current key sequence (a late report from a removed item).
    pub fn report_size(&mut self, key: K, size: u32) -> bool {
        if self.excluded.as_ref() == Some(&key) {
            return false;
        }
        let Some(&index) = self.index.get(&key) else {
            vlog!(trace, size, "report_size: unknown key");
            return false;
        };
        if self.ledger.insert(key, size) == Some(size) {
            return true;
        }
        self.sums.set(index, Span::measured(size));

        if !self.settled && self.rendered_all_measured() {
            // The first window was laid out with estimates; redo it with real sizes.
            self.settled = true;
            vlog!(debug, measured = self.ledger.len(), "report_size: first window measured");
            if self.len() > self.options.keeps {
                self.update_range_with(self.range, UpdateCause::Measure);
            } else {
                self.recompute(None, UpdateCause::Measure, false);
            }
        } else {
            self.recompute(None, UpdateCause::Measure, false);
        }

        if self.pin_bottom {
            self.follow_bottom();
        }
        true
    }

    /// Handles a scroll event from the scroll source.
    ///
    /// Returns `None` when scrolling is disabled or the engine is detached; the event is then
    /// ignored entirely.
    pub fn on_scroll(&mut self, offset: u64) -> Option<ScrollEvent> {
        if !self.accepts_scroll() {
            vlog!(trace, offset, "on_scroll ignored");
            return None;
        }
        Some(self.handle_scroll(offset, UpdateCause::Scroll))
    }

    pub(crate) fn handle_scroll(&mut self, offset: u64, cause: UpdateCause) -> ScrollEvent {
        let direction = match offset.cmp(&self.offset) {
            cmp::Ordering::Greater => Some(ScrollDirection::Forward),
            cmp::Ordering::Less => Some(ScrollDirection::Backward),
            cmp::Ordering::Equal => self.direction,
        };
        if offset < self.offset {
            self.pin_bottom = false;
        }
        self.offset = offset;
        self.direction = direction;
        vlog!(trace, offset, ?direction, "handle_scroll");

        let event = ScrollEvent {
            offset,
            direction,
            top: self.is_reached_top(),
            bottom: self.is_reached_bottom(),
        };
        if let Some(cb) = &self.options.on_scroll {
            cb(event);
        }
        self.recompute(direction, cause, false);
        event
    }

    /// Whether scroll events currently mutate offset and range.
    pub fn accepts_scroll(&self) -> bool {
        self.scroll_enabled && self.attached
    }

    /// Freezes (`false`) or unfreezes (`true`) scroll handling.
    pub fn enable_scroll(&mut self, enabled: bool) {
        if self.scroll_enabled == enabled {
            return;
        }
        vlog!(debug, enabled, "enable_scroll");
        self.scroll_enabled = enabled;
        if enabled {
            self.recompute(None, UpdateCause::Scroll, false);
        }
    }

    /// Reconnects the engine to its scroll source. Returns `false` if already attached.
    pub fn attach(&mut self) -> bool {
        if self.attached {
            return false;
        }
        self.attached = true;
        true
    }

    /// Disconnects the engine from its scroll source. Returns `false` if already detached.
    pub fn detach(&mut self) -> bool {
        if !self.attached {
            return false;
        }
        self.attached = false;
        true
    }

    /// Tears the engine down: detaches and forgets measurements and drag state.
    pub fn destroy(&mut self) {
        vlog!(debug, measured = self.ledger.len(), "Virtual::destroy");
        self.detach();
        self.ledger.clear();
        self.rebuild_sums();
        self.range = Range::default();
        self.excluded = None;
        self.settled = false;
        self.pin_bottom = false;
        self.notify_pending.set(None);
    }

    /// Excludes `key` from measurement while it is being dragged. `None` lifts the exclusion.
    pub fn set_excluded_key(&mut self, key: Option<K>) {
        self.excluded = key;
    }

    // ---------------------------------------------------------------- commands

    /// The offset that brings `index` into view with `align`, clamped to the scrollable range.
    pub fn offset_for_index(&self, index: usize, align: Align) -> u64 {
        let Some(last) = self.len().checked_sub(1) else {
            return 0;
        };
        let index = index.min(last);
        let start = self.offset_of(index);
        let end = start.saturating_add(self.size_of(index).unwrap_or(0) as u64);
        let view = self.rect.main as u64;

        let target = match align {
            Align::Top => start,
            Align::Bottom => end.saturating_sub(view),
            Align::Auto => {
                let cur = self.offset;
                let cur_end = cur.saturating_add(view);
                if start >= cur && end <= cur_end {
                    cur
                } else if start < cur {
                    start
                } else {
                    end.saturating_sub(view)
                }
            }
        };
        target.min(self.max_offset())
    }

    /// Scrolls `index` into view. The last index (or anything beyond) scrolls to the bottom.
    ///
    /// Returns the applied offset.
    pub fn scroll_to_index(&mut self, index: usize, align: Align) -> u64 {
        if index.saturating_add(1) >= self.len() {
            return self.scroll_to_bottom();
        }
        let offset = self.offset_for_index(index, align);
        self.scroll_to_offset(offset)
    }

    pub fn scroll_to_key(&mut self, key: &K, align: Align) -> Option<u64> {
        let index = self.index_of(key)?;
        Some(self.scroll_to_index(index, align))
    }

    /// Scrolls to `offset` (clamped). Returns the applied offset.
    pub fn scroll_to_offset(&mut self, offset: u64) -> u64 {
        if !self.accepts_scroll() {
            return self.offset;
        }
        self.pin_bottom = false;
        let target = offset.min(self.max_offset());
        self.handle_scroll(target, UpdateCause::Scroll);
        self.offset
    }

    pub fn scroll_to_top(&mut self) -> u64 {
        self.scroll_to_offset(0)
    }

    /// Scrolls to the end of the list.
    ///
    /// Unmeasured items make the scroll size an estimate, so the engine keeps following the
    /// bottom as measurements arrive until the next backward scroll.
    pub fn scroll_to_bottom(&mut self) -> u64 {
        if !self.accepts_scroll() {
            return self.offset;
        }
        let target = self.max_offset();
        self.handle_scroll(target, UpdateCause::Scroll);
        self.pin_bottom = true;
        self.offset
    }

    /// Scrolls by `delta` on behalf of a drag session.
    pub(crate) fn scroll_by_drag(&mut self, delta: i64) -> Option<ScrollEvent> {
        if !self.attached {
            return None;
        }
        let target = if delta < 0 {
            self.offset.saturating_sub(delta.unsigned_abs())
        } else {
            self.offset.saturating_add(delta as u64)
        }
        .min(self.max_offset());
        if target == self.offset {
            return None;
        }
        Some(self.handle_scroll(target, UpdateCause::DragScroll))
    }

    fn follow_bottom(&mut self) {
        if self.accepts_scroll() && !self.is_reached_bottom() {
            let target = self.max_offset();
            self.handle_scroll(target, UpdateCause::Scroll);
        }
    }

    // ---------------------------------------------------------------- measurement cache

    pub fn measurement_cache_len(&self) -> usize {
        self.ledger.len()
    }

    /// Exports measured sizes (useful for persistence).
    pub fn export_sizes(&self) -> Vec<(K, u32)> {
        self.ledger.export()
    }

    /// Replaces measured sizes. Entries for keys outside the current sequence are dropped.
    pub fn import_sizes(&mut self, entries: impl IntoIterator<Item = (K, u32)>) {
        self.ledger.clear();
        for (k, size) in entries {
            if self.index.contains_key(&k) {
                self.ledger.insert(k, size);
            }
        }
        vlog!(debug, entries = self.ledger.len(), "import_sizes");
        self.rebuild_sums();
        self.clamp_offset();
        self.recompute(None, UpdateCause::Measure, false);
    }

    pub fn reset_measurements(&mut self) {
        self.ledger.clear();
        self.settled = false;
        self.rebuild_sums();
        self.clamp_offset();
        self.recompute(None, UpdateCause::Measure, false);
    }

    // ---------------------------------------------------------------- internals

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (i, k) in self.options.keys.iter().enumerate() {
            self.index.insert(k.clone(), i);
        }
    }

    /// Pulls the offset back inside `0..=max_offset` after the scroll size shrank.
    fn clamp_offset(&mut self) {
        self.offset = self.offset.min(self.max_offset());
    }

    fn rebuild_sums(&mut self) {
        let spans = self
            .options
            .keys
            .iter()
            .map(|k| match self.ledger.get(k) {
                Some(size) => Span::measured(size),
                None => Span::PENDING,
            })
            .collect();
        self.sums = Fenwick::from_spans(spans);
    }

    fn rendered_all_measured(&self) -> bool {
        let indices = self.range.indices(self.len());
        !indices.is_empty()
            && self.options.keys[indices]
                .iter()
                .all(|k| self.ledger.contains(k))
    }

    /// First and last index intersecting the viewport at the current offset.
    fn visible_bounds(&self) -> Option<(usize, usize)> {
        let first = self.index_at_offset(self.offset)?;
        let view = self.rect.main as u64;
        let last = if view == 0 {
            first
        } else {
            self.index_at_offset(self.offset.saturating_add(view - 1))?
        };
        Some((first, last.max(first)))
    }

    /// A window around the visible items, buffered on both sides.
    fn window(&self, first: usize, last: usize) -> (usize, usize) {
        let last_index = self.len().saturating_sub(1);
        let buffer = self.options.buffer();
        let start = first.saturating_sub(buffer);
        let end = start
            .saturating_add(self.options.keeps - 1)
            .max(last.saturating_add(buffer))
            .min(last_index);
        self.pad(start, end)
    }

    /// Near the end of the list, pulls `start` back so at least `keeps` items are rendered.
    fn pad(&self, start: usize, end: usize) -> (usize, usize) {
        let last_index = self.len().saturating_sub(1);
        let end = end.min(last_index);
        let start = start.min(end);
        let wanted = end + 1 - start;
        if wanted < self.options.keeps {
            return ((end + 1).saturating_sub(self.options.keeps), end);
        }
        (start, end)
    }

    /// Whether the current window can stay as-is for the visible items `first..=last`.
    fn keeps_window(&self, first: usize, last: usize, direction: Option<ScrollDirection>) -> bool {
        let cur = self.range;
        if cur.end >= self.len() || cur.start > first || last > cur.end {
            return false;
        }
        let buffer = self.options.buffer();
        match direction {
            Some(ScrollDirection::Forward) => {
                first < cur.start.saturating_add(buffer.saturating_mul(2))
            }
            Some(ScrollDirection::Backward) => first > cur.start || cur.start == 0,
            None => true,
        }
    }

    fn fresh_range(&self) -> Range {
        match self.visible_bounds() {
            Some((first, last)) => {
                let (start, end) = self.window(first, last);
                self.range_for(start, end)
            }
            None => Range::default(),
        }
    }

    fn recompute(&mut self, direction: Option<ScrollDirection>, cause: UpdateCause, force: bool) {
        let range = match self.visible_bounds() {
            Some((first, last)) => {
                let (start, end) = if self.keeps_window(first, last, direction) {
                    (self.range.start, self.range.end)
                } else {
                    self.window(first, last)
                };
                self.range_for(start, end)
            }
            None => Range::default(),
        };
        self.apply(range, cause, force);
    }

    fn range_for(&self, start: usize, end: usize) -> Range {
        let estimate = self.ledger.average();
        let front = self.sums.prefix(start).length(estimate);
        let through_end = self.sums.prefix(end.saturating_add(1)).length(estimate);
        let behind = self.sums.total().length(estimate).saturating_sub(through_end);
        Range {
            start,
            end,
            front,
            behind,
        }
    }

    fn apply(&mut self, range: Range, cause: UpdateCause, force: bool) {
        let prev = self.range;
        if !force && prev == range {
            return;
        }
        self.range = range;
        self.notify(RangeUpdate::new(
            &prev,
            range,
            self.excluded.is_some(),
            cause,
        ));
    }
}
