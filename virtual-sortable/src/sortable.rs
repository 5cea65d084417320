use alloc::vec::Vec;

use crate::key::UniqueKey;
use crate::{Error, Point, ScrollEvent, SortableOptions, Virtual};

/// Emitted when a drag session opens on an item of this list.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DragEvent<K, T> {
    pub key: K,
    pub index: usize,
    pub item: T,
}

/// Emitted when a drag session is dropped.
///
/// `old_index` is `None` for an item dragged in from another list, `new_index` is `None` when
/// the item was dropped outside this list. `list` is the resulting order; when `changed` is
/// `false` it equals `old_list`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DropEvent<K, T> {
    pub key: K,
    pub item: T,
    pub old_index: Option<usize>,
    pub new_index: Option<usize>,
    pub changed: bool,
    pub list: Vec<T>,
    pub old_list: Vec<T>,
}

/// An in-progress drag, from pick-up to drop or cancel.
#[derive(Clone, Debug)]
pub struct DragSession<K, T> {
    source: Option<usize>,
    key: K,
    item: T,
    target: Option<usize>,
    pointer: Option<Point>,
}

impl<K, T> DragSession<K, T> {
    /// Index the item was picked up from; `None` for an external drag.
    pub fn source(&self) -> Option<usize> {
        self.source
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn item(&self) -> &T {
        &self.item
    }

    /// Where the item would land if dropped now; `None` when outside the list.
    pub fn target(&self) -> Option<usize> {
        self.target
    }

    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }
}

/// The reorder engine.
///
/// Tracks a single [`DragSession`] and turns it into a list transform on drop. Session methods
/// take the list's [`Virtual`] so the two engines stay in step:
/// - the dragged key is excluded from measurement while the session is open;
/// - in non-sortable mode scrolling is frozen for the duration of the drag;
/// - pointer positions resolve to indexes through the windowing geometry;
/// - edge auto-scroll moves the window and re-targets the session.
#[derive(Clone, Debug)]
pub struct Sortable<K, T> {
    options: SortableOptions<K, T>,
    session: Option<DragSession<K, T>>,
    auto_scrolling: bool,
}

impl<K: UniqueKey, T: Clone> Sortable<K, T> {
    pub fn new(options: SortableOptions<K, T>) -> Result<Self, Error> {
        options.validate()?;
        Ok(Self {
            options,
            session: None,
            auto_scrolling: false,
        })
    }

    pub fn options(&self) -> &SortableOptions<K, T> {
        &self.options
    }

    /// Applies new options. An open session keeps running; its source is re-resolved by key
    /// when it is dropped.
    pub fn set_options(&mut self, options: SortableOptions<K, T>) -> Result<(), Error> {
        options.validate()?;
        vlog!(
            trace,
            len = options.items.len(),
            sortable = options.sortable,
            disabled = options.disabled,
            "Sortable::set_options"
        );
        self.options = options;
        Ok(())
    }

    /// Replaces the key sequence and the items it describes.
    pub fn set_list(
        &mut self,
        keys: impl Into<alloc::sync::Arc<[K]>>,
        items: impl Into<alloc::sync::Arc<[T]>>,
    ) -> Result<(), Error> {
        let mut next = self.options.clone();
        next.keys = keys.into();
        next.items = items.into();
        self.set_options(next)
    }

    pub fn session(&self) -> Option<&DragSession<K, T>> {
        self.session.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    /// Picks up the item at `index`.
    ///
    /// Returns `None` (and opens nothing) when dragging is disabled, a session is already open,
    /// or `index` is out of bounds.
    pub fn on_drag_start(&mut self, v: &mut Virtual<K>, index: usize) -> Option<DragEvent<K, T>> {
        if self.options.disabled || self.session.is_some() {
            return None;
        }
        let key = self.options.keys.get(index)?.clone();
        let item = self.options.items.get(index)?.clone();
        vlog!(debug, index, sortable = self.options.sortable, "drag start");

        v.set_excluded_key(Some(key.clone()));
        if self.options.sortable {
            self.auto_scrolling = self.options.auto_scroll.enabled;
        } else {
            v.enable_scroll(false);
            self.auto_scrolling = false;
        }

        self.session = Some(DragSession {
            source: Some(index),
            key: key.clone(),
            item: item.clone(),
            target: Some(index),
            pointer: None,
        });

        let event = DragEvent { key, index, item };
        if let Some(cb) = &self.options.on_drag {
            cb(&event);
        }
        Some(event)
    }

    /// Opens a session for an item dragged in from another list.
    ///
    /// The target stays `None` until the pointer moves over this list.
    pub fn on_drag_enter(&mut self, v: &mut Virtual<K>, key: K, item: T) -> bool {
        if self.options.disabled || self.session.is_some() {
            return false;
        }
        vlog!(debug, "drag enter");
        v.set_excluded_key(Some(key.clone()));
        self.auto_scrolling = self.options.sortable && self.options.auto_scroll.enabled;
        self.session = Some(DragSession {
            source: None,
            key,
            item,
            target: None,
            pointer: None,
        });
        true
    }

    /// Moves the pointer to `point` (viewport coordinates) and returns the new target.
    ///
    /// The list is not mutated; only the session's target changes.
    pub fn on_drag_move(&mut self, v: &Virtual<K>, point: Point) -> Option<usize> {
        let len = self.options.items.len();
        let sortable = self.options.sortable;
        let session = self.session.as_mut()?;
        session.pointer = Some(point);
        session.target = resolve_target(v, len, sortable, session.source, point);
        session.target
    }

    /// Advances edge auto-scroll by one step.
    ///
    /// Call this on a timer while dragging. When the pointer rests within the threshold of a
    /// viewport edge the window scrolls by the configured speed and the target is re-resolved.
    pub fn auto_scroll(&mut self, v: &mut Virtual<K>) -> Option<ScrollEvent> {
        if !self.auto_scrolling {
            return None;
        }
        let len = self.options.items.len();
        let sortable = self.options.sortable;
        let config = self.options.auto_scroll;
        let session = self.session.as_mut()?;
        let point = session.pointer?;

        let (main, _) = v.options().axis.split(point);
        let view = v.client_size() as i64;
        if main < 0 || main >= view {
            return None;
        }
        let threshold = config.threshold as i64;
        let delta = if main < threshold {
            -(config.speed as i64)
        } else if main >= view - threshold {
            config.speed as i64
        } else {
            return None;
        };

        let event = v.scroll_by_drag(delta)?;
        session.target = resolve_target(v, len, sortable, session.source, point);
        Some(event)
    }

    /// Ends the session and computes the resulting order.
    ///
    /// - source valid, target `None`: the item is removed;
    /// - source `None`, target valid: the item is inserted;
    /// - both valid: the item is removed and re-inserted at the target;
    /// - the dragged item no longer exists in its own list: the list is left unchanged.
    ///
    /// Scrolling, measurement and auto-scroll are restored whether or not the order changed.
    /// Without an open session this is a no-op returning `None`.
    pub fn on_drop(&mut self, v: &mut Virtual<K>) -> Option<DropEvent<K, T>> {
        let session = self.session.take()?;
        self.restore(v);

        // The list may have been replaced mid-drag; find the item by identity.
        let source = session
            .source
            .and_then(|_| self.options.keys.iter().position(|k| *k == session.key));

        let old_list: Vec<T> = self.options.items.to_vec();
        let mut list = old_list.clone();
        let internal = session.source.is_some();
        let (new_index, changed) = match (source, session.target) {
            // The dragged item left the list while it was held: nothing to move.
            (None, _) if internal => (None, false),
            (Some(from), Some(to)) => {
                let to = to.min(list.len() - 1);
                if from != to {
                    let item = list.remove(from);
                    list.insert(to, item);
                }
                (Some(to), from != to)
            }
            (Some(from), None) => {
                list.remove(from);
                (None, true)
            }
            (None, Some(to)) => {
                let to = to.min(list.len());
                list.insert(to, session.item.clone());
                (Some(to), true)
            }
            (None, None) => (None, false),
        };
        vlog!(debug, ?source, ?new_index, changed, "drop");

        let event = DropEvent {
            key: session.key,
            item: session.item,
            old_index: source,
            new_index,
            changed,
            list,
            old_list,
        };
        if let Some(cb) = &self.options.on_drop {
            cb(&event);
        }
        Some(event)
    }

    /// Discards the session without changing the list. Returns `false` if none was open.
    pub fn on_cancel(&mut self, v: &mut Virtual<K>) -> bool {
        if self.session.take().is_none() {
            return false;
        }
        vlog!(debug, "drag cancel");
        self.restore(v);
        true
    }

    fn restore(&mut self, v: &mut Virtual<K>) {
        v.set_excluded_key(None);
        v.enable_scroll(true);
        self.auto_scrolling = false;
    }
}

/// Maps a viewport point to a drop index.
///
/// Points outside the viewport have no target. Internal drags target the item under the
/// pointer (or stay put in non-sortable mode); external drags target the insertion slot nearest
/// to the pointer, which may be `len`.
fn resolve_target<K: UniqueKey>(
    v: &Virtual<K>,
    len: usize,
    sortable: bool,
    source: Option<usize>,
    point: Point,
) -> Option<usize> {
    let rect = v.rect();
    let (main, cross) = v.options().axis.split(point);
    if main < 0 || main >= rect.main as i64 {
        return None;
    }
    if rect.cross > 0 && (cross < 0 || cross >= rect.cross as i64) {
        return None;
    }

    let content = v.offset().saturating_add(main as u64);
    match source {
        Some(source) if !sortable => Some(source),
        Some(_) => {
            let index = v.index_at_offset(content)?;
            Some(index.min(len.saturating_sub(1)))
        }
        None => {
            let Some(index) = v.index_at_offset(content) else {
                return Some(0);
            };
            let start = v.offset_of(index);
            let half = v.size_of(index).unwrap_or(0) as u64 / 2;
            let slot = if content >= start.saturating_add(half) {
                index + 1
            } else {
                index
            };
            Some(slot.min(len))
        }
    }
}
