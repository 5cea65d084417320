use core::fmt;

use virtual_sortable::{UniqueKey, Virtual};

/// A scroll anchor that preserves visual position across data changes.
///
/// Typical use cases:
/// - loading older rows above the viewport (chat history, timelines) without content jumping
/// - any replace where the viewport should stay pinned to an item identity
#[derive(Clone, PartialEq, Eq)]
pub struct ScrollAnchor<K> {
    pub key: K,
    /// The distance from the anchor item's start to the viewport's scroll offset.
    pub offset_in_viewport: u64,
}

impl<K: fmt::Debug> fmt::Debug for ScrollAnchor<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollAnchor")
            .field("key", &self.key)
            .field("offset_in_viewport", &self.offset_in_viewport)
            .finish()
    }
}

/// Captures an anchor for the item at the top of the viewport.
///
/// Returns `None` for an empty list.
pub fn capture_first_visible_anchor<K: UniqueKey>(v: &Virtual<K>) -> Option<ScrollAnchor<K>> {
    let index = v.index_at_offset(v.offset())?;
    let key = v.key_at(index)?.clone();
    let offset_in_viewport = v.offset().saturating_sub(v.offset_of(index));
    Some(ScrollAnchor {
        key,
        offset_in_viewport,
    })
}

/// Scrolls so the anchor item sits where it was captured.
///
/// Returns the applied offset, or `None` when the key is gone or scrolling is not accepted.
pub fn apply_anchor<K: UniqueKey>(v: &mut Virtual<K>, anchor: &ScrollAnchor<K>) -> Option<u64> {
    let index = v.index_of(&anchor.key)?;
    if !v.accepts_scroll() {
        return None;
    }
    let target = v.offset_of(index).saturating_add(anchor.offset_in_viewport);
    Some(v.scroll_to_offset(target))
}
