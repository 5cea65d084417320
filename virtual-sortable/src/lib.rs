//! Headless engines for a virtualized, drag-sortable list.
//!
//! For a ready-made list controller (item ownership, scroll anchoring, edge throttling), see the
//! `virtual-sortable-adapter` crate.
//!
//! Two engines live here:
//! - [`Virtual`] decides which slice of a long list to render and how large the spacers before
//!   and after it are, for items whose sizes are only known after they are rendered once;
//! - [`Sortable`] tracks a drag session and turns a drop into a new item order.
//!
//! Both are UI-agnostic. The presentation layer provides:
//! - the viewport size and scroll offset
//! - item measurements as they are rendered
//! - pointer positions while dragging
//!
//! and renders `Virtual::range()` plus the `front`/`behind` spacers.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod error;
mod fenwick;
mod key;
mod ledger;
mod options;
mod sortable;
mod state;
mod types;
mod virtualizer;

#[cfg(test)]
mod tests;

pub use error::Error;
pub use key::UniqueKey;
pub use ledger::SizeLedger;
pub use options::{
    AutoScroll, DEFAULT_ESTIMATED_SIZE, DEFAULT_KEEPS, OnDragCallback, OnDropCallback,
    OnScrollCallback, OnUpdateCallback, SortableOptions, VirtualOptions,
};
pub use sortable::{DragEvent, DragSession, DropEvent, Sortable};
pub use state::ViewportState;
pub use types::{
    Align, Axis, Edge, Point, Range, RangeUpdate, Rect, ScrollDirection, ScrollEvent, UpdateCause,
};
pub use virtualizer::Virtual;
