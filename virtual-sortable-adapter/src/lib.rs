//! List controller for the `virtual-sortable` engines.
//!
//! The `virtual-sortable` crate is UI-agnostic and only holds the windowing and reorder state.
//! This crate adds the framework-neutral glue most list components need:
//!
//! - [`VirtualList`]: owns the items and key extraction, keeps both engines in sync and commits
//!   drops
//! - Scroll anchoring (loading rows above the viewport without visual jumps)
//! - Edge-signal throttling
//!
//! No UI toolkit bindings live here.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod anchor;
mod controller;
mod throttle;


pub use anchor::{ScrollAnchor, apply_anchor, capture_first_visible_anchor};
pub use controller::{DEFAULT_EDGE_THROTTLE_MS, KeyFn, ListOptions, VirtualList};
pub use throttle::Throttle;

pub use virtual_sortable::Error;
