#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

/// Key → value map used for the size ledger and the key → index lookup.
#[cfg(feature = "std")]
pub(crate) type KeyMap<K, V> = HashMap<K, V>;
#[cfg(not(feature = "std"))]
pub(crate) type KeyMap<K, V> = BTreeMap<K, V>;

/// A stable per-item identity.
///
/// With `std` keys are hashed; without it they are ordered. Any `Clone` type satisfying the map
/// bound qualifies (strings, integers, uuids, ...).
#[cfg(feature = "std")]
pub trait UniqueKey: core::hash::Hash + Eq + Clone {}
#[cfg(feature = "std")]
impl<K: core::hash::Hash + Eq + Clone> UniqueKey for K {}

#[cfg(not(feature = "std"))]
pub trait UniqueKey: Ord + Clone {}
#[cfg(not(feature = "std"))]
impl<K: Ord + Clone> UniqueKey for K {}
