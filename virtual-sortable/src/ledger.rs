use alloc::vec::Vec;

use crate::key::{KeyMap, UniqueKey};

/// Measured item sizes, keyed by item identity.
///
/// Entries are written when the presentation layer reports a measurement and survive scrolling,
/// so an item that leaves and re-enters the window keeps its size. The ledger also maintains a
/// running total so the average used for unmeasured items is `O(1)`.
#[derive(Clone, Debug)]
pub struct SizeLedger<K> {
    sizes: KeyMap<K, u32>,
    total: u64,
    fallback: u32,
}

impl<K: UniqueKey> SizeLedger<K> {
    /// Creates an empty ledger. `fallback` is the estimate used until something is measured.
    pub fn new(fallback: u32) -> Self {
        Self {
            sizes: KeyMap::new(),
            total: 0,
            fallback,
        }
    }

    pub fn get(&self, key: &K) -> Option<u32> {
        self.sizes.get(key).copied()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.sizes.contains_key(key)
    }

    /// Records `size` for `key`, returning the previous measurement.
    pub fn insert(&mut self, key: K, size: u32) -> Option<u32> {
        let prev = self.sizes.insert(key, size);
        if let Some(old) = prev {
            self.total = self.total.saturating_sub(old as u64);
        }
        self.total = self.total.saturating_add(size as u64);
        prev
    }

    pub fn remove(&mut self, key: &K) -> Option<u32> {
        let prev = self.sizes.remove(key)?;
        self.total = self.total.saturating_sub(prev as u64);
        Some(prev)
    }

    /// Drops every entry whose key does not satisfy `keep`. Returns the number of evictions.
    pub fn retain(&mut self, mut keep: impl FnMut(&K) -> bool) -> usize {
        let before = self.sizes.len();
        let mut total = self.total;
        self.sizes.retain(|k, v| {
            let kept = keep(k);
            if !kept {
                total = total.saturating_sub(*v as u64);
            }
            kept
        });
        self.total = total;
        before - self.sizes.len()
    }

    pub fn clear(&mut self) {
        self.sizes.clear();
        self.total = 0;
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Sum of all recorded sizes.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn fallback(&self) -> u32 {
        self.fallback
    }

    pub fn set_fallback(&mut self, fallback: u32) {
        self.fallback = fallback;
    }

    /// The estimate for an unmeasured item: the rounded mean of all entries, or the fallback
    /// while the ledger is empty.
    pub fn average(&self) -> u32 {
        let n = self.sizes.len() as u64;
        if n == 0 {
            return self.fallback;
        }
        let mean = self.total.saturating_add(n / 2) / n;
        mean.min(u32::MAX as u64) as u32
    }

    /// The measured size of `key`, or the current estimate.
    pub fn size_or_estimate(&self, key: &K) -> u32 {
        self.get(key).unwrap_or_else(|| self.average())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, u32)> + '_ {
        self.sizes.iter().map(|(k, v)| (k, *v))
    }

    /// Copies the entries out (useful for persistence).
    pub fn export(&self) -> Vec<(K, u32)> {
        self.iter().map(|(k, v)| (k.clone(), v)).collect()
    }
}
