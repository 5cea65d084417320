use alloc::vec::Vec;
use core::cmp;

/// What a single index (or a run of indexes) contributes to the scroll length.
///
/// Measured sizes are summed directly. Unmeasured items are only counted, so their length can
/// follow the ledger's running average without rebuilding the tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Span {
    pub(crate) measured: u64,
    pub(crate) pending: u64,
}

impl Span {
    pub(crate) const PENDING: Self = Self {
        measured: 0,
        pending: 1,
    };

    pub(crate) fn measured(size: u32) -> Self {
        Self {
            measured: size as u64,
            pending: 0,
        }
    }

    /// Length of the span when each pending item is `estimate` long.
    pub(crate) fn length(self, estimate: u32) -> u64 {
        self.measured
            .saturating_add(self.pending.saturating_mul(estimate as u64))
    }

    fn plus(self, other: Self) -> Self {
        Self {
            measured: self.measured.saturating_add(other.measured),
            pending: self.pending.saturating_add(other.pending),
        }
    }

    fn minus(self, other: Self) -> Self {
        debug_assert!(
            self.measured >= other.measured && self.pending >= other.pending,
            "Fenwick underflow ({self:?} - {other:?})"
        );
        Self {
            measured: self.measured.saturating_sub(other.measured),
            pending: self.pending.saturating_sub(other.pending),
        }
    }
}

/// Prefix sums over [`Span`]s with `O(log n)` point updates and offset lookups.
#[derive(Clone, Debug, Default)]
pub(crate) struct Fenwick {
    tree: Vec<Span>, // 1-indexed
    leaves: Vec<Span>,
    total: Span,
    max_bit: usize,
}

impl Fenwick {
    pub(crate) fn from_spans(leaves: Vec<Span>) -> Self {
        let n = leaves.len();
        let mut tree = alloc::vec![Span::default(); n + 1];
        let mut total = Span::default();
        for i in 1..=n {
            let v = leaves[i - 1];
            total = total.plus(v);
            tree[i] = tree[i].plus(v);
            let j = i + lsb(i);
            if j <= n {
                tree[j] = tree[j].plus(tree[i]);
            }
        }
        Self {
            tree,
            leaves,
            total,
            max_bit: highest_power_of_two_leq(n),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.leaves.len()
    }

    #[cfg(test)]
    pub(crate) fn get(&self, index: usize) -> Option<Span> {
        self.leaves.get(index).copied()
    }

    /// Replaces the span stored at `index`. Out-of-range indexes are ignored.
    pub(crate) fn set(&mut self, index: usize, span: Span) {
        let n = self.len();
        let Some(old) = self.leaves.get(index).copied() else {
            return;
        };
        if old == span {
            return;
        }
        self.leaves[index] = span;
        self.total = self.total.minus(old).plus(span);
        let mut i = index + 1;
        while i <= n {
            self.tree[i] = self.tree[i].minus(old).plus(span);
            i += lsb(i);
        }
    }

    /// Sum of the first `count` spans.
    pub(crate) fn prefix(&self, count: usize) -> Span {
        let mut i = cmp::min(count, self.len());
        let mut sum = Span::default();
        while i > 0 {
            sum = sum.plus(self.tree[i]);
            i &= i - 1;
        }
        sum
    }

    pub(crate) fn total(&self) -> Span {
        self.total
    }

    /// Returns the number of leading items whose combined length is `<= target`.
    ///
    /// Used to map an offset to the index of the item covering it.
    pub(crate) fn lower_bound(&self, mut target: u64, estimate: u32) -> usize {
        let n = self.len();
        let mut idx = 0usize;
        let mut bit = self.max_bit;
        while bit != 0 {
            let next = idx + bit;
            if next <= n {
                let w = self.tree[next].length(estimate);
                if w <= target {
                    target -= w;
                    idx = next;
                }
            }
            bit >>= 1;
        }
        idx
    }
}

fn lsb(i: usize) -> usize {
    i & i.wrapping_neg()
}

fn highest_power_of_two_leq(n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    let mut p = 1usize;
    while p <= n / 2 {
        p <<= 1;
    }
    p
}
