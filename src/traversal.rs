//! Traversal orders for the prefix tries
//!
//! The six recursive orders name the position of the visit (`V`) relative to
//! the left (`L`) and right (`R`) links of a binary node. `Ascending` and
//! `Descending` walk keys in sorted order; for a left-child right-sibling
//! trie they coincide with `VLR` and `RLV`.
//!
//! [`OrderedTrie`] derives the ordered queries (min, max, floor, ceiling,
//! select, rank, range) from a trie's sorted traversal.

/// Order in which a trie traversal visits its keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    /// Node, left, right (pre-order)
    Vlr,
    /// Node, right, left
    Vrl,
    /// Left, node, right (in-order)
    Lvr,
    /// Right, node, left
    Rvl,
    /// Left, right, node (post-order)
    Lrv,
    /// Right, left, node
    Rlv,
    /// Keys in increasing byte order
    Ascending,
    /// Keys in decreasing byte order
    Descending,
}

/// One step of a recursive order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Visit,
    Left,
    Right,
}

impl Order {
    /// Every supported order
    pub const ALL: [Order; 8] = [
        Order::Vlr,
        Order::Vrl,
        Order::Lvr,
        Order::Rvl,
        Order::Lrv,
        Order::Rlv,
        Order::Ascending,
        Order::Descending,
    ];

    /// The three steps of a recursive order, or `None` for the sorted orders.
    pub(crate) fn steps(self) -> Option<[Step; 3]> {
        use Step::{Left, Right, Visit};
        match self {
            Order::Vlr => Some([Visit, Left, Right]),
            Order::Vrl => Some([Visit, Right, Left]),
            Order::Lvr => Some([Left, Visit, Right]),
            Order::Rvl => Some([Right, Visit, Left]),
            Order::Lrv => Some([Left, Right, Visit]),
            Order::Rlv => Some([Right, Left, Visit]),
            Order::Ascending | Order::Descending => None,
        }
    }
}

/// Ordered queries over byte-string keys, expressed on a sorted traversal
///
/// Keys order as byte slices, so a key sorts right before its extensions.
/// Implementors may override any query with a direct walk.
pub trait OrderedTrie<V> {
    /// Visits `(key, value)` pairs in `order` until the visitor returns `false`
    fn traverse<'a, F>(&'a self, order: Order, visitor: F)
    where
        F: FnMut(&[u8], &'a V) -> bool;

    /// The smallest key
    fn min(&self) -> Option<(Vec<u8>, &V)> {
        let mut out = None;
        self.traverse(Order::Ascending, |k, v| {
            out = Some((k.to_vec(), v));
            false
        });
        out
    }

    /// The largest key
    fn max(&self) -> Option<(Vec<u8>, &V)> {
        let mut out = None;
        self.traverse(Order::Descending, |k, v| {
            out = Some((k.to_vec(), v));
            false
        });
        out
    }

    /// The largest key not greater than `key`
    fn floor(&self, key: &[u8]) -> Option<(Vec<u8>, &V)> {
        let mut out = None;
        self.traverse(Order::Descending, |k, v| {
            if k <= key {
                out = Some((k.to_vec(), v));
                return false;
            }
            true
        });
        out
    }

    /// The smallest key not less than `key`
    fn ceiling(&self, key: &[u8]) -> Option<(Vec<u8>, &V)> {
        let mut out = None;
        self.traverse(Order::Ascending, |k, v| {
            if k >= key {
                out = Some((k.to_vec(), v));
                return false;
            }
            true
        });
        out
    }

    /// The key with exactly `rank` smaller keys (0-based)
    fn select(&self, rank: usize) -> Option<(Vec<u8>, &V)> {
        let mut out = None;
        let mut seen = 0;
        self.traverse(Order::Ascending, |k, v| {
            if seen == rank {
                out = Some((k.to_vec(), v));
                return false;
            }
            seen += 1;
            true
        });
        out
    }

    /// Number of keys strictly less than `key`
    fn rank(&self, key: &[u8]) -> usize {
        let mut count = 0;
        self.traverse(Order::Ascending, |k, _| {
            if k < key {
                count += 1;
                true
            } else {
                false
            }
        });
        count
    }

    /// Visits the keys in `lo..=hi` in ascending order until the visitor returns `false`
    fn range<'a, F>(&'a self, lo: &[u8], hi: &[u8], mut visitor: F)
    where
        F: FnMut(&[u8], &'a V) -> bool,
    {
        self.traverse(Order::Ascending, |k, v| {
            if k < lo {
                return true;
            }
            k <= hi && visitor(k, v)
        });
    }
}
