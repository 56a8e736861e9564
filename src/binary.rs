//! Binary Heap implementation
//!
//! An array-backed complete binary tree using 1-based addressing: the parent
//! of slot `k` is `k / 2` and its children are `2k` and `2k + 1`.
//!
//! Backing storage grows by doubling when full and shrinks by halving once
//! fewer than a quarter of the slots are live, so reallocation cost is
//! amortized over the operations that caused it.
//!
//! # Time Complexity
//!
//! | Operation        | Complexity |
//! |------------------|------------|
//! | `push`           | O(log n) amortized |
//! | `pop`            | O(log n) amortized |
//! | `peek`           | O(1)       |
//! | `contains_key`   | O(n)       |
//! | `merge`          | O(m log(n + m)) |
//!
//! # Example
//!
//! ```rust
//! use rust_advanced_collections::Heap;
//! use rust_advanced_collections::binary::BinaryHeap;
//!
//! let mut heap = BinaryHeap::new();
//! heap.push(3, "three");
//! heap.push(1, "one");
//! heap.push(2, "two");
//!
//! assert_eq!(heap.peek(), Some((&1, &"one")));
//! assert_eq!(heap.pop(), Some((1, "one")));
//! assert_eq!(heap.pop(), Some((2, "two")));
//! assert_eq!(heap.pop(), Some((3, "three")));
//! assert_eq!(heap.pop(), None);
//! ```

use crate::compare::{Comparator, Natural, Reversed};
use crate::traits::{Heap, MergeableHeap};
use log::trace;
use std::cmp::Ordering;

/// A binary heap ordered by a [`Comparator`]
///
/// With the default [`Natural`] comparator this is a min-heap;
/// [`BinaryHeap::new_max`] builds the max-heap counterpart.
#[derive(Debug)]
pub struct BinaryHeap<K, V, C = Natural> {
    /// Slot 0 is never used; `slots.len() == capacity + 1`
    slots: Vec<Option<(K, V)>>,
    len: usize,
    cmp: C,
}

impl<K: Ord, V> BinaryHeap<K, V> {
    /// Creates an empty min-heap
    pub fn new() -> Self {
        Self::with_comparator(Natural)
    }

    /// Creates an empty min-heap with room for `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_comparator(capacity, Natural)
    }
}

impl<K: Ord, V> BinaryHeap<K, V, Reversed<Natural>> {
    /// Creates an empty max-heap
    pub fn new_max() -> Self {
        Self::with_comparator(Reversed(Natural))
    }
}

impl<K, V, C: Comparator<K>> BinaryHeap<K, V, C> {
    /// Creates an empty heap ordered by `cmp`
    pub fn with_comparator(cmp: C) -> Self {
        Self::with_capacity_and_comparator(1, cmp)
    }

    /// Creates an empty heap ordered by `cmp` with room for `capacity` entries
    pub fn with_capacity_and_comparator(capacity: usize, cmp: C) -> Self {
        Self {
            slots: empty_slots(capacity.max(1)),
            len: 0,
            cmp,
        }
    }

    /// Number of entries the heap can hold before it next grows
    pub fn capacity(&self) -> usize {
        self.slots.len() - 1
    }

    /// Returns the comparator
    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Checks the heap-order invariant and slot bookkeeping
    pub fn verify_invariants(&self) -> bool {
        if self.len > self.capacity() || self.slots[0].is_some() {
            return false;
        }
        let live = self.slots[1..=self.len].iter().all(Option::is_some);
        let dead = self.slots[self.len + 1..].iter().all(Option::is_none);
        let ordered = (2..=self.len).all(|k| match (&self.slots[k / 2], &self.slots[k]) {
            (Some((parent, _)), Some((child, _))) => {
                self.cmp.compare(parent, child) != Ordering::Greater
            }
            _ => false,
        });
        live && dead && ordered
    }

    /// Renders the implicit tree as a Graphviz digraph
    #[cfg(feature = "dot")]
    pub fn dot(&self) -> String
    where
        K: std::fmt::Debug,
        V: std::fmt::Debug,
    {
        let mut graph = crate::dot::DotGraph::new("binary_heap");
        for k in 1..=self.len {
            if let Some((key, value)) = &self.slots[k] {
                graph.node(k, format!("{:?}: {:?}", key, value));
            }
            if k > 1 {
                graph.edge(k / 2, k);
            }
        }
        graph.to_string()
    }

    /// True when the entry in slot `i` follows `key`.
    fn slot_follows(&self, i: usize, key: &K) -> bool {
        match &self.slots[i] {
            Some((k, _)) => self.cmp.follows(k, key),
            None => false,
        }
    }

    /// True when the entry in slot `i` precedes the entry in slot `j`.
    fn slot_precedes(&self, i: usize, j: usize) -> bool {
        match (&self.slots[i], &self.slots[j]) {
            (Some((a, _)), Some((b, _))) => self.cmp.precedes(a, b),
            _ => false,
        }
    }

    /// Moves the hole at `k` up until `entry` fits, shifting parents down
    fn swim(&mut self, mut k: usize, entry: (K, V)) {
        while k > 1 && self.slot_follows(k / 2, &entry.0) {
            self.slots[k] = self.slots[k / 2].take();
            k /= 2;
        }
        self.slots[k] = Some(entry);
    }

    /// Moves the hole at `k` down until `entry` fits, shifting children up
    fn sink(&mut self, mut k: usize, entry: (K, V)) {
        while 2 * k <= self.len {
            let mut j = 2 * k;
            if j < self.len && self.slot_precedes(j + 1, j) {
                j += 1;
            }
            let stop = match &self.slots[j] {
                Some((child, _)) => self.cmp.precedes(&entry.0, child),
                None => true,
            };
            if stop {
                break;
            }
            self.slots[k] = self.slots[j].take();
            k = j;
        }
        self.slots[k] = Some(entry);
    }

    /// Reallocates the backing array, moving the live slots
    fn resize(&mut self, capacity: usize) {
        debug_assert!(capacity >= self.len);
        trace!(
            "binary heap resize {} -> {} ({} live)",
            self.capacity(),
            capacity,
            self.len
        );
        let mut slots = Vec::with_capacity(capacity + 1);
        slots.push(None);
        slots.extend(self.slots[1..=self.len].iter_mut().map(Option::take));
        slots.resize_with(capacity + 1, || None);
        self.slots = slots;
    }
}

fn empty_slots<K, V>(capacity: usize) -> Vec<Option<(K, V)>> {
    let mut slots = Vec::with_capacity(capacity + 1);
    slots.resize_with(capacity + 1, || None);
    slots
}

impl<K, V, C: Comparator<K>> Heap<K, V> for BinaryHeap<K, V, C> {
    fn len(&self) -> usize {
        self.len
    }

    fn push(&mut self, key: K, value: V) {
        if self.len == self.capacity() {
            self.resize(2 * self.capacity());
        }
        self.len += 1;
        self.swim(self.len, (key, value));
    }

    fn peek(&self) -> Option<(&K, &V)> {
        if self.len == 0 {
            return None;
        }
        self.slots[1].as_ref().map(|(k, v)| (k, v))
    }

    fn pop(&mut self) -> Option<(K, V)> {
        if self.len == 0 {
            return None;
        }
        let top = self.slots[1].take();
        let last = self.slots[self.len].take();
        self.len -= 1;
        if let Some(entry) = last {
            self.sink(1, entry);
        }

        let capacity = self.capacity();
        if self.len < capacity / 4 {
            self.resize(capacity / 2);
        }
        top
    }

    fn clear(&mut self) {
        self.slots = empty_slots(1);
        self.len = 0;
    }

    fn compare_keys(&self, a: &K, b: &K) -> Ordering {
        self.cmp.compare(a, b)
    }

    fn for_each<'a, F>(&'a self, mut visitor: F)
    where
        F: FnMut(&'a K, &'a V) -> bool,
    {
        for (k, v) in self.slots[1..=self.len].iter().flatten() {
            if !visitor(k, v) {
                return;
            }
        }
    }
}

impl<K, V, C: Comparator<K>> MergeableHeap<K, V> for BinaryHeap<K, V, C> {
    fn merge(&mut self, other: &mut Self) {
        let len = other.len;
        for slot in other.slots[1..=len].iter_mut() {
            if let Some((key, value)) = slot.take() {
                self.push(key, value);
            }
        }
        other.clear();
    }
}

impl<K, V, C: Comparator<K> + Default> Default for BinaryHeap<K, V, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<K, V, C: Comparator<K>> Extend<(K, V)> for BinaryHeap<K, V, C> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.push(key, value);
        }
    }
}

impl<K, V, C: Comparator<K> + Default> FromIterator<(K, V)> for BinaryHeap<K, V, C> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut heap = Self::default();
        heap.extend(iter);
        heap
    }
}
