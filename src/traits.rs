//! Common traits for heap data structures
//!
//! This module provides the trait hierarchy shared by every priority queue in
//! the crate:
//!
//! - [`Heap`]: keyed priority queue ordered by a [`Comparator`](crate::compare::Comparator)
//! - [`MergeableHeap`]: heaps that can absorb another heap of the same type
//! - [`IndexedHeap`]: heaps whose entries are addressed by an integer index in
//!   `[0, capacity)`, supporting key changes and deletion by index
//!
//! Unlike `std::collections::BinaryHeap`, which stores values directly and is
//! a max-heap, these heaps store `(key, value)` pairs and always surface the
//! *extremum*: the minimum under the heap's comparator.

use std::cmp::Ordering;
use thiserror::Error;

/// Error type for indexed heap operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HeapError {
    /// The index lies outside `[0, capacity)`
    #[error("index {index} is out of range for capacity {capacity}")]
    IndexOutOfRange {
        /// The rejected index
        index: usize,
        /// The heap's fixed capacity
        capacity: usize,
    },
    /// An entry is already stored under this index
    #[error("index {0} is already present in the heap")]
    DuplicateIndex(usize),
    /// No entry is stored under this index
    #[error("index {0} is not present in the heap")]
    AbsentIndex(usize),
}

/// Validates an index against a fixed capacity.
#[inline]
pub(crate) fn check_index(index: usize, capacity: usize) -> Result<(), HeapError> {
    if index < capacity {
        Ok(())
    } else {
        Err(HeapError::IndexOutOfRange { index, capacity })
    }
}

/// Base trait for keyed priority queues
///
/// # Example
///
/// ```rust
/// use rust_advanced_collections::Heap;
/// use rust_advanced_collections::binary::BinaryHeap;
///
/// let mut heap = BinaryHeap::new();
/// heap.push(3, "three");
/// heap.push(1, "one");
/// heap.push(2, "two");
///
/// assert_eq!(heap.peek(), Some((&1, &"one")));
/// assert_eq!(heap.pop(), Some((1, "one")));
/// ```
pub trait Heap<K, V> {
    /// Returns the number of entries in the heap
    fn len(&self) -> usize;

    /// Returns true if the heap is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts an entry. Never fails.
    fn push(&mut self, key: K, value: V);

    /// Returns the extremum entry without removing it
    fn peek(&self) -> Option<(&K, &V)>;

    /// Removes and returns the extremum entry
    fn pop(&mut self) -> Option<(K, V)>;

    /// Removes every entry
    fn clear(&mut self);

    /// Compares two keys with the heap's comparator
    fn compare_keys(&self, a: &K, b: &K) -> Ordering;

    /// Visits every entry in unspecified order until the visitor returns `false`
    fn for_each<'a, F>(&'a self, visitor: F)
    where
        K: 'a,
        V: 'a,
        F: FnMut(&'a K, &'a V) -> bool;

    /// Returns true if some key ties with `key` under the comparator
    ///
    /// This is a linear scan. A key is "contained" when it compares equal,
    /// which is only identity if the comparator ties on equality alone.
    fn contains_key(&self, key: &K) -> bool {
        let mut found = false;
        self.for_each(|k, _| {
            found = self.compare_keys(k, key) == Ordering::Equal;
            !found
        });
        found
    }

    /// Returns true if some value equals `value` (linear scan)
    fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        let mut found = false;
        self.for_each(|_, v| {
            found = v == value;
            !found
        });
        found
    }

    /// Returns true if both heaps hold the same multiset of `(key, value)` pairs
    ///
    /// Keys are matched with `self`'s comparator and values with `PartialEq`.
    fn same_entries(&self, other: &Self) -> bool
    where
        V: PartialEq,
    {
        if self.len() != other.len() {
            return false;
        }
        let mut ours = Vec::with_capacity(self.len());
        self.for_each(|k, v| {
            ours.push((k, v));
            true
        });
        let mut theirs = Vec::with_capacity(other.len());
        other.for_each(|k, v| {
            theirs.push((k, v));
            true
        });
        multiset_eq(ours, theirs, |a, b| self.compare_keys(a, b))
    }
}

/// Heaps that can absorb another heap of the same type
pub trait MergeableHeap<K, V>: Heap<K, V> {
    /// Moves every entry of `other` into `self`, leaving `other` empty
    ///
    /// Both heaps are assumed to order keys identically.
    fn merge(&mut self, other: &mut Self);
}

/// Heaps whose entries are addressed by an integer index
///
/// Indices live in `[0, capacity)` with the capacity fixed at construction.
/// An index is free again once its entry is popped or deleted.
pub trait IndexedHeap<K, V> {
    /// Returns the fixed index capacity
    fn capacity(&self) -> usize;

    /// Returns the number of entries in the heap
    fn len(&self) -> usize;

    /// Returns true if the heap is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if an entry is stored under `index`; false for out-of-range indices
    fn contains_index(&self, index: usize) -> bool;

    /// Inserts an entry under `index`
    ///
    /// # Errors
    ///
    /// [`HeapError::IndexOutOfRange`] or [`HeapError::DuplicateIndex`]; the
    /// heap is left untouched in both cases.
    fn insert(&mut self, index: usize, key: K, value: V) -> Result<(), HeapError>;

    /// Returns the extremum entry with its index
    fn peek(&self) -> Option<(usize, &K, &V)>;

    /// Removes and returns the extremum entry with its index
    fn pop(&mut self) -> Option<(usize, K, V)>;

    /// Returns the entry stored under `index`
    fn peek_index(&self, index: usize) -> Option<(&K, &V)>;

    /// Replaces the key stored under `index` and restores heap order
    ///
    /// # Errors
    ///
    /// [`HeapError::IndexOutOfRange`] or [`HeapError::AbsentIndex`].
    fn change_key(&mut self, index: usize, key: K) -> Result<(), HeapError>;

    /// Removes and returns the entry stored under `index`
    fn delete_index(&mut self, index: usize) -> Option<(K, V)>;

    /// Removes every entry
    fn clear(&mut self);

    /// Visits every entry in unspecified order until the visitor returns `false`
    fn for_each<'a, F>(&'a self, visitor: F)
    where
        K: 'a,
        V: 'a,
        F: FnMut(usize, &'a K, &'a V) -> bool;
}

/// Multiset equality of `(key, value)` pairs under a key order and `PartialEq` values.
pub(crate) fn multiset_eq<K, V, F>(
    mut ours: Vec<(&K, &V)>,
    mut theirs: Vec<(&K, &V)>,
    compare: F,
) -> bool
where
    V: PartialEq,
    F: Fn(&K, &K) -> Ordering,
{
    if ours.len() != theirs.len() {
        return false;
    }
    ours.sort_by(|a, b| compare(a.0, b.0));
    theirs.sort_by(|a, b| compare(a.0, b.0));

    let mut start = 0;
    while start < ours.len() {
        // Equal-key runs must line up and hold the same values in any order
        let mut end = start + 1;
        while end < ours.len() && compare(ours[start].0, ours[end].0) == Ordering::Equal {
            end += 1;
        }
        if end < theirs.len() && compare(ours[start].0, theirs[end].0) == Ordering::Equal {
            return false;
        }
        let mut used = vec![false; end - start];
        for (k, v) in &theirs[start..end] {
            if compare(ours[start].0, k) != Ordering::Equal {
                return false;
            }
            let slot = (start..end).find(|&i| !used[i - start] && ours[i].1 == *v);
            match slot {
                Some(i) => used[i - start] = true,
                None => return false,
            }
        }
        start = end;
    }
    true
}
