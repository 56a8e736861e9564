//! Indexed Binary Heap
//!
//! An array-backed binary heap of indices. Entries live in a table addressed
//! by index; the heap array `pq` holds indices in 1-based heap order and
//! `pos` inverts it, so `pq[pos[i]] == i` for every live index `i`.
//!
//! # Time Complexity
//!
//! | Operation      | Complexity |
//! |----------------|------------|
//! | `insert`       | O(log n)   |
//! | `pop`          | O(log n)   |
//! | `change_key`   | O(log n)   |
//! | `delete_index` | O(log n)   |
//! | `peek`, `peek_index`, `contains_index` | O(1) |
//!
//! # Example
//!
//! ```rust
//! use rust_advanced_collections::IndexedHeap;
//! use rust_advanced_collections::indexed_binary::IndexedBinaryHeap;
//!
//! let mut heap = IndexedBinaryHeap::new_max(3);
//! heap.insert(0, 10, "a").unwrap();
//! heap.insert(1, 3, "b").unwrap();
//! heap.change_key(1, 30).unwrap();
//! assert_eq!(heap.peek(), Some((1, &30, &"b")));
//! ```

use crate::compare::{Comparator, Natural, Reversed};
use crate::traits::{check_index, HeapError, IndexedHeap};
use std::cmp::Ordering;

/// Indexed binary heap with a fixed index capacity
#[derive(Debug)]
pub struct IndexedBinaryHeap<K, V, C = Natural> {
    /// 1-based heap of indices; slot 0 is unused
    pq: Vec<usize>,
    /// Heap position of each index
    pos: Vec<Option<usize>>,
    entries: Vec<Option<(K, V)>>,
    cmp: C,
}

impl<K: Ord, V> IndexedBinaryHeap<K, V> {
    /// Creates an empty min-heap accepting indices in `[0, capacity)`
    pub fn new(capacity: usize) -> Self {
        Self::with_comparator(capacity, Natural)
    }
}

impl<K: Ord, V> IndexedBinaryHeap<K, V, Reversed<Natural>> {
    /// Creates an empty max-heap accepting indices in `[0, capacity)`
    pub fn new_max(capacity: usize) -> Self {
        Self::with_comparator(capacity, Reversed(Natural))
    }
}

impl<K, V, C: Comparator<K>> IndexedBinaryHeap<K, V, C> {
    /// Creates an empty heap ordered by `cmp`
    pub fn with_comparator(capacity: usize, cmp: C) -> Self {
        let mut entries = Vec::with_capacity(capacity);
        entries.resize_with(capacity, || None);
        Self {
            pq: vec![0],
            pos: vec![None; capacity],
            entries,
            cmp,
        }
    }

    /// Returns the comparator
    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Checks heap order over `pq` and the `pq`/`pos`/`entries` bijection
    pub fn verify_invariants(&self) -> bool {
        let n = self.pq.len() - 1;
        let mapped = (1..=n).all(|k| {
            let i = self.pq[k];
            self.pos.get(i) == Some(&Some(k)) && self.entries[i].is_some()
        });
        let live = self.pos.iter().filter(|p| p.is_some()).count();
        let stored = self.entries.iter().filter(|e| e.is_some()).count();
        let ordered = (2..=n).all(|k| !self.less(k, k / 2));
        mapped && live == n && stored == n && ordered
    }

    /// Renders the implicit tree as a Graphviz digraph
    #[cfg(feature = "dot")]
    pub fn dot(&self) -> String
    where
        K: std::fmt::Debug,
        V: std::fmt::Debug,
    {
        let mut graph = crate::dot::DotGraph::new("indexed_binary_heap");
        for k in 1..self.pq.len() {
            let i = self.pq[k];
            if let Some((key, value)) = &self.entries[i] {
                graph.node(k, format!("[{}] {:?}: {:?}", i, key, value));
            }
            if k > 1 {
                graph.edge(k / 2, k);
            }
        }
        graph.to_string()
    }

    fn key_at(&self, k: usize) -> Option<&K> {
        self.entries[self.pq[k]].as_ref().map(|(key, _)| key)
    }

    /// True when the entry at heap position `a` strictly precedes the one at `b`
    fn less(&self, a: usize, b: usize) -> bool {
        match (self.key_at(a), self.key_at(b)) {
            (Some(x), Some(y)) => self.cmp.precedes(x, y),
            _ => false,
        }
    }

    fn exchange(&mut self, a: usize, b: usize) {
        self.pq.swap(a, b);
        self.pos[self.pq[a]] = Some(a);
        self.pos[self.pq[b]] = Some(b);
    }

    fn swim(&mut self, mut k: usize) -> usize {
        while k > 1 && self.less(k, k / 2) {
            self.exchange(k, k / 2);
            k /= 2;
        }
        k
    }

    fn sink(&mut self, mut k: usize) {
        let n = self.pq.len() - 1;
        while 2 * k <= n {
            let mut j = 2 * k;
            if j < n && self.less(j + 1, j) {
                j += 1;
            }
            if !self.less(j, k) {
                break;
            }
            self.exchange(k, j);
            k = j;
        }
    }

    /// Removes the index at heap position `k` and restores heap order
    fn remove_at(&mut self, k: usize) -> Option<(usize, K, V)> {
        let last = self.pq.len() - 1;
        self.exchange(k, last);
        let index = self.pq.pop()?;
        self.pos[index] = None;
        if k < last && self.swim(k) == k {
            self.sink(k);
        }
        let (key, value) = self.entries[index].take()?;
        Some((index, key, value))
    }
}

impl<K, V, C: Comparator<K>> IndexedHeap<K, V> for IndexedBinaryHeap<K, V, C> {
    fn capacity(&self) -> usize {
        self.entries.len()
    }

    fn len(&self) -> usize {
        self.pq.len() - 1
    }

    fn contains_index(&self, index: usize) -> bool {
        matches!(self.pos.get(index), Some(Some(_)))
    }

    fn insert(&mut self, index: usize, key: K, value: V) -> Result<(), HeapError> {
        check_index(index, self.capacity())?;
        if self.pos[index].is_some() {
            return Err(HeapError::DuplicateIndex(index));
        }
        self.entries[index] = Some((key, value));
        self.pq.push(index);
        let k = self.pq.len() - 1;
        self.pos[index] = Some(k);
        self.swim(k);
        Ok(())
    }

    fn peek(&self) -> Option<(usize, &K, &V)> {
        let index = *self.pq.get(1)?;
        self.entries[index].as_ref().map(|(k, v)| (index, k, v))
    }

    fn pop(&mut self) -> Option<(usize, K, V)> {
        if self.pq.len() < 2 {
            return None;
        }
        self.remove_at(1)
    }

    fn peek_index(&self, index: usize) -> Option<(&K, &V)> {
        self.entries.get(index)?.as_ref().map(|(k, v)| (k, v))
    }

    fn change_key(&mut self, index: usize, key: K) -> Result<(), HeapError> {
        check_index(index, self.capacity())?;
        let k = self.pos[index].ok_or(HeapError::AbsentIndex(index))?;
        let order = match &mut self.entries[index] {
            Some((current, _)) => {
                let order = self.cmp.compare(&key, current);
                *current = key;
                order
            }
            None => return Err(HeapError::AbsentIndex(index)),
        };
        match order {
            Ordering::Less => {
                self.swim(k);
            }
            Ordering::Greater => self.sink(k),
            Ordering::Equal => {}
        }
        Ok(())
    }

    fn delete_index(&mut self, index: usize) -> Option<(K, V)> {
        let k = (*self.pos.get(index)?)?;
        self.remove_at(k).map(|(_, key, value)| (key, value))
    }

    fn clear(&mut self) {
        self.pq.truncate(1);
        self.pos.iter_mut().for_each(|p| *p = None);
        self.entries.iter_mut().for_each(|e| *e = None);
    }

    fn for_each<'a, F>(&'a self, mut visitor: F)
    where
        F: FnMut(usize, &'a K, &'a V) -> bool,
    {
        for &index in &self.pq[1..] {
            if let Some((k, v)) = &self.entries[index] {
                if !visitor(index, k, v) {
                    return;
                }
            }
        }
    }
}
