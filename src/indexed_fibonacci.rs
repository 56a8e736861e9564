//! Indexed Fibonacci Heap
//!
//! A [`FibonacciHeap`](crate::fibonacci::FibonacciHeap) whose entries are
//! addressed by an integer index in `[0, capacity)`. A fixed-length table maps
//! each index to its node, so `change_key` and `delete_index` reach the node
//! in O(1) before restructuring.
//!
//! Decreasing a key cuts the node from its parent (cascading through marked
//! ancestors); increasing it deletes the node and re-inserts it under the same
//! index.
//!
//! # Example
//!
//! ```rust
//! use rust_advanced_collections::IndexedHeap;
//! use rust_advanced_collections::indexed_fibonacci::IndexedFibonacciHeap;
//!
//! let mut heap = IndexedFibonacciHeap::new(4);
//! heap.insert(0, 50, "a").unwrap();
//! heap.insert(1, 30, "b").unwrap();
//! heap.change_key(0, 10).unwrap();
//!
//! assert_eq!(heap.pop(), Some((0, 10, "a")));
//! assert_eq!(heap.pop(), Some((1, 30, "b")));
//! ```

use crate::compare::{Comparator, Natural, Reversed};
use crate::fibonacci::{into_entry, Forest, Node};
use crate::traits::{check_index, HeapError, IndexedHeap};
use std::cmp::Ordering;
use std::ptr::NonNull;

/// Indexed Fibonacci heap with a fixed index capacity
pub struct IndexedFibonacciHeap<K, V, C = Natural> {
    forest: Forest<K, V, C>,
    nodes: Vec<Option<NonNull<Node<K, V>>>>,
}

impl<K: Ord, V> IndexedFibonacciHeap<K, V> {
    /// Creates an empty min-heap accepting indices in `[0, capacity)`
    pub fn new(capacity: usize) -> Self {
        Self::with_comparator(capacity, Natural)
    }
}

impl<K: Ord, V> IndexedFibonacciHeap<K, V, Reversed<Natural>> {
    /// Creates an empty max-heap accepting indices in `[0, capacity)`
    pub fn new_max(capacity: usize) -> Self {
        Self::with_comparator(capacity, Reversed(Natural))
    }
}

impl<K, V, C: Comparator<K>> IndexedFibonacciHeap<K, V, C> {
    /// Creates an empty heap ordered by `cmp`
    pub fn with_comparator(capacity: usize, cmp: C) -> Self {
        Self {
            forest: Forest::new(cmp),
            nodes: vec![None; capacity],
        }
    }

    /// Returns the comparator
    pub fn comparator(&self) -> &C {
        self.forest.comparator()
    }

    /// Degrees of the current roots, starting at the extremum
    pub fn root_degrees(&self) -> Vec<usize> {
        self.forest.root_degrees()
    }

    /// Checks the forest invariants and the index table bijection
    pub fn verify_invariants(&self) -> bool {
        if !self.forest.verify() {
            return false;
        }
        let mapped = self.nodes.iter().filter(|n| n.is_some()).count();
        let mut consistent = true;
        self.forest.for_each_node(|node| {
            consistent = self.nodes.get(node.index).copied().flatten()
                == Some(NonNull::from(node));
            consistent
        });
        consistent && mapped == self.forest.len()
    }

    /// Renders the forest as a Graphviz digraph, labelling nodes with their index
    #[cfg(feature = "dot")]
    pub fn dot(&self) -> String
    where
        K: std::fmt::Debug,
        V: std::fmt::Debug,
    {
        self.forest.dot("indexed_fibonacci_heap", true)
    }

    fn node(&self, index: usize) -> Option<NonNull<Node<K, V>>> {
        self.nodes.get(index).copied().flatten()
    }
}

impl<K, V, C: Comparator<K>> IndexedHeap<K, V> for IndexedFibonacciHeap<K, V, C> {
    fn capacity(&self) -> usize {
        self.nodes.len()
    }

    fn len(&self) -> usize {
        self.forest.len()
    }

    fn contains_index(&self, index: usize) -> bool {
        self.node(index).is_some()
    }

    fn insert(&mut self, index: usize, key: K, value: V) -> Result<(), HeapError> {
        check_index(index, self.capacity())?;
        if self.nodes[index].is_some() {
            return Err(HeapError::DuplicateIndex(index));
        }
        let node = Forest::<K, V, C>::alloc(index, key, value);
        self.forest.push_node(node);
        self.nodes[index] = Some(node);
        Ok(())
    }

    fn peek(&self) -> Option<(usize, &K, &V)> {
        self.forest.peek().map(|n| (n.index, &n.key, &n.value))
    }

    fn pop(&mut self) -> Option<(usize, K, V)> {
        let node = self.forest.extract_ext()?;
        // SAFETY: extract_ext hands back a detached node
        let entry = unsafe { into_entry(node) };
        self.nodes[entry.0] = None;
        Some(entry)
    }

    fn peek_index(&self, index: usize) -> Option<(&K, &V)> {
        // SAFETY: mapped nodes are owned by the forest for as long as &self
        self.node(index).map(|n| unsafe {
            let node = &*n.as_ptr();
            (&node.key, &node.value)
        })
    }

    fn change_key(&mut self, index: usize, key: K) -> Result<(), HeapError> {
        check_index(index, self.capacity())?;
        let node = self.nodes[index].ok_or(HeapError::AbsentIndex(index))?;
        // SAFETY: the index table only holds nodes owned by the forest
        unsafe {
            let current = &(*node.as_ptr()).key;
            match self.forest.comparator().compare(&key, current) {
                Ordering::Less => self.forest.decrease_key(node, key),
                Ordering::Greater => self.forest.reinsert(node, key),
                Ordering::Equal => (*node.as_ptr()).key = key,
            }
        }
        Ok(())
    }

    fn delete_index(&mut self, index: usize) -> Option<(K, V)> {
        let node = self.nodes.get_mut(index)?.take()?;
        // SAFETY: the node was mapped, so it is owned by the forest
        let (_, key, value) = unsafe {
            self.forest.remove(node);
            into_entry(node)
        };
        Some((key, value))
    }

    fn clear(&mut self) {
        self.forest.clear();
        self.nodes.iter_mut().for_each(|n| *n = None);
    }

    fn for_each<'a, F>(&'a self, mut visitor: F)
    where
        F: FnMut(usize, &'a K, &'a V) -> bool,
    {
        self.forest
            .for_each_node(|n| visitor(n.index, &n.key, &n.value));
    }
}
