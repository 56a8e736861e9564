//! Indexed Binomial Heap
//!
//! A [`BinomialHeap`](crate::binomial::BinomialHeap) whose entries are
//! addressed by an integer index in `[0, capacity)`.
//!
//! Key changes restore heap order by exchanging `(index, key, value)`
//! payloads between a node and its parent (promote) or its extremum child
//! (demote) rather than relinking nodes. Every exchange also exchanges the two
//! index-table entries, so `nodes[i]` always points at the node holding index
//! `i`.
//!
//! # Example
//!
//! ```rust
//! use rust_advanced_collections::IndexedHeap;
//! use rust_advanced_collections::indexed_binomial::IndexedBinomialHeap;
//!
//! let mut heap = IndexedBinomialHeap::new(8);
//! for (i, key) in [40, 10, 30, 20].into_iter().enumerate() {
//!     heap.insert(i, key, ()).unwrap();
//! }
//! heap.change_key(2, 5).unwrap();
//! assert_eq!(heap.peek().map(|(i, k, _)| (i, *k)), Some((2, 5)));
//! ```

use crate::binomial::{into_entry, Forest, Node};
use crate::compare::{Comparator, Natural, Reversed};
use crate::traits::{check_index, HeapError, IndexedHeap};
use std::ptr::NonNull;

/// Indexed binomial heap with a fixed index capacity
pub struct IndexedBinomialHeap<K, V, C = Natural> {
    forest: Forest<K, V, C>,
    nodes: Vec<Option<NonNull<Node<K, V>>>>,
}

impl<K: Ord, V> IndexedBinomialHeap<K, V> {
    /// Creates an empty min-heap accepting indices in `[0, capacity)`
    pub fn new(capacity: usize) -> Self {
        Self::with_comparator(capacity, Natural)
    }
}

impl<K: Ord, V> IndexedBinomialHeap<K, V, Reversed<Natural>> {
    /// Creates an empty max-heap accepting indices in `[0, capacity)`
    pub fn new_max(capacity: usize) -> Self {
        Self::with_comparator(capacity, Reversed(Natural))
    }
}

impl<K, V, C: Comparator<K>> IndexedBinomialHeap<K, V, C> {
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

    /// Orders of the root trees; strictly increasing
    pub fn root_orders(&self) -> Vec<usize> {
        self.forest.root_orders()
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
        self.forest.dot("indexed_binomial_heap", true)
    }

    fn node(&self, index: usize) -> Option<NonNull<Node<K, V>>> {
        self.nodes.get(index).copied().flatten()
    }

    /// Exchanges two payloads and the index-table entries that point at them
    unsafe fn swap(&mut self, a: NonNull<Node<K, V>>, b: NonNull<Node<K, V>>) {
        self.forest.swap_entries(a, b);
        self.nodes[(*a.as_ptr()).index] = Some(a);
        self.nodes[(*b.as_ptr()).index] = Some(b);
    }

    /// Moves the payload of `node` toward the root while it strictly precedes
    /// its parent (or unconditionally with `to_root`); returns where it ends up.
    unsafe fn promote(&mut self, node: NonNull<Node<K, V>>, to_root: bool) -> NonNull<Node<K, V>> {
        let mut node = node;
        while let Some(parent) = self.forest.parent(node) {
            if !to_root && !self.forest.precedes(node, parent) {
                break;
            }
            self.swap(node, parent);
            node = parent;
        }
        node
    }

    /// Moves the payload of `node` down while its extremum child strictly precedes it
    unsafe fn demote(&mut self, node: NonNull<Node<K, V>>) {
        let mut node = node;
        while let Some(child) = self.forest.extremum_child(node) {
            if !self.forest.precedes(child, node) {
                break;
            }
            self.swap(node, child);
            node = child;
        }
    }
}

impl<K, V, C: Comparator<K>> IndexedHeap<K, V> for IndexedBinomialHeap<K, V, C> {
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
        // SAFETY: the root is owned by the forest for as long as &self
        self.forest.find_ext().map(|n| unsafe {
            let node = &*n.as_ptr();
            (node.index, &node.key, &node.value)
        })
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
            (*node.as_ptr()).key = key;
            if self.promote(node, false) == node {
                self.demote(node);
            }
        }
        Ok(())
    }

    fn delete_index(&mut self, index: usize) -> Option<(K, V)> {
        let node = self.node(index)?;
        // SAFETY: the node was mapped, so it is owned by the forest; after the
        // forced promotion the payload for `index` sits in a root
        let (_, key, value) = unsafe {
            let root = self.promote(node, true);
            self.forest.remove_root(root);
            into_entry(root)
        };
        self.nodes[index] = None;
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

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(keys: &[i32]) -> IndexedBinomialHeap<i32, usize> {
        let mut heap = IndexedBinomialHeap::new(keys.len() + 2);
        for (i, k) in keys.iter().enumerate() {
            heap.insert(i, *k, i * 100).unwrap();
            assert!(heap.verify_invariants());
        }
        heap
    }

    #[test]
    fn test_basic_operations() {
        let mut heap = filled(&[50, 20, 40, 10, 30]);
        assert_eq!(heap.len(), 5);
        assert_eq!(heap.root_orders(), vec![0, 2]);
        assert_eq!(heap.peek(), Some((3, &10, &300)));
        assert_eq!(heap.peek_index(2), Some((&40, &200)));

        assert_eq!(heap.pop(), Some((3, 10, 300)));
        assert!(!heap.contains_index(3));
        assert!(heap.verify_invariants());
    }

    #[test]
    fn test_decrease_key_promotes() {
        let mut heap = filled(&[10, 20, 30, 40, 50, 60, 70, 80]);
        assert_eq!(heap.root_orders(), vec![3]);

        // Index 7 sits at the bottom of the single order-3 tree
        heap.change_key(7, 5).unwrap();
        assert!(heap.verify_invariants());
        assert_eq!(heap.peek(), Some((7, &5, &700)));
        assert_eq!(heap.peek_index(0), Some((&10, &0)));
    }

    #[test]
    fn test_increase_key_demotes() {
        let mut heap = filled(&[10, 20, 30, 40, 50, 60, 70, 80]);
        heap.change_key(0, 100).unwrap();
        assert!(heap.verify_invariants());
        assert_eq!(heap.peek(), Some((1, &20, &100)));
        assert_eq!(heap.peek_index(0), Some((&100, &0)));

        let order: Vec<_> = std::iter::from_fn(|| heap.pop()).map(|(i, _, _)| i).collect();
        assert_eq!(order, vec![1, 2, 3, 4, 5, 6, 7, 0]);
    }

    #[test]
    fn test_ties_do_not_swap() {
        let mut heap = filled(&[1, 2]);
        // Index 1 is the child of index 0; raising it to a tie keeps it there
        heap.change_key(1, 1).unwrap();
        assert_eq!(heap.peek().map(|(i, _, _)| i), Some(0));
        heap.change_key(0, 1).unwrap();
        assert_eq!(heap.peek().map(|(i, _, _)| i), Some(0));
        assert!(heap.verify_invariants());
    }

    #[test]
    fn test_delete_inner_index() {
        let keys = [15, 3, 9, 27, 1, 8, 4, 30, 11];
        let mut heap = filled(&keys);
        for i in [2, 7, 4, 0] {
            assert_eq!(heap.delete_index(i), Some((keys[i], i * 100)));
            assert!(!heap.contains_index(i));
            assert!(heap.verify_invariants());
        }
        assert_eq!(heap.len(), 5);

        let drained: Vec<_> = std::iter::from_fn(|| heap.pop()).map(|(_, k, _)| k).collect();
        assert_eq!(drained, vec![3, 4, 8, 11, 27]);
    }

    #[test]
    fn test_index_reuse() {
        let mut heap = filled(&[5, 6, 7]);
        assert_eq!(heap.delete_index(1), Some((6, 100)));
        heap.insert(1, 1, 999).unwrap();
        assert_eq!(heap.peek(), Some((1, &1, &999)));
        assert!(heap.verify_invariants());
    }

    #[test]
    fn test_index_errors() {
        let mut heap = IndexedBinomialHeap::new(2);
        heap.insert(1, 'b', ()).unwrap();
        assert_eq!(heap.insert(1, 'c', ()), Err(HeapError::DuplicateIndex(1)));
        assert_eq!(
            heap.insert(5, 'c', ()),
            Err(HeapError::IndexOutOfRange {
                index: 5,
                capacity: 2
            })
        );
        assert_eq!(heap.change_key(0, 'a'), Err(HeapError::AbsentIndex(0)));
        assert_eq!(heap.delete_index(0), None);
        assert_eq!(heap.peek_index(7), None);
        assert_eq!(heap.len(), 1);
    }

    #[test]
    fn test_max_heap_scenario() {
        let mut heap = IndexedBinomialHeap::new_max(3);
        heap.insert(0, 10, ()).unwrap();
        heap.insert(1, 3, ()).unwrap();
        heap.insert(2, 200, ()).unwrap();
        heap.change_key(1, 30).unwrap();
        heap.change_key(2, 20).unwrap();
        assert_eq!(heap.peek().map(|(i, k, _)| (i, *k)), Some((1, 30)));

        assert_eq!(heap.delete_index(0), Some((10, ())));
        assert_eq!(heap.delete_index(2), Some((20, ())));
        assert_eq!(heap.len(), 1);
        assert!(heap.contains_index(1));
        assert!(heap.verify_invariants());
    }

    #[test]
    fn test_clear() {
        let mut heap = filled(&[3, 1, 2]);
        heap.clear();
        assert!(heap.is_empty());
        assert!(!heap.contains_index(0));
        heap.insert(0, 7, 0).unwrap();
        assert_eq!(heap.pop(), Some((0, 7, 0)));
    }
}
