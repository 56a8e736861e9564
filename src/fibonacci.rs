//! Fibonacci Heap implementation
//!
//! A Fibonacci heap is a data structure for priority queue operations with:
//! - O(1) amortized push, decrease-key, and merge
//! - O(log n) amortized pop
//!
//! The structure consists of a collection of heap-ordered trees. Roots are
//! linked in a circular doubly linked ring (see [`crate::ring`]), as is every
//! child list. The heap caches a pointer to the extremum root.
//!
//! Pop defers all restructuring to a single consolidation pass that links
//! roots of equal degree until every root degree is distinct. Decrease-key
//! cuts the node from its parent and cascades through marked ancestors, which
//! keeps every degree within `floor(log_phi n) + 1`.
//!
//! The forest core in this module is shared with
//! [`IndexedFibonacciHeap`](crate::indexed_fibonacci::IndexedFibonacciHeap).
//!
//! # Example
//!
//! ```rust
//! use rust_advanced_collections::{Heap, MergeableHeap};
//! use rust_advanced_collections::fibonacci::FibonacciHeap;
//!
//! let mut a = FibonacciHeap::new();
//! a.push(5, "five");
//! a.push(1, "one");
//!
//! let mut b = FibonacciHeap::new();
//! b.push(3, "three");
//!
//! a.merge(&mut b);
//! assert!(b.is_empty());
//! assert_eq!(a.pop(), Some((1, "one")));
//! assert_eq!(a.pop(), Some((3, "three")));
//! ```

use crate::compare::{Comparator, Natural, Reversed};
use crate::ring::{self, Ringed};
use crate::traits::{Heap, MergeableHeap};
use log::{debug, trace};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::marker::PhantomData;
use std::ptr::NonNull;

pub(crate) type Link<K, V> = Option<NonNull<Node<K, V>>>;

/// The golden ratio
const PHI: f64 = 1.618_033_988_749_895;

pub(crate) struct Node<K, V> {
    /// Only meaningful for the indexed heap
    pub(crate) index: usize,
    pub(crate) key: K,
    pub(crate) value: V,
    degree: usize,
    mark: bool,
    parent: Link<K, V>,
    child: Link<K, V>,
    prev: Link<K, V>,
    next: Link<K, V>,
}

impl<K, V> Ringed for Node<K, V> {
    fn prev(&self) -> Option<NonNull<Self>> {
        self.prev
    }

    fn next(&self) -> Option<NonNull<Self>> {
        self.next
    }

    fn set_prev(&mut self, prev: Option<NonNull<Self>>) {
        self.prev = prev;
    }

    fn set_next(&mut self, next: Option<NonNull<Self>>) {
        self.next = next;
    }
}

/// Upper bound on any node degree in a heap of `n` entries
pub(crate) fn max_degree(n: usize) -> usize {
    if n <= 1 {
        return 1;
    }
    ((n as f64).ln() / PHI.ln()).floor() as usize + 1
}

/// Frees a node that has been detached from the forest and returns its contents.
///
/// # Safety
///
/// `node` must come from [`Forest::alloc`] and no longer be reachable from any forest.
pub(crate) unsafe fn into_entry<K, V>(node: NonNull<Node<K, V>>) -> (usize, K, V) {
    let node = *Box::from_raw(node.as_ptr());
    (node.index, node.key, node.value)
}

/// Root ring plus the cached extremum, owning every node reachable from it
pub(crate) struct Forest<K, V, C> {
    ext: Link<K, V>,
    len: usize,
    cmp: C,
    _owns: PhantomData<Box<Node<K, V>>>,
}

// Nodes are uniquely owned by the forest, so moving it moves them.
unsafe impl<K: Send, V: Send, C: Send> Send for Forest<K, V, C> {}

impl<K, V, C> Forest<K, V, C> {
    pub(crate) fn new(cmp: C) -> Self {
        Self {
            ext: None,
            len: 0,
            cmp,
            _owns: PhantomData,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Allocates a detached node
    pub(crate) fn alloc(index: usize, key: K, value: V) -> NonNull<Node<K, V>> {
        NonNull::from(Box::leak(Box::new(Node {
            index,
            key,
            value,
            degree: 0,
            mark: false,
            parent: None,
            child: None,
            prev: None,
            next: None,
        })))
    }

    /// The extremum node
    pub(crate) fn peek(&self) -> Option<&Node<K, V>> {
        // SAFETY: ext is owned by the forest and lives as long as &self
        self.ext.map(|n| unsafe { &*n.as_ptr() })
    }

    /// Degrees of the roots, starting at the extremum
    pub(crate) fn root_degrees(&self) -> Vec<usize> {
        unsafe {
            ring::members(self.ext)
                .iter()
                .map(|r| (*r.as_ptr()).degree)
                .collect()
        }
    }

    /// Visits every node depth-first until the visitor returns `false`
    pub(crate) fn for_each_node<'a, F>(&'a self, mut visitor: F)
    where
        F: FnMut(&'a Node<K, V>) -> bool,
    {
        let mut stack: Vec<NonNull<Node<K, V>>> = unsafe { ring::members(self.ext) }.into_vec();
        while let Some(n) = stack.pop() {
            // SAFETY: every node reachable from ext is live while &self is
            let node: &'a Node<K, V> = unsafe { &*n.as_ptr() };
            if !visitor(node) {
                return;
            }
            stack.extend(unsafe { ring::members(node.child) });
        }
    }

    /// Frees every node
    pub(crate) fn clear(&mut self) {
        let mut stack: Vec<NonNull<Node<K, V>>> =
            unsafe { ring::members(self.ext.take()) }.into_vec();
        while let Some(n) = stack.pop() {
            // SAFETY: each node is reached exactly once through its unique ring
            let node = unsafe { Box::from_raw(n.as_ptr()) };
            stack.extend(unsafe { ring::members(node.child) });
        }
        self.len = 0;
    }

    #[cfg(feature = "dot")]
    pub(crate) fn dot(&self, name: &str, show_index: bool) -> String
    where
        K: std::fmt::Debug,
        V: std::fmt::Debug,
    {
        let id = |n: &Node<K, V>| format!("n{:p}", n as *const Node<K, V>);
        let mut graph = crate::dot::DotGraph::new(name);
        self.for_each_node(|node| {
            let mut label = format!("{:?}: {:?}", node.key, node.value);
            if show_index {
                label = format!("[{}] {}", node.index, label);
            }
            if node.mark {
                label.push_str(" *");
            }
            graph.node(id(node), label);
            for c in unsafe { ring::members(node.child) } {
                graph.edge(id(node), id(unsafe { &*c.as_ptr() }));
            }
            true
        });
        let roots = unsafe { ring::members(self.ext) };
        for pair in roots.windows(2) {
            let (a, b) = unsafe { (&*pair[0].as_ptr(), &*pair[1].as_ptr()) };
            graph.edge_with(id(a), id(b), "style=dashed");
        }
        graph.to_string()
    }
}

impl<K, V, C: Comparator<K>> Forest<K, V, C> {
    #[inline]
    fn precedes(&self, a: NonNull<Node<K, V>>, b: NonNull<Node<K, V>>) -> bool {
        unsafe { self.cmp.precedes(&(*a.as_ptr()).key, &(*b.as_ptr()).key) }
    }

    /// Adds a detached node to the root ring, keeping `ext` current
    ///
    /// # Safety
    ///
    /// `node` must be owned by this forest and linked into no ring.
    unsafe fn add_root(&mut self, node: NonNull<Node<K, V>>) {
        (*node.as_ptr()).parent = None;
        (*node.as_ptr()).mark = false;
        match self.ext {
            None => self.ext = Some(ring::insert(None, node)),
            Some(ext) => {
                ring::insert(Some(ext), node);
                if self.precedes(node, ext) {
                    self.ext = Some(node);
                }
            }
        }
    }

    /// Takes ownership of a node from [`Forest::alloc`]
    pub(crate) fn push_node(&mut self, node: NonNull<Node<K, V>>) {
        // SAFETY: freshly allocated nodes are detached
        unsafe { self.add_root(node) };
        self.len += 1;
    }

    /// Detaches the extremum node, consolidating the remaining roots
    ///
    /// The returned node is no longer owned by the forest; release it with
    /// [`into_entry`].
    pub(crate) fn extract_ext(&mut self) -> Link<K, V> {
        let z = self.ext?;
        unsafe {
            let children = (*z.as_ptr()).child.take();
            for c in ring::members(children) {
                (*c.as_ptr()).parent = None;
                (*c.as_ptr()).mark = false;
            }
            (*z.as_ptr()).degree = 0;

            let rest = ring::cut(z, z);
            self.ext = ring::meld(rest, children);
            self.len -= 1;
            if self.ext.is_some() {
                self.consolidate();
            }
        }
        Some(z)
    }

    /// Links roots of equal degree until all root degrees are distinct,
    /// then re-scans the roots for the extremum.
    unsafe fn consolidate(&mut self) {
        let Some(mut head) = self.ext else {
            return;
        };
        let roots = ring::members(Some(head));
        let before = roots.len();

        let mut table: SmallVec<[Link<K, V>; 32]> = SmallVec::new();
        table.resize(max_degree(self.len) + 1, None);

        for w in roots {
            let mut x = w;
            loop {
                let d = (*x.as_ptr()).degree;
                if d >= table.len() {
                    table.resize(d + 1, None);
                }
                match table[d] {
                    Some(y) if y != x => {
                        table[d] = None;
                        // Ties keep the probe as winner
                        let (winner, loser) = if self.precedes(y, x) { (y, x) } else { (x, y) };
                        head = ring::cut(head, loser).unwrap_or(winner);
                        self.link(loser, winner);
                        x = winner;
                    }
                    _ => {
                        table[d] = Some(x);
                        break;
                    }
                }
            }
        }

        let remaining = ring::members(Some(head));
        let mut best = head;
        for &r in remaining.iter() {
            if self.precedes(r, best) {
                best = r;
            }
        }
        self.ext = Some(best);
        debug!(
            "fibonacci consolidate: {} roots -> {} ({} entries)",
            before,
            remaining.len(),
            self.len
        );
    }

    /// Makes the detached root `child` a child of `parent`
    unsafe fn link(&mut self, child: NonNull<Node<K, V>>, parent: NonNull<Node<K, V>>) {
        (*child.as_ptr()).parent = Some(parent);
        (*child.as_ptr()).mark = false;
        let head = ring::insert((*parent.as_ptr()).child, child);
        (*parent.as_ptr()).child = Some(head);
        (*parent.as_ptr()).degree += 1;
    }

    /// Moves `node` from its parent's child ring to the root ring
    unsafe fn cut(&mut self, node: NonNull<Node<K, V>>, parent: NonNull<Node<K, V>>) {
        if let Some(head) = (*parent.as_ptr()).child {
            (*parent.as_ptr()).child = ring::cut(head, node);
        }
        (*parent.as_ptr()).degree -= 1;
        self.add_root(node);
    }

    /// Cuts `node` from its parent, then keeps cutting ancestors that had
    /// already lost a child
    unsafe fn cut_and_cascade(&mut self, node: NonNull<Node<K, V>>) {
        let mut node = node;
        while let Some(parent) = (*node.as_ptr()).parent {
            self.cut(node, parent);
            if (*parent.as_ptr()).parent.is_none() {
                break;
            }
            let mark = &mut (*parent.as_ptr()).mark;
            *mark = !*mark;
            if *mark {
                break;
            }
            trace!("fibonacci cascading cut (degree {})", (*parent.as_ptr()).degree);
            node = parent;
        }
    }

    /// Replaces the key of `node` with one that does not follow it
    ///
    /// # Safety
    ///
    /// `node` must be owned by this forest.
    pub(crate) unsafe fn decrease_key(&mut self, node: NonNull<Node<K, V>>, key: K) {
        (*node.as_ptr()).key = key;
        if let Some(parent) = (*node.as_ptr()).parent {
            if self.precedes(node, parent) {
                self.cut_and_cascade(node);
            }
        }
        if let Some(ext) = self.ext {
            if self.precedes(node, ext) {
                self.ext = Some(node);
            }
        }
    }

    /// Detaches an arbitrary node, consolidating the remaining roots
    ///
    /// # Safety
    ///
    /// `node` must be owned by this forest.
    pub(crate) unsafe fn remove(&mut self, node: NonNull<Node<K, V>>) {
        if (*node.as_ptr()).parent.is_some() {
            self.cut_and_cascade(node);
        }
        self.ext = Some(node);
        self.extract_ext();
    }

    /// Detaches a node and re-inserts it with a new key
    ///
    /// # Safety
    ///
    /// `node` must be owned by this forest.
    pub(crate) unsafe fn reinsert(&mut self, node: NonNull<Node<K, V>>, key: K) {
        self.remove(node);
        (*node.as_ptr()).key = key;
        self.push_node(node);
    }

    /// Moves every node of `other` into this forest
    pub(crate) fn absorb(&mut self, other: &mut Self) {
        let Some(theirs) = other.ext.take() else {
            return;
        };
        let ours = self.ext;
        unsafe {
            ring::meld(ours, Some(theirs));
        }
        self.ext = match ours {
            Some(ours) if !self.precedes(theirs, ours) => Some(ours),
            _ => Some(theirs),
        };
        self.len += other.len;
        other.len = 0;
    }

    /// Checks heap order, ring shape, parent links, degrees, the degree
    /// bound, the extremum cache, and the entry count
    pub(crate) fn verify(&self) -> bool {
        let Some(ext) = self.ext else {
            return self.len == 0;
        };
        let limit = self.len;
        let bound = max_degree(self.len);
        unsafe {
            if !ring::is_well_formed(ext, limit) {
                return false;
            }
            let mut stack = Vec::new();
            for r in ring::members(Some(ext)) {
                if (*r.as_ptr()).parent.is_some() || self.precedes(r, ext) {
                    return false;
                }
                stack.push(r);
            }

            let mut count = 0;
            while let Some(n) = stack.pop() {
                count += 1;
                if count > self.len {
                    return false;
                }
                let node = &*n.as_ptr();
                if node.degree > bound {
                    return false;
                }
                let Some(child) = node.child else {
                    if node.degree != 0 {
                        return false;
                    }
                    continue;
                };
                if !ring::is_well_formed(child, limit) {
                    return false;
                }
                let children = ring::members(Some(child));
                if children.len() != node.degree {
                    return false;
                }
                for c in children {
                    if (*c.as_ptr()).parent != Some(n) || self.precedes(c, n) {
                        return false;
                    }
                    stack.push(c);
                }
            }
            count == self.len
        }
    }
}

impl<K, V, C> Drop for Forest<K, V, C> {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Fibonacci Heap
///
/// With the default [`Natural`] comparator this is a min-heap;
/// [`FibonacciHeap::new_max`] builds the max-heap counterpart.
pub struct FibonacciHeap<K, V, C = Natural> {
    forest: Forest<K, V, C>,
}

impl<K: Ord, V> FibonacciHeap<K, V> {
    /// Creates an empty min-heap
    pub fn new() -> Self {
        Self::with_comparator(Natural)
    }
}

impl<K: Ord, V> FibonacciHeap<K, V, Reversed<Natural>> {
    /// Creates an empty max-heap
    pub fn new_max() -> Self {
        Self::with_comparator(Reversed(Natural))
    }
}

impl<K, V, C: Comparator<K>> FibonacciHeap<K, V, C> {
    /// Creates an empty heap ordered by `cmp`
    pub fn with_comparator(cmp: C) -> Self {
        Self {
            forest: Forest::new(cmp),
        }
    }

    /// Returns the comparator
    pub fn comparator(&self) -> &C {
        self.forest.comparator()
    }

    /// Degrees of the current roots, starting at the extremum
    ///
    /// Right after a [`pop`](Heap::pop) these are pairwise distinct.
    pub fn root_degrees(&self) -> Vec<usize> {
        self.forest.root_degrees()
    }

    /// Checks heap order, ring shape, degree bookkeeping and the extremum cache
    pub fn verify_invariants(&self) -> bool {
        self.forest.verify()
    }

    /// Renders the forest as a Graphviz digraph; marked nodes carry a `*`
    #[cfg(feature = "dot")]
    pub fn dot(&self) -> String
    where
        K: std::fmt::Debug,
        V: std::fmt::Debug,
    {
        self.forest.dot("fibonacci_heap", false)
    }
}

impl<K, V, C: Comparator<K>> Heap<K, V> for FibonacciHeap<K, V, C> {
    fn len(&self) -> usize {
        self.forest.len()
    }

    fn push(&mut self, key: K, value: V) {
        self.forest.push_node(Forest::<K, V, C>::alloc(0, key, value));
    }

    fn peek(&self) -> Option<(&K, &V)> {
        self.forest.peek().map(|n| (&n.key, &n.value))
    }

    fn pop(&mut self) -> Option<(K, V)> {
        let node = self.forest.extract_ext()?;
        // SAFETY: extract_ext hands back a detached node
        let (_, key, value) = unsafe { into_entry(node) };
        Some((key, value))
    }

    fn clear(&mut self) {
        self.forest.clear();
    }

    fn compare_keys(&self, a: &K, b: &K) -> Ordering {
        self.forest.comparator().compare(a, b)
    }

    fn for_each<'a, F>(&'a self, mut visitor: F)
    where
        F: FnMut(&'a K, &'a V) -> bool,
    {
        self.forest.for_each_node(|n| visitor(&n.key, &n.value));
    }
}

impl<K, V, C: Comparator<K>> MergeableHeap<K, V> for FibonacciHeap<K, V, C> {
    fn merge(&mut self, other: &mut Self) {
        self.forest.absorb(&mut other.forest);
    }
}

impl<K, V, C: Comparator<K> + Default> Default for FibonacciHeap<K, V, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<K, V, C: Comparator<K>> Extend<(K, V)> for FibonacciHeap<K, V, C> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.push(key, value);
        }
    }
}

impl<K, V, C: Comparator<K> + Default> FromIterator<(K, V)> for FibonacciHeap<K, V, C> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut heap = Self::default();
        heap.extend(iter);
        heap
    }
}
