//! Binomial Heap implementation
//!
//! A binomial heap is a collection of binomial trees with:
//! - O(log n) push and pop
//! - O(log n) merge
//!
//! # Algorithm Overview
//!
//! A binomial heap maintains a forest of binomial trees, where:
//! - Each tree satisfies the heap property
//! - At most one tree of each order, kept in a root list of strictly
//!   increasing order
//! - This is analogous to binary representation of n
//!
//! **Binomial Tree Bₖ**: Recursively defined:
//! - B₀ is a single node
//! - Bₖ is formed by linking two B_{k-1} trees
//! - Bₖ has exactly 2ᵏ nodes, and its root has k children of orders
//!   k-1, k-2, ..., 0 from left to right
//!
//! Trees are stored left-child right-sibling: each node points at its
//! leftmost child and its next sibling.
//!
//! **Key Operations**:
//! - **Union**: merge both root lists by order, then walk the result linking
//!   equal-order neighbours (carry propagation)
//! - **Push**: union with a single-node tree
//! - **Pop**: remove the extremum root, reverse its children into a root list,
//!   and union that with the remaining roots
//!
//! The forest core in this module is shared with
//! [`IndexedBinomialHeap`](crate::indexed_binomial::IndexedBinomialHeap).

use crate::compare::{Comparator, Natural, Reversed};
use crate::traits::{Heap, MergeableHeap};
use log::trace;
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;

pub(crate) type Link<K, V> = Option<NonNull<Node<K, V>>>;

/// Internal node structure for binomial heap
///
/// Ownership flows from the root list downward through `child` and
/// `sibling`; `parent` is a non-owning back link.
pub(crate) struct Node<K, V> {
    /// Only meaningful for the indexed heap
    pub(crate) index: usize,
    pub(crate) key: K,
    pub(crate) value: V,
    order: usize,
    parent: Link<K, V>,
    /// Leftmost (highest order) child
    child: Link<K, V>,
    sibling: Link<K, V>,
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

/// Root list plus entry count, owning every node reachable from `head`
pub(crate) struct Forest<K, V, C> {
    head: Link<K, V>,
    len: usize,
    cmp: C,
    _owns: PhantomData<Box<Node<K, V>>>,
}

// Nodes are uniquely owned by the forest, so moving it moves them.
unsafe impl<K: Send, V: Send, C: Send> Send for Forest<K, V, C> {}

impl<K, V, C> Forest<K, V, C> {
    pub(crate) fn new(cmp: C) -> Self {
        Self {
            head: None,
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

    /// Allocates a detached order-0 node
    pub(crate) fn alloc(index: usize, key: K, value: V) -> NonNull<Node<K, V>> {
        NonNull::from(Box::leak(Box::new(Node {
            index,
            key,
            value,
            order: 0,
            parent: None,
            child: None,
            sibling: None,
        })))
    }

    fn roots(&self) -> SmallVec<[NonNull<Node<K, V>>; 16]> {
        let mut out = SmallVec::new();
        let mut current = self.head;
        while let Some(n) = current {
            out.push(n);
            current = unsafe { (*n.as_ptr()).sibling };
        }
        out
    }

    /// Orders of the root trees, in root-list order
    pub(crate) fn root_orders(&self) -> Vec<usize> {
        self.roots()
            .iter()
            .map(|r| unsafe { (*r.as_ptr()).order })
            .collect()
    }

    /// Visits every node depth-first until the visitor returns `false`
    pub(crate) fn for_each_node<'a, F>(&'a self, mut visitor: F)
    where
        F: FnMut(&'a Node<K, V>) -> bool,
    {
        let mut stack: Vec<NonNull<Node<K, V>>> = self.head.into_iter().collect();
        while let Some(n) = stack.pop() {
            // SAFETY: every node reachable from head is live while &self is
            let node: &'a Node<K, V> = unsafe { &*n.as_ptr() };
            if !visitor(node) {
                return;
            }
            stack.extend(node.sibling);
            stack.extend(node.child);
        }
    }

    /// Frees every node
    pub(crate) fn clear(&mut self) {
        let mut stack: Vec<NonNull<Node<K, V>>> = self.head.take().into_iter().collect();
        while let Some(n) = stack.pop() {
            // SAFETY: each node has exactly one owning link (child or sibling)
            let node = unsafe { Box::from_raw(n.as_ptr()) };
            stack.extend(node.sibling);
            stack.extend(node.child);
        }
        self.len = 0;
    }

    /// Parent of an owned node
    ///
    /// # Safety
    ///
    /// `node` must be owned by this forest.
    pub(crate) unsafe fn parent(&self, node: NonNull<Node<K, V>>) -> Link<K, V> {
        (*node.as_ptr()).parent
    }

    /// Exchanges the `(index, key, value)` payloads of two nodes
    ///
    /// # Safety
    ///
    /// Both nodes must be owned by this forest and distinct.
    pub(crate) unsafe fn swap_entries(&mut self, a: NonNull<Node<K, V>>, b: NonNull<Node<K, V>>) {
        let (a, b) = (&mut *a.as_ptr(), &mut *b.as_ptr());
        mem::swap(&mut a.index, &mut b.index);
        mem::swap(&mut a.key, &mut b.key);
        mem::swap(&mut a.value, &mut b.value);
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
            let mut label = format!("{:?}: {:?} | order {}", node.key, node.value, node.order);
            if show_index {
                label = format!("[{}] {}", node.index, label);
            }
            graph.node(id(node), label);
            if let Some(c) = node.child {
                graph.edge(id(node), id(unsafe { &*c.as_ptr() }));
            }
            if let Some(s) = node.sibling {
                graph.edge_with(id(node), id(unsafe { &*s.as_ptr() }), "style=dashed");
            }
            true
        });
        graph.to_string()
    }
}

impl<K, V, C: Comparator<K>> Forest<K, V, C> {
    #[inline]
    pub(crate) fn precedes(&self, a: NonNull<Node<K, V>>, b: NonNull<Node<K, V>>) -> bool {
        unsafe { self.cmp.precedes(&(*a.as_ptr()).key, &(*b.as_ptr()).key) }
    }

    #[inline]
    fn follows(&self, a: NonNull<Node<K, V>>, b: NonNull<Node<K, V>>) -> bool {
        unsafe { self.cmp.follows(&(*a.as_ptr()).key, &(*b.as_ptr()).key) }
    }

    /// The extremum root; the first one in root-list order wins ties
    pub(crate) fn find_ext(&self) -> Link<K, V> {
        let mut best: Link<K, V> = None;
        for r in self.roots() {
            match best {
                Some(b) if !self.precedes(r, b) => {}
                _ => best = Some(r),
            }
        }
        best
    }

    /// The child that precedes all its siblings; the leftmost one wins ties
    ///
    /// # Safety
    ///
    /// `node` must be owned by this forest.
    pub(crate) unsafe fn extremum_child(&self, node: NonNull<Node<K, V>>) -> Link<K, V> {
        let mut best: Link<K, V> = None;
        let mut current = (*node.as_ptr()).child;
        while let Some(c) = current {
            match best {
                Some(b) if !self.precedes(c, b) => {}
                _ => best = Some(c),
            }
            current = (*c.as_ptr()).sibling;
        }
        best
    }

    /// Takes ownership of a node from [`Forest::alloc`]
    pub(crate) fn push_node(&mut self, node: NonNull<Node<K, V>>) {
        // SAFETY: freshly allocated nodes are detached order-0 trees
        unsafe {
            self.head = self.union(self.head, Some(node));
        }
        self.len += 1;
    }

    /// Detaches the extremum root; release it with [`into_entry`]
    pub(crate) fn extract_ext(&mut self) -> Link<K, V> {
        let z = self.find_ext()?;
        // SAFETY: find_ext returns a root of this forest
        unsafe { self.remove_root(z) };
        Some(z)
    }

    /// Unlinks root `z`, unions its children back into the root list, and
    /// leaves `z` detached.
    ///
    /// # Safety
    ///
    /// `z` must be a root of this forest.
    pub(crate) unsafe fn remove_root(&mut self, z: NonNull<Node<K, V>>) {
        let next = (*z.as_ptr()).sibling.take();
        if self.head == Some(z) {
            self.head = next;
        } else {
            let mut current = self.head;
            while let Some(r) = current {
                if (*r.as_ptr()).sibling == Some(z) {
                    (*r.as_ptr()).sibling = next;
                    break;
                }
                current = (*r.as_ptr()).sibling;
            }
        }

        // Children run from order k-1 down to 0; reversed they form a root list
        let mut reversed: Link<K, V> = None;
        let mut current = (*z.as_ptr()).child.take();
        while let Some(c) = current {
            current = (*c.as_ptr()).sibling;
            (*c.as_ptr()).sibling = reversed;
            (*c.as_ptr()).parent = None;
            reversed = Some(c);
        }
        (*z.as_ptr()).order = 0;

        self.head = self.union(self.head, reversed);
        self.len -= 1;
    }

    /// Moves every node of `other` into this forest
    pub(crate) fn absorb(&mut self, other: &mut Self) {
        let theirs = other.head.take();
        // SAFETY: both lists are well-formed and disjoint
        unsafe {
            self.head = self.union(self.head, theirs);
        }
        self.len += other.len;
        other.len = 0;
    }

    /// Merges two root lists by non-decreasing order; ties take from `a` first
    unsafe fn merge_lists(mut a: Link<K, V>, mut b: Link<K, V>) -> Link<K, V> {
        let mut head: Link<K, V> = None;
        let mut tail: Link<K, V> = None;
        loop {
            let next = match (a, b) {
                (None, None) => break,
                (Some(x), None) | (None, Some(x)) => {
                    a = None;
                    b = None;
                    x
                }
                (Some(x), Some(y)) => {
                    if (*x.as_ptr()).order <= (*y.as_ptr()).order {
                        a = (*x.as_ptr()).sibling;
                        x
                    } else {
                        b = (*y.as_ptr()).sibling;
                        y
                    }
                }
            };
            match tail {
                None => head = Some(next),
                Some(t) => (*t.as_ptr()).sibling = Some(next),
            }
            tail = Some(next);
        }
        head
    }

    /// Unions two root lists into one with strictly increasing orders
    unsafe fn union(&mut self, a: Link<K, V>, b: Link<K, V>) -> Link<K, V> {
        let mut head = Self::merge_lists(a, b)?;
        let mut prev: Link<K, V> = None;
        let mut curr = head;
        let mut next = (*curr.as_ptr()).sibling;

        while let Some(nx) = next {
            let order = (*curr.as_ptr()).order;
            let after = (*nx.as_ptr()).sibling;
            let run_of_three = match after {
                Some(a) => (*a.as_ptr()).order == order,
                None => false,
            };

            if order != (*nx.as_ptr()).order || run_of_three {
                if run_of_three {
                    trace!("binomial union: deferring run of three order-{} trees", order);
                }
                prev = Some(curr);
                curr = nx;
            } else if self.follows(nx, curr) {
                (*curr.as_ptr()).sibling = after;
                Self::link(nx, curr);
            } else {
                match prev {
                    None => head = nx,
                    Some(p) => (*p.as_ptr()).sibling = Some(nx),
                }
                Self::link(curr, nx);
                curr = nx;
            }
            next = (*curr.as_ptr()).sibling;
        }
        Some(head)
    }

    /// Makes root `child` the leftmost child of root `parent`
    unsafe fn link(child: NonNull<Node<K, V>>, parent: NonNull<Node<K, V>>) {
        (*child.as_ptr()).parent = Some(parent);
        (*child.as_ptr()).sibling = (*parent.as_ptr()).child;
        (*parent.as_ptr()).child = Some(child);
        (*parent.as_ptr()).order += 1;
    }

    /// Checks root order, heap order, child orders, parent links and the
    /// entry count
    pub(crate) fn verify(&self) -> bool {
        let roots = self.roots();
        let mut total = 0usize;
        let mut last_order: Option<usize> = None;
        let mut stack = Vec::new();
        for &r in roots.iter() {
            let (order, parent) = unsafe { ((*r.as_ptr()).order, (*r.as_ptr()).parent) };
            if parent.is_some()
                || last_order.is_some_and(|o| o >= order)
                || order >= usize::BITS as usize
            {
                return false;
            }
            last_order = Some(order);
            total = match total.checked_add(1 << order) {
                Some(t) => t,
                None => return false,
            };
            stack.push(r);
        }
        if total != self.len {
            return false;
        }

        let mut count = 0;
        while let Some(n) = stack.pop() {
            count += 1;
            if count > self.len {
                return false;
            }
            let mut expected = unsafe { (*n.as_ptr()).order };
            let mut current = unsafe { (*n.as_ptr()).child };
            while let Some(c) = current {
                let child = unsafe { &*c.as_ptr() };
                if expected == 0
                    || child.order != expected - 1
                    || child.parent != Some(n)
                    || self.precedes(c, n)
                {
                    return false;
                }
                expected -= 1;
                stack.push(c);
                current = child.sibling;
            }
            if expected != 0 {
                return false;
            }
        }
        count == self.len
    }
}

impl<K, V, C> Drop for Forest<K, V, C> {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Binomial Heap
///
/// With the default [`Natural`] comparator this is a min-heap;
/// [`BinomialHeap::new_max`] builds the max-heap counterpart.
///
/// # Example
///
/// ```rust
/// use rust_advanced_collections::Heap;
/// use rust_advanced_collections::binomial::BinomialHeap;
///
/// let mut heap = BinomialHeap::new();
/// for key in [5, 3, 8] {
///     heap.push(key, key * 10);
/// }
/// assert_eq!(heap.root_orders(), vec![0, 1]);
/// assert_eq!(heap.peek(), Some((&3, &30)));
/// ```
pub struct BinomialHeap<K, V, C = Natural> {
    forest: Forest<K, V, C>,
}

impl<K: Ord, V> BinomialHeap<K, V> {
    /// Creates an empty min-heap
    pub fn new() -> Self {
        Self::with_comparator(Natural)
    }
}

impl<K: Ord, V> BinomialHeap<K, V, Reversed<Natural>> {
    /// Creates an empty max-heap
    pub fn new_max() -> Self {
        Self::with_comparator(Reversed(Natural))
    }
}

impl<K, V, C: Comparator<K>> BinomialHeap<K, V, C> {
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

    /// Orders of the root trees; strictly increasing
    pub fn root_orders(&self) -> Vec<usize> {
        self.forest.root_orders()
    }

    /// Checks root-list order, heap order, tree shape and size
    pub fn verify_invariants(&self) -> bool {
        self.forest.verify()
    }

    /// Renders the forest as a Graphviz digraph; sibling links are dashed
    #[cfg(feature = "dot")]
    pub fn dot(&self) -> String
    where
        K: std::fmt::Debug,
        V: std::fmt::Debug,
    {
        self.forest.dot("binomial_heap", false)
    }
}

impl<K, V, C: Comparator<K>> Heap<K, V> for BinomialHeap<K, V, C> {
    fn len(&self) -> usize {
        self.forest.len()
    }

    fn push(&mut self, key: K, value: V) {
        self.forest.push_node(Forest::<K, V, C>::alloc(0, key, value));
    }

    fn peek(&self) -> Option<(&K, &V)> {
        // SAFETY: the root is owned by the forest for as long as &self
        self.forest.find_ext().map(|n| unsafe {
            let node = &*n.as_ptr();
            (&node.key, &node.value)
        })
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

impl<K, V, C: Comparator<K>> MergeableHeap<K, V> for BinomialHeap<K, V, C> {
    fn merge(&mut self, other: &mut Self) {
        self.forest.absorb(&mut other.forest);
    }
}

impl<K, V, C: Comparator<K> + Default> Default for BinomialHeap<K, V, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<K, V, C: Comparator<K>> Extend<(K, V)> for BinomialHeap<K, V, C> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.push(key, value);
        }
    }
}

impl<K, V, C: Comparator<K> + Default> FromIterator<(K, V)> for BinomialHeap<K, V, C> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut heap = Self::default();
        heap.extend(iter);
        heap
    }
}
