//! Threaded Patricia trie over byte-string keys
//!
//! Keys are compared as bit strings. Every node stores one key and the
//! position of the bit it tests; a node's left link follows keys whose bit is
//! 0 and its right link keys whose bit is 1. A link whose target tests a
//! later bit than its source is a tree edge. Any other link is a *thread*
//! back up to the node that holds the key reached by that search. Every
//! stored key is the target of exactly one thread.
//!
//! The root tests bit 0, holds a real key and uses only its left link; with a
//! single key that link threads back to the root itself.
//!
//! Since threads form cycles, nodes live in a [`SlotMap`] arena and link to
//! each other by [`NodeId`] handles.
//!
//! Two keys that differ only in trailing zero bytes have no distinguishing
//! bit, so the second of them is rejected with [`TrieError::AmbiguousKey`].
//!
//! # Example
//!
//! ```rust
//! use rust_advanced_collections::patricia::PatriciaTrie;
//! use rust_advanced_collections::traversal::OrderedTrie;
//!
//! let mut trie = PatriciaTrie::new();
//! for (key, value) in [("box", 2), ("dad", 3), ("dance", 13), ("dome", 7)] {
//!     trie.put(key.as_bytes(), value).unwrap();
//! }
//!
//! let mut found = Vec::new();
//! trie.matches(b"d***e", |key, value| {
//!     found.push((key.to_vec(), *value));
//!     true
//! });
//! assert_eq!(found, vec![(b"dance".to_vec(), 13)]);
//! assert_eq!(trie.select(1), Some((b"dad".to_vec(), &3)));
//! ```

use crate::binary_trie::TrieError;
use crate::bitstring::{Bit, BitPattern, BitString};
use crate::traversal::{Order, OrderedTrie, Step};
use log::{debug, trace};
use slotmap::{new_key_type, SecondaryMap, SlotMap};
use std::mem;

new_key_type! {
    /// Arena handle of a trie node
    struct NodeId;
}

#[derive(Debug, Clone)]
struct Node<V> {
    key: BitString,
    value: V,
    /// Bit tested here; 0 only at the root
    bp: usize,
    /// Targets of the 0 and 1 links; only the root's right link is `None`
    links: [Option<NodeId>; 2],
}

/// Link direction taken by `key` at a node testing bit `bp`
fn dir(key: &BitString, bp: usize) -> usize {
    usize::from(key.bit(bp))
}

/// Patricia trie mapping non-empty byte strings to values
#[derive(Debug, Clone)]
pub struct PatriciaTrie<V> {
    nodes: SlotMap<NodeId, Node<V>>,
    root: Option<NodeId>,
}

impl<V> Default for PatriciaTrie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> PatriciaTrie<V> {
    /// Creates an empty trie
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root: None,
        }
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn bp(&self, id: NodeId) -> usize {
        self.nodes[id].bp
    }

    /// Target of a link; the root's missing right link reads as a self-thread
    fn link(&self, id: NodeId, dir: usize) -> NodeId {
        self.nodes[id].links[dir].unwrap_or(id)
    }

    fn is_tree_edge(&self, from: NodeId, to: NodeId) -> bool {
        self.bp(to) > self.bp(from)
    }

    /// The node at the end of `key`'s search path
    fn search(&self, key: &BitString) -> Option<NodeId> {
        let root = self.root?;
        let (mut prev, mut curr) = (root, self.link(root, 0));
        while self.is_tree_edge(prev, curr) {
            prev = curr;
            curr = self.link(curr, dir(key, self.bp(curr)));
        }
        Some(curr)
    }

    fn find(&self, key: &[u8]) -> Option<&Node<V>> {
        if key.is_empty() {
            return None;
        }
        let node = &self.nodes[self.search(&BitString::from_bytes(key))?];
        (node.key.as_bytes() == key).then_some(node)
    }

    /// Stores `value` under `key`, returning the value it replaced
    ///
    /// # Errors
    ///
    /// [`TrieError::EmptyKey`] for an empty key, and
    /// [`TrieError::AmbiguousKey`] when `key` equals a stored key padded or
    /// truncated by zero bytes. The trie is unchanged on error.
    pub fn put(&mut self, key: &[u8], value: V) -> Result<Option<V>, TrieError> {
        if key.is_empty() {
            return Err(TrieError::EmptyKey);
        }
        let bits = BitString::from_bytes(key);
        let Some(root) = self.root else {
            let id = self.nodes.insert_with_key(|id| Node {
                key: bits,
                value,
                bp: 0,
                links: [Some(id), None],
            });
            self.root = Some(id);
            return Ok(None);
        };

        let found = self.search(&bits).unwrap_or(root);
        if self.nodes[found].key == bits {
            return Ok(Some(mem::replace(&mut self.nodes[found].value, value)));
        }
        let d = self.nodes[found].key.diff(&bits);
        if d == 0 {
            return Err(TrieError::AmbiguousKey);
        }

        // Descend to the first link that is a thread or skips past bit d
        let (mut parent, mut parent_dir) = (root, 0);
        let mut child = self.link(root, 0);
        while self.is_tree_edge(parent, child) && self.bp(child) < d {
            parent = child;
            parent_dir = dir(&bits, self.bp(child));
            child = self.link(child, parent_dir);
        }

        let self_dir = dir(&bits, d);
        let id = self.nodes.insert_with_key(|id| {
            let mut links = [Some(child); 2];
            links[self_dir] = Some(id);
            Node {
                key: bits,
                value,
                bp: d,
                links,
            }
        });
        self.nodes[parent].links[parent_dir] = Some(id);
        trace!("patricia: split at bit {} below bit {}", d, self.bp(parent));
        Ok(None)
    }

    /// The value stored under `key`; `None` for absent and empty keys
    pub fn get(&self, key: &[u8]) -> Option<&V> {
        self.find(key).map(|node| &node.value)
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.find(key).is_some()
    }

    /// Tree parent of `target` on `key`'s search path and the direction of
    /// its link; `None` for the root
    fn tree_parent(&self, root: NodeId, target: NodeId, key: &BitString) -> Option<(NodeId, usize)> {
        let (mut parent, mut parent_dir) = (root, 0);
        let mut child = self.link(root, 0);
        while self.is_tree_edge(parent, child) {
            if child == target {
                return Some((parent, parent_dir));
            }
            parent = child;
            parent_dir = dir(key, self.bp(child));
            child = self.link(child, parent_dir);
        }
        None
    }

    /// Removes `key`, returning its value
    ///
    /// The node whose thread reaches the target (the referrer) gives up its
    /// tree position to its other link. If the referrer is not the target
    /// itself, it then takes over the target's bit and links.
    pub fn delete(&mut self, key: &[u8]) -> Option<V> {
        let root = self.root?;
        if key.is_empty() {
            return None;
        }
        let bits = BitString::from_bytes(key);

        let (mut grand, mut prev) = (root, root);
        let mut curr = self.link(root, 0);
        while self.is_tree_edge(prev, curr) {
            grand = prev;
            prev = curr;
            curr = self.link(curr, dir(&bits, self.bp(curr)));
        }
        let (target, referrer) = (curr, prev);
        if self.nodes[target].key != bits {
            return None;
        }
        if self.nodes.len() == 1 {
            self.root = None;
            return self.nodes.remove(target).map(|node| node.value);
        }

        let parent = self.tree_parent(root, target, &bits);
        let thread_dir = dir(&bits, self.bp(referrer));
        let other = self.link(referrer, 1 - thread_dir);
        let grand_dir = dir(&bits, self.bp(grand));
        self.nodes[grand].links[grand_dir] = Some(other);

        if referrer == target {
            trace!("patricia: removed node at bit {}", self.bp(target));
        } else {
            let (bp, links) = (self.bp(target), self.nodes[target].links);
            let moved = &mut self.nodes[referrer];
            moved.bp = bp;
            moved.links = links;
            if target == root {
                debug!("patricia: promoted a new root");
                self.root = Some(referrer);
            } else if let Some((np, np_dir)) = parent {
                self.nodes[np].links[np_dir] = Some(referrer);
            }
            trace!("patricia: relocated referrer into bit {}", bp);
        }
        self.nodes.remove(target).map(|node| node.value)
    }

    /// Removes every key
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// The longest stored key that is a prefix of `query`
    pub fn longest_prefix_of(&self, query: &[u8]) -> Option<(Vec<u8>, &V)> {
        (1..=query.len())
            .rev()
            .find_map(|n| self.get(&query[..n]).map(|v| (query[..n].to_vec(), v)))
    }

    /// Visits every key starting with `prefix`, in ascending order, until the
    /// visitor returns `false`
    pub fn with_prefix<'a, F>(&'a self, prefix: &[u8], mut visitor: F)
    where
        F: FnMut(&[u8], &'a V) -> bool,
    {
        let Some(root) = self.root else {
            return;
        };
        let wanted = BitString::from_bytes(prefix);
        let (mut prev, mut curr) = (root, self.link(root, 0));
        while self.is_tree_edge(prev, curr) && self.bp(curr) <= wanted.len() {
            prev = curr;
            curr = self.link(curr, dir(&wanted, self.bp(curr)));
        }
        self.walk_sorted(prev, curr, false, &mut |node: &'a Node<V>| {
            !node.key.has_prefix(&wanted) || visitor(node.key.as_bytes(), &node.value)
        });
    }

    /// Visits, in ascending order, every key of the pattern's length whose
    /// bytes equal the pattern's literal bytes; `*` matches any byte
    pub fn matches<'a, F>(&'a self, pattern: &[u8], mut visitor: F)
    where
        F: FnMut(&[u8], &'a V) -> bool,
    {
        let Some(root) = self.root else {
            return;
        };
        if pattern.is_empty() {
            return;
        }
        let pattern = BitPattern::new(pattern);
        let mut stack = vec![(root, self.link(root, 0))];
        while let Some((parent, id)) = stack.pop() {
            if self.is_tree_edge(parent, id) {
                match pattern.bit(self.bp(id)) {
                    Bit::Zero => stack.push((id, self.link(id, 0))),
                    Bit::One => stack.push((id, self.link(id, 1))),
                    Bit::Any => {
                        stack.push((id, self.link(id, 1)));
                        stack.push((id, self.link(id, 0)));
                    }
                }
            } else {
                let node = &self.nodes[id];
                let key = node.key.as_bytes();
                if pattern.matches(key) && !visitor(key, &node.value) {
                    return;
                }
            }
        }
    }

    /// Emits thread targets below the link `from -> to` in key order
    fn walk_sorted<'a, F>(&'a self, from: NodeId, to: NodeId, descending: bool, visit: &mut F) -> bool
    where
        F: FnMut(&'a Node<V>) -> bool,
    {
        let (first, second) = if descending { (1, 0) } else { (0, 1) };
        let mut stack = vec![(from, to)];
        while let Some((parent, id)) = stack.pop() {
            if self.is_tree_edge(parent, id) {
                stack.push((id, self.link(id, second)));
                stack.push((id, self.link(id, first)));
            } else if !visit(&self.nodes[id]) {
                return false;
            }
        }
        true
    }

    /// Visits every node once in a recursive order, following tree edges only
    fn walk_tree<'a, F>(&'a self, root: NodeId, steps: [Step; 3], visit: &mut F) -> bool
    where
        F: FnMut(&'a Node<V>) -> bool,
    {
        let mut stack = vec![(root, 0usize)];
        while let Some((id, i)) = stack.pop() {
            if i == steps.len() {
                continue;
            }
            stack.push((id, i + 1));
            let side = match steps[i] {
                Step::Visit => {
                    if !visit(&self.nodes[id]) {
                        return false;
                    }
                    continue;
                }
                Step::Left => 0,
                Step::Right => 1,
            };
            if let Some(child) = self.nodes[id].links[side] {
                if self.is_tree_edge(id, child) {
                    stack.push((child, 0));
                }
            }
        }
        true
    }

    /// First or last key: keep following one side until a thread
    fn extreme(&self, side: usize) -> Option<(Vec<u8>, &V)> {
        let root = self.root?;
        let (mut prev, mut curr) = (root, self.link(root, 0));
        while self.is_tree_edge(prev, curr) {
            prev = curr;
            curr = self.link(curr, side);
        }
        let node = &self.nodes[curr];
        Some((node.key.as_bytes().to_vec(), &node.value))
    }

    /// Checks the root shape, that tree edges form a tree over every node,
    /// that each key is the target of exactly one thread, and that every key
    /// is found by its own search
    pub fn verify_invariants(&self) -> bool {
        let Some(root) = self.root else {
            return self.nodes.is_empty();
        };
        let Some(head) = self.nodes.get(root) else {
            return false;
        };
        if head.bp != 0 || head.links[0].is_none() || head.links[1].is_some() {
            return false;
        }

        let mut seen: SecondaryMap<NodeId, ()> = SecondaryMap::new();
        seen.insert(root, ());
        let mut threads: SecondaryMap<NodeId, ()> = SecondaryMap::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                return false;
            };
            if id != root && node.links.iter().any(Option::is_none) {
                return false;
            }
            for &target in node.links.iter().flatten() {
                let Some(next) = self.nodes.get(target) else {
                    return false;
                };
                let fresh = if next.bp > node.bp {
                    stack.push(target);
                    seen.insert(target, ()).is_none()
                } else {
                    threads.insert(target, ()).is_none()
                };
                if !fresh {
                    return false;
                }
            }
            if self.search(&node.key) != Some(id) {
                return false;
            }
        }
        seen.len() == self.nodes.len() && threads.len() == self.nodes.len()
    }

    /// Renders the trie as a Graphviz digraph; threads are dashed
    #[cfg(feature = "dot")]
    pub fn dot(&self) -> String
    where
        V: std::fmt::Debug,
    {
        use slotmap::Key;

        let name = |id: NodeId| format!("p{}", id.data().as_ffi());
        let mut graph = crate::dot::DotGraph::new("patricia");
        for (id, node) in &self.nodes {
            let label = format!(
                "{} bp={} = {:?}",
                String::from_utf8_lossy(node.key.as_bytes()),
                node.bp,
                node.value
            );
            graph.node(name(id), label);
            for &target in node.links.iter().flatten() {
                if self.is_tree_edge(id, target) {
                    graph.edge(name(id), name(target));
                } else {
                    graph.edge_with(name(id), name(target), "style=dashed");
                }
            }
        }
        graph.to_string()
    }
}

impl<V> OrderedTrie<V> for PatriciaTrie<V> {
    fn traverse<'a, F>(&'a self, order: Order, mut visitor: F)
    where
        F: FnMut(&[u8], &'a V) -> bool,
    {
        let Some(root) = self.root else {
            return;
        };
        let mut visit = |node: &'a Node<V>| visitor(node.key.as_bytes(), &node.value);
        match order.steps() {
            Some(steps) => self.walk_tree(root, steps, &mut visit),
            None => self.walk_sorted(
                root,
                self.link(root, 0),
                order == Order::Descending,
                &mut visit,
            ),
        };
    }

    fn min(&self) -> Option<(Vec<u8>, &V)> {
        self.extreme(0)
    }

    fn max(&self) -> Option<(Vec<u8>, &V)> {
        self.extreme(1)
    }
}

impl<V: PartialEq> PartialEq for PatriciaTrie<V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .nodes
                .values()
                .all(|node| other.get(node.key.as_bytes()) == Some(&node.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORDS: [(&str, u32); 7] = [
        ("box", 2),
        ("dad", 3),
        ("baby", 5),
        ("dome", 7),
        ("band", 11),
        ("dance", 13),
        ("balloon", 17),
    ];

    fn words() -> PatriciaTrie<u32> {
        let mut trie = PatriciaTrie::new();
        for (k, v) in WORDS {
            assert_eq!(trie.put(k.as_bytes(), v), Ok(None));
            assert!(trie.verify_invariants());
        }
        trie
    }

    fn collect<F>(run: F) -> Vec<String>
    where
        F: FnOnce(&mut dyn FnMut(&[u8], &u32) -> bool),
    {
        let mut out = Vec::new();
        run(&mut |k, _| {
            out.push(String::from_utf8_lossy(k).into_owned());
            true
        });
        out
    }

    fn root_key(trie: &PatriciaTrie<u32>) -> Vec<u8> {
        let root = trie.root.unwrap();
        trie.nodes[root].key.as_bytes().to_vec()
    }

    #[test]
    fn test_single_key_self_loop() {
        let mut trie = PatriciaTrie::new();
        trie.put(b"k", 1).unwrap();
        let root = trie.root.unwrap();
        assert_eq!(trie.nodes[root].links, [Some(root), None]);
        assert_eq!(trie.nodes[root].bp, 0);
        assert!(trie.verify_invariants());
        assert_eq!(trie.min(), Some((b"k".to_vec(), &1)));
        assert_eq!(trie.max(), Some((b"k".to_vec(), &1)));
    }

    #[test]
    fn test_put_get() {
        let trie = words();
        assert_eq!(trie.len(), 7);
        for (k, v) in WORDS {
            assert_eq!(trie.get(k.as_bytes()), Some(&v));
            assert!(trie.contains_key(k.as_bytes()));
        }
        assert_eq!(trie.get(b"ba"), None);
        assert_eq!(trie.get(b"bands"), None);
        assert_eq!(trie.get(b""), None);
    }

    #[test]
    fn test_put_overwrites() {
        let mut trie = words();
        assert_eq!(trie.put(b"dance", 99), Ok(Some(13)));
        assert_eq!(trie.len(), 7);
        assert_eq!(trie.get(b"dance"), Some(&99));
        assert!(trie.verify_invariants());
    }

    #[test]
    fn test_rejected_keys_leave_trie_unchanged() {
        let mut trie = PatriciaTrie::new();
        assert_eq!(trie.put(b"", 0), Err(TrieError::EmptyKey));
        assert!(trie.is_empty());

        trie.put(b"a", 1).unwrap();
        assert_eq!(trie.put(b"a\0", 2), Err(TrieError::AmbiguousKey));
        assert_eq!(trie.len(), 1);
        assert_eq!(trie.get(b"a"), Some(&1));
        assert_eq!(trie.get(b"a\0"), None);

        let mut padded = PatriciaTrie::new();
        padded.put(b"a\0\0", 1).unwrap();
        assert_eq!(padded.put(b"a", 2), Err(TrieError::AmbiguousKey));
        assert!(padded.verify_invariants());
    }

    #[test]
    fn test_matches() {
        let trie = words();
        let mut found = Vec::new();
        trie.matches(b"d***e", |k, v| {
            found.push((k.to_vec(), *v));
            true
        });
        assert_eq!(found, vec![(b"dance".to_vec(), 13)]);

        assert_eq!(collect(|f| trie.matches(b"***", f)), vec!["box", "dad"]);
        assert_eq!(collect(|f| trie.matches(b"ba**", f)), vec!["baby", "band"]);
        assert!(collect(|f| trie.matches(b"", f)).is_empty());
    }

    #[test]
    fn test_ordered_queries() {
        let trie = words();
        assert_eq!(trie.select(3), Some((b"box".to_vec(), &2)));
        assert_eq!(trie.min(), Some((b"baby".to_vec(), &5)));
        assert_eq!(trie.max(), Some((b"dome".to_vec(), &7)));
        assert_eq!(trie.floor(b"bz"), Some((b"box".to_vec(), &2)));
        assert_eq!(trie.ceiling(b"c"), Some((b"dad".to_vec(), &3)));
        assert_eq!(trie.rank(b"dad"), 4);
        let mut seen = Vec::new();
        trie.range(b"band", b"dad", |k, _| {
            seen.push(k.to_vec());
            true
        });
        assert_eq!(seen, vec![b"band".to_vec(), b"box".to_vec(), b"dad".to_vec()]);
    }

    #[test]
    fn test_sorted_traversals() {
        let trie = words();
        let mut sorted: Vec<String> = WORDS.iter().map(|(k, _)| k.to_string()).collect();
        sorted.sort();
        assert_eq!(collect(|f| trie.traverse(Order::Ascending, f)), sorted);
        sorted.reverse();
        assert_eq!(collect(|f| trie.traverse(Order::Descending, f)), sorted);
    }

    #[test]
    fn test_recursive_orders_visit_each_key_once() {
        let trie = words();
        let mut expected: Vec<String> = WORDS.iter().map(|(k, _)| k.to_string()).collect();
        expected.sort();
        for order in Order::ALL {
            let mut seen = collect(|f| trie.traverse(order, f));
            seen.sort();
            assert_eq!(seen, expected, "{:?}", order);
        }
        // The root holds the first key and comes first in pre-order
        assert_eq!(collect(|f| trie.traverse(Order::Vlr, f))[0], "box");
    }

    #[test]
    fn test_with_prefix() {
        let trie = words();
        assert_eq!(collect(|f| trie.with_prefix(b"ba", f)), vec!["baby", "balloon", "band"]);
        assert_eq!(collect(|f| trie.with_prefix(b"d", f)), vec!["dad", "dance", "dome"]);
        assert_eq!(collect(|f| trie.with_prefix(b"box", f)), vec!["box"]);
        assert!(collect(|f| trie.with_prefix(b"boxes", f)).is_empty());
        assert!(collect(|f| trie.with_prefix(b"c", f)).is_empty());
        assert_eq!(collect(|f| trie.with_prefix(b"", f)).len(), 7);
    }

    #[test]
    fn test_longest_prefix_of() {
        let mut trie = words();
        assert_eq!(trie.longest_prefix_of(b"domestic"), Some((b"dome".to_vec(), &7)));
        assert_eq!(trie.longest_prefix_of(b"boxes"), Some((b"box".to_vec(), &2)));
        assert_eq!(trie.longest_prefix_of(b"do"), None);
        trie.put(b"dom", 1).unwrap();
        assert_eq!(trie.longest_prefix_of(b"domino"), Some((b"dom".to_vec(), &1)));
    }

    #[test]
    fn test_delete_each_key() {
        for (gone, value) in WORDS {
            let mut trie = words();
            assert_eq!(trie.delete(gone.as_bytes()), Some(value));
            assert!(trie.verify_invariants(), "after deleting {}", gone);
            assert_eq!(trie.len(), 6);
            assert_eq!(trie.get(gone.as_bytes()), None);
            for (k, v) in WORDS.iter().filter(|(k, _)| *k != gone) {
                assert_eq!(trie.get(k.as_bytes()), Some(v));
            }
        }
    }

    #[test]
    fn test_delete_root_promotes() {
        let mut trie = words();
        assert_eq!(root_key(&trie), b"box");
        assert_eq!(trie.delete(b"box"), Some(2));
        assert!(trie.verify_invariants());
        assert_ne!(root_key(&trie), b"box");
        assert_eq!(trie.select(3), Some((b"dad".to_vec(), &3)));
    }

    #[test]
    fn test_delete_to_empty() {
        let mut trie = words();
        assert_eq!(trie.delete(b"bo"), None);
        assert_eq!(trie.delete(b""), None);
        for (k, v) in WORDS.iter().rev() {
            assert_eq!(trie.delete(k.as_bytes()), Some(*v));
            assert!(trie.verify_invariants());
        }
        assert!(trie.is_empty());
        assert!(trie.root.is_none());
        assert_eq!(trie.min(), None);
        assert_eq!(trie.delete(b"box"), None);

        trie.put(b"again", 1).unwrap();
        assert!(trie.verify_invariants());
    }

    #[test]
    fn test_clear_and_equality() {
        let a = words();
        let mut b = PatriciaTrie::new();
        for (k, v) in WORDS.iter().rev() {
            b.put(k.as_bytes(), *v).unwrap();
        }
        assert_eq!(a, b);
        b.put(b"box", 3).unwrap();
        assert_ne!(a, b);
        b.clear();
        assert!(b.is_empty());
        assert!(b.verify_invariants());
        assert_ne!(a, b);
    }

    #[cfg(feature = "dot")]
    #[test]
    fn test_dot() {
        let trie = words();
        let dot = trie.dot();
        // One thread per key, one tree edge per non-root node
        assert_eq!(dot.matches("style=dashed").count(), 7);
        assert_eq!(dot.matches(" -> ").count(), 13);
        assert!(dot.contains("box bp=0 = 2"));
    }
}
