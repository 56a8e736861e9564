//! Binary trie over byte-string keys
//!
//! A left-child right-sibling trie: a node's `left` link descends to the
//! next byte of the key, and its `right` link moves to the next alternative
//! byte at the same position. Every right chain is kept in strictly ascending
//! byte order, so a pre-order walk (node, left, right) yields keys in sorted
//! order.
//!
//! Nodes that end a key carry its value. Deleting a key prunes nodes that no
//! longer lead to any key.
//!
//! # Example
//!
//! ```rust
//! use rust_advanced_collections::binary_trie::BinaryTrie;
//! use rust_advanced_collections::traversal::OrderedTrie;
//!
//! let mut trie = BinaryTrie::new();
//! trie.put(b"band", 11).unwrap();
//! trie.put(b"baby", 5).unwrap();
//! trie.put(b"dome", 7).unwrap();
//!
//! assert_eq!(trie.get(b"band"), Some(&11));
//! assert_eq!(trie.min(), Some((b"baby".to_vec(), &5)));
//! assert_eq!(trie.longest_prefix_of(b"domestic"), Some((b"dome".to_vec(), &7)));
//! ```

use crate::bitstring::WILDCARD;
use crate::traversal::{Order, OrderedTrie, Step};
use smallvec::SmallVec;
use std::fmt;
use thiserror::Error;

/// Error type for rejected trie insertions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TrieError {
    /// Keys must contain at least one byte
    #[error("trie keys must not be empty")]
    EmptyKey,
    /// The key equals a stored key up to trailing zero bytes, so no bit
    /// distinguishes the two
    #[error("key differs from a stored key only by trailing zero bytes")]
    AmbiguousKey,
}

type Link<V> = Option<Box<Node<V>>>;

/// Key bytes collected along a walk
type Path = SmallVec<[u8; 32]>;

struct Node<V> {
    byte: u8,
    /// `Some` iff a key ends here
    value: Option<V>,
    /// Next byte of the key
    left: Link<V>,
    /// Next alternative at this position, with a larger byte
    right: Link<V>,
}

impl<V> Node<V> {
    fn new(byte: u8, right: Link<V>) -> Self {
        Self {
            byte,
            value: None,
            left: None,
            right,
        }
    }
}

/// Byte-level trie mapping non-empty byte strings to values
pub struct BinaryTrie<V> {
    root: Link<V>,
    len: usize,
}

impl<V> Default for BinaryTrie<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// First slot in the chain at `link` whose node does not sort before `byte`
fn seek<V>(mut link: &mut Link<V>, byte: u8) -> &mut Link<V> {
    while matches!(link.as_deref(), Some(n) if n.byte < byte) {
        if let Some(node) = link {
            link = &mut node.right;
        }
    }
    link
}

/// The node for `byte` in the chain at `link`
fn find<V>(mut link: &Link<V>, byte: u8) -> Option<&Node<V>> {
    while let Some(node) = link {
        if node.byte == byte {
            return Some(node);
        }
        if node.byte > byte {
            return None;
        }
        link = &node.right;
    }
    None
}

/// The node for `byte` in the chain at `link`, inserted in order if missing
fn entry<V>(link: &mut Link<V>, byte: u8) -> &mut Node<V> {
    let slot = seek(link, byte);
    if slot.as_deref().map_or(true, |n| n.byte != byte) {
        let right = slot.take();
        *slot = Some(Box::new(Node::new(byte, right)));
    }
    slot.get_or_insert_with(|| Box::new(Node::new(byte, None)))
}

/// Removes `key` below the chain at `link`, pruning nodes left without keys
fn remove<V>(link: &mut Link<V>, key: &[u8]) -> Option<V> {
    let (&first, rest) = key.split_first()?;
    let slot = seek(link, first);
    let removed = {
        let node = slot.as_deref_mut().filter(|n| n.byte == first)?;
        if rest.is_empty() {
            node.value.take()
        } else {
            remove(&mut node.left, rest)
        }
    }?;
    if slot
        .as_deref()
        .is_some_and(|n| n.value.is_none() && n.left.is_none())
    {
        let right = slot.as_mut().and_then(|n| n.right.take());
        *slot = right;
    }
    Some(removed)
}

impl<V> BinaryTrie<V> {
    /// Creates an empty trie
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Stores `value` under `key`, returning the value it replaced
    ///
    /// # Errors
    ///
    /// [`TrieError::EmptyKey`] when `key` is empty; the trie is unchanged.
    pub fn put(&mut self, key: &[u8], value: V) -> Result<Option<V>, TrieError> {
        let (&last, init) = key.split_last().ok_or(TrieError::EmptyKey)?;
        let mut link = &mut self.root;
        for &byte in init {
            link = &mut entry(link, byte).left;
        }
        let old = entry(link, last).value.replace(value);
        if old.is_none() {
            self.len += 1;
        }
        Ok(old)
    }

    fn node(&self, key: &[u8]) -> Option<&Node<V>> {
        let (&last, init) = key.split_last()?;
        let mut link = &self.root;
        for &byte in init {
            link = &find(link, byte)?.left;
        }
        find(link, last)
    }

    /// The value stored under `key`; `None` for absent and empty keys
    pub fn get(&self, key: &[u8]) -> Option<&V> {
        self.node(key)?.value.as_ref()
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }

    /// Removes `key`, returning its value
    pub fn delete(&mut self, key: &[u8]) -> Option<V> {
        let removed = remove(&mut self.root, key)?;
        self.len -= 1;
        Some(removed)
    }

    /// Removes every key
    pub fn clear(&mut self) {
        // Unlink iteratively so long keys cannot overflow the stack on drop
        let mut stack: Vec<Box<Node<V>>> = self.root.take().into_iter().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
        self.len = 0;
    }

    /// The longest stored key that is a prefix of `query`
    pub fn longest_prefix_of(&self, query: &[u8]) -> Option<(Vec<u8>, &V)> {
        let mut best = None;
        let mut link = &self.root;
        for (i, &byte) in query.iter().enumerate() {
            let Some(node) = find(link, byte) else {
                break;
            };
            if let Some(value) = &node.value {
                best = Some((i + 1, value));
            }
            link = &node.left;
        }
        best.map(|(n, value)| (query[..n].to_vec(), value))
    }

    /// Visits every key starting with `prefix`, in ascending order, until the
    /// visitor returns `false`
    ///
    /// An empty prefix visits every key.
    pub fn with_prefix<'a, F>(&'a self, prefix: &[u8], mut visitor: F)
    where
        F: FnMut(&[u8], &'a V) -> bool,
    {
        if prefix.is_empty() {
            self.traverse(Order::Ascending, visitor);
            return;
        }
        let Some(node) = self.node(prefix) else {
            return;
        };
        if let Some(value) = &node.value {
            if !visitor(prefix, value) {
                return;
            }
        }
        let base = Path::from_slice(prefix);
        walk(&node.left, base, ASCENDING, &mut visitor);
    }

    /// Visits, in ascending order, every key of the pattern's length whose
    /// bytes equal the pattern's literal bytes; `*` matches any byte
    pub fn matches<'a, F>(&'a self, pattern: &[u8], mut visitor: F)
    where
        F: FnMut(&[u8], &'a V) -> bool,
    {
        if pattern.is_empty() {
            return;
        }
        let mut path = Path::new();
        match_chain(&self.root, pattern, &mut path, &mut visitor);
    }

    /// Checks sibling order, the key count, and that every leaf ends a key
    pub fn verify_invariants(&self) -> bool {
        let mut terminals = 0;
        let mut stack: Vec<&Node<V>> = self.root.as_deref().into_iter().collect();
        while let Some(node) = stack.pop() {
            if node.value.is_some() {
                terminals += 1;
            } else if node.left.is_none() {
                return false;
            }
            if let Some(right) = node.right.as_deref() {
                if right.byte <= node.byte {
                    return false;
                }
                stack.push(right);
            }
            stack.extend(node.left.as_deref());
        }
        terminals == self.len
    }

    /// Renders the trie as a Graphviz digraph; sibling links are dashed
    #[cfg(feature = "dot")]
    pub fn dot(&self) -> String
    where
        V: std::fmt::Debug,
    {
        let mut graph = crate::dot::DotGraph::new("binary_trie");
        graph.node("root", "root");
        let mut next_id = 0usize;
        let mut stack: Vec<(&Node<V>, String, bool)> = Vec::new();
        if let Some(first) = self.root.as_deref() {
            stack.push((first, "root".to_string(), false));
        }
        while let Some((node, from, sibling)) = stack.pop() {
            let id = format!("t{}", next_id);
            next_id += 1;
            let label = match &node.value {
                Some(v) => format!("{} = {:?}", char::from(node.byte).escape_default(), v),
                None => char::from(node.byte).escape_default().to_string(),
            };
            graph.node(&id, label);
            if sibling {
                graph.edge_with(&from, &id, "style=dashed");
            } else {
                graph.edge(&from, &id);
            }
            if let Some(right) = node.right.as_deref() {
                stack.push((right, id.clone(), true));
            }
            if let Some(left) = node.left.as_deref() {
                stack.push((left, id, false));
            }
        }
        graph.to_string()
    }
}

impl<V> Drop for BinaryTrie<V> {
    fn drop(&mut self) {
        self.clear();
    }
}

const ASCENDING: [Step; 3] = [Step::Visit, Step::Left, Step::Right];
const DESCENDING: [Step; 3] = [Step::Right, Step::Left, Step::Visit];

/// Walks the chain at `start` in the given step order; `path` holds the key
/// bytes above the chain. Returns `false` once the visitor stops the walk.
fn walk<'a, V, F>(start: &'a Link<V>, mut path: Path, steps: [Step; 3], visitor: &mut F) -> bool
where
    F: FnMut(&[u8], &'a V) -> bool,
{
    let depth0 = path.len();
    let mut stack: Vec<(&'a Node<V>, usize, usize)> = Vec::new();
    if let Some(node) = start.as_deref() {
        stack.push((node, depth0, 0));
    }
    while let Some((node, depth, i)) = stack.pop() {
        if i == steps.len() {
            continue;
        }
        stack.push((node, depth, i + 1));
        path.truncate(depth);
        path.push(node.byte);
        match steps[i] {
            Step::Visit => {
                if let Some(value) = &node.value {
                    if !visitor(path.as_slice(), value) {
                        return false;
                    }
                }
            }
            Step::Left => {
                if let Some(child) = node.left.as_deref() {
                    stack.push((child, depth + 1, 0));
                }
            }
            Step::Right => {
                if let Some(sibling) = node.right.as_deref() {
                    stack.push((sibling, depth, 0));
                }
            }
        }
    }
    true
}

fn match_chain<'a, V, F>(link: &'a Link<V>, pattern: &[u8], path: &mut Path, visitor: &mut F) -> bool
where
    F: FnMut(&[u8], &'a V) -> bool,
{
    let Some((&want, rest)) = pattern.split_first() else {
        return true;
    };
    let mut current = link.as_deref();
    while let Some(node) = current {
        if want != WILDCARD && node.byte > want {
            break;
        }
        if want == WILDCARD || node.byte == want {
            path.push(node.byte);
            let keep_going = if rest.is_empty() {
                match &node.value {
                    Some(value) => visitor(path.as_slice(), value),
                    None => true,
                }
            } else {
                match_chain(&node.left, rest, path, visitor)
            };
            path.pop();
            if !keep_going {
                return false;
            }
        }
        current = node.right.as_deref();
    }
    true
}

impl<V> OrderedTrie<V> for BinaryTrie<V> {
    fn traverse<'a, F>(&'a self, order: Order, mut visitor: F)
    where
        F: FnMut(&[u8], &'a V) -> bool,
    {
        let steps = match (order, order.steps()) {
            (_, Some(steps)) => steps,
            (Order::Descending, None) => DESCENDING,
            (_, None) => ASCENDING,
        };
        walk(&self.root, Path::new(), steps, &mut visitor);
    }
}

// Node chains are as deep as the longest key, so copying and printing
// rebuild from the iterative walk instead of recursing per byte.
impl<V: Clone> Clone for BinaryTrie<V> {
    fn clone(&self) -> Self {
        let mut copy = Self::new();
        self.traverse(Order::Ascending, |key, value| {
            copy.put(key, value.clone()).is_ok()
        });
        copy
    }
}

impl<V: fmt::Debug> fmt::Debug for BinaryTrie<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        self.traverse(Order::Ascending, |key, value| {
            map.entry(&String::from_utf8_lossy(key), value);
            true
        });
        map.finish()
    }
}

impl<V: PartialEq> PartialEq for BinaryTrie<V> {
    fn eq(&self, other: &Self) -> bool {
        if self.len != other.len {
            return false;
        }
        let mut same = true;
        self.traverse(Order::Ascending, |k, v| {
            same = other.get(k) == Some(v);
            same
        });
        same
    }
}
