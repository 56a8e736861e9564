//! Advanced Heap and Trie Data Structures for Rust
//!
//! This crate provides priority queues that order `(key, value)` entries
//! through a pluggable [`Comparator`](compare::Comparator), together with two
//! prefix tries over byte-string keys.
//!
//! # Features
//!
//! - **Binary Heap**: array-backed; O(log n) push and pop
//! - **Binomial Heap**: forest of binomial trees; O(log n) push, pop and merge
//! - **Fibonacci Heap**: O(1) amortized push, merge and decrease-key; O(log n) amortized pop
//! - **Indexed variants** of all three: entries addressed by an index in
//!   `[0, capacity)` with `change_key` and `delete_index`
//! - **Binary Trie**: left-child right-sibling byte trie with ordered sibling chains
//! - **Patricia Trie**: threaded bit-level trie keyed on difference bits
//!
//! Every heap is a min-heap under its comparator; `new_max` constructors wrap
//! the natural order in [`Reversed`](compare::Reversed). With the default
//! `dot` feature, every container can render its internal shape as Graphviz
//! text.
//!
//! # Example
//!
//! ```rust
//! use rust_advanced_collections::fibonacci::FibonacciHeap;
//! use rust_advanced_collections::indexed_fibonacci::IndexedFibonacciHeap;
//! use rust_advanced_collections::{Heap, IndexedHeap};
//!
//! let mut heap = FibonacciHeap::new();
//! heap.push(5, "five");
//! heap.push(3, "three");
//! assert_eq!(heap.peek(), Some((&3, &"three")));
//!
//! let mut indexed = IndexedFibonacciHeap::new(4);
//! indexed.insert(0, 90, "a").unwrap();
//! indexed.insert(1, 80, "b").unwrap();
//! indexed.change_key(0, 10).unwrap();
//! assert_eq!(indexed.pop(), Some((0, 10, "a")));
//! ```

pub mod binary;
pub mod binary_trie;
pub mod binomial;
pub mod bitstring;
pub mod compare;
#[cfg(feature = "dot")]
pub mod dot;
pub mod fibonacci;
pub mod indexed_binary;
pub mod indexed_binomial;
pub mod indexed_fibonacci;
pub mod patricia;
pub(crate) mod ring;
pub mod traits;
pub mod traversal;

// Re-export the main traits for convenience
pub use binary_trie::TrieError;
pub use traits::{Heap, HeapError, IndexedHeap, MergeableHeap};
pub use traversal::{Order, OrderedTrie};
