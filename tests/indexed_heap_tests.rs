//! Generic tests for the indexed heaps
//!
//! Every helper receives a constructor so the same checks run against the
//! binary, binomial and Fibonacci variants in both orientations.

use rust_advanced_collections::indexed_binary::IndexedBinaryHeap;
use rust_advanced_collections::indexed_binomial::IndexedBinomialHeap;
use rust_advanced_collections::indexed_fibonacci::IndexedFibonacciHeap;
use rust_advanced_collections::{HeapError, IndexedHeap};

fn drain<H: IndexedHeap<i32, ()>>(heap: &mut H) -> Vec<(usize, i32)> {
    std::iter::from_fn(|| heap.pop().map(|(i, k, _)| (i, k))).collect()
}

/// Decrease-key moves entries ahead of everything they now precede
fn test_decrease_key_order<H: IndexedHeap<i32, ()>>(make: fn(usize) -> H) {
    let mut heap = make(9);
    let keys = [90, 80, 70, 40, 50, 60, 30, 100, 200];
    for (i, &k) in keys.iter().enumerate() {
        heap.insert(i, k, ()).unwrap();
    }
    heap.change_key(7, 10).unwrap();
    heap.change_key(8, 20).unwrap();

    let drained = drain(&mut heap);
    let indices: Vec<usize> = drained.iter().map(|&(i, _)| i).collect();
    let keys: Vec<i32> = drained.iter().map(|&(_, k)| k).collect();
    assert_eq!(indices, vec![7, 8, 6, 3, 4, 5, 2, 1, 0]);
    assert_eq!(keys, vec![10, 20, 30, 40, 50, 60, 70, 80, 90]);
}

/// Increase-key moves entries behind everything they now follow
fn test_increase_key_order<H: IndexedHeap<i32, ()>>(make: fn(usize) -> H) {
    let mut heap = make(6);
    for i in 0..6 {
        heap.insert(i, i as i32, ()).unwrap();
    }
    heap.change_key(0, 100).unwrap();
    heap.change_key(2, 50).unwrap();
    assert_eq!(heap.peek().map(|(i, k, _)| (i, *k)), Some((1, 1)));
    assert_eq!(
        drain(&mut heap),
        vec![(1, 1), (3, 3), (4, 4), (5, 5), (2, 50), (0, 100)]
    );
}

/// Indexed max-heap: change keys, then delete around the survivor
fn test_max_heap_deletes<H: IndexedHeap<i32, ()>>(make: fn(usize) -> H) {
    let mut heap = make(3);
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
    assert!(!heap.contains_index(0));
    assert!(!heap.contains_index(2));
    assert_eq!(heap.pop(), Some((1, 30, ())));
}

/// Errors leave the heap untouched
fn test_errors<H: IndexedHeap<i32, ()>>(make: fn(usize) -> H) {
    let mut heap = make(2);
    assert_eq!(heap.capacity(), 2);
    assert_eq!(
        heap.insert(2, 1, ()),
        Err(HeapError::IndexOutOfRange {
            index: 2,
            capacity: 2
        })
    );
    heap.insert(0, 5, ()).unwrap();
    assert_eq!(heap.insert(0, 1, ()), Err(HeapError::DuplicateIndex(0)));
    assert_eq!(heap.change_key(1, 1), Err(HeapError::AbsentIndex(1)));
    assert_eq!(
        heap.change_key(9, 1),
        Err(HeapError::IndexOutOfRange {
            index: 9,
            capacity: 2
        })
    );
    assert_eq!(heap.delete_index(1), None);
    assert_eq!(heap.delete_index(9), None);
    assert_eq!(heap.peek_index(9), None);
    assert!(!heap.contains_index(9));
    assert_eq!(heap.len(), 1);
    assert_eq!(heap.peek_index(0), Some((&5, &())));
}

/// Deleted and popped indices can be reused
fn test_index_reuse<H: IndexedHeap<i32, ()>>(make: fn(usize) -> H) {
    let mut heap = make(4);
    for i in 0..4 {
        heap.insert(i, 10 * i as i32, ()).unwrap();
    }
    assert_eq!(heap.pop(), Some((0, 0, ())));
    assert_eq!(heap.delete_index(2), Some((20, ())));
    heap.insert(0, 25, ()).unwrap();
    heap.insert(2, 5, ()).unwrap();
    assert_eq!(drain(&mut heap), vec![(2, 5), (1, 10), (0, 25), (3, 30)]);
    assert!(heap.is_empty());
}

/// Random key churn agrees with a sorted model
fn test_random_churn<H: IndexedHeap<i32, ()>>(make: fn(usize) -> H) {
    const CAP: usize = 64;
    let mut heap = make(CAP);
    let mut model: Vec<Option<i32>> = vec![None; CAP];
    let mut state = 12345u64;
    let mut next = || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (state >> 33) as usize
    };
    for _ in 0..2000 {
        let index = next() % CAP;
        let key = (next() % 1000) as i32;
        match (next() % 4, model[index]) {
            (0 | 1, None) => {
                heap.insert(index, key, ()).unwrap();
                model[index] = Some(key);
            }
            (0 | 1, Some(_)) => {
                heap.change_key(index, key).unwrap();
                model[index] = Some(key);
            }
            (2, current) => {
                assert_eq!(heap.delete_index(index).map(|(k, _)| k), current);
                model[index] = None;
            }
            _ => {
                let expected = model.iter().flatten().min().copied();
                let popped = heap.pop();
                assert_eq!(popped.as_ref().map(|(_, k, _)| *k), expected);
                if let Some((i, _, _)) = popped {
                    model[i] = None;
                }
            }
        }
        assert_eq!(heap.len(), model.iter().flatten().count());
    }
}

/// for_each reports each live index with its key
fn test_for_each_indices<H: IndexedHeap<i32, ()>>(make: fn(usize) -> H) {
    let mut heap = make(8);
    for i in [7, 1, 4] {
        heap.insert(i, i as i32 * 3, ()).unwrap();
    }
    let mut seen = Vec::new();
    heap.for_each(|i, k, _| {
        seen.push((i, *k));
        true
    });
    seen.sort();
    assert_eq!(seen, vec![(1, 3), (4, 12), (7, 21)]);

    let mut keys: Vec<&i32> = Vec::new();
    heap.for_each(|_, k, _| {
        keys.push(k);
        true
    });
    keys.sort();
    assert_eq!(keys, vec![&3, &12, &21]);

    heap.clear();
    assert!(heap.is_empty());
    heap.insert(7, 0, ()).unwrap();
    assert_eq!(heap.peek_index(7), Some((&0, &())));
}

macro_rules! indexed_heap_tests {
    ($module:ident, $heap:ident) => {
        mod $module {
            use super::*;

            #[test]
            fn test_decrease_key() {
                test_decrease_key_order($heap::new);
            }

            #[test]
            fn test_increase_key() {
                test_increase_key_order($heap::new);
            }

            #[test]
            fn test_max_heap() {
                test_max_heap_deletes($heap::new_max);
            }

            #[test]
            fn test_index_errors() {
                test_errors($heap::new);
            }

            #[test]
            fn test_reuse() {
                test_index_reuse($heap::new);
            }

            #[test]
            fn test_churn() {
                test_random_churn($heap::new);
            }

            #[test]
            fn test_visitor() {
                test_for_each_indices($heap::new);
            }
        }
    };
}

indexed_heap_tests!(binary, IndexedBinaryHeap);
indexed_heap_tests!(binomial, IndexedBinomialHeap);
indexed_heap_tests!(fibonacci, IndexedFibonacciHeap);

#[test]
fn test_invariants_hold_through_key_changes() {
    let mut binary = IndexedBinaryHeap::new(32);
    let mut binomial = IndexedBinomialHeap::new(32);
    let mut fibonacci = IndexedFibonacciHeap::new(32);
    for i in 0..32 {
        let key = ((i * 17) % 32) as i32;
        binary.insert(i, key, i).unwrap();
        binomial.insert(i, key, i).unwrap();
        fibonacci.insert(i, key, i).unwrap();
    }
    fibonacci.pop();
    binomial.pop();
    binary.pop();
    for i in (1..32).step_by(3) {
        let key = ((i * 7) % 40) as i32 - 5;
        binary.change_key(i, key).unwrap();
        binomial.change_key(i, key).unwrap();
        fibonacci.change_key(i, key).unwrap();
        assert!(binary.verify_invariants());
        assert!(binomial.verify_invariants());
        assert!(fibonacci.verify_invariants());
    }
    let peek = binary.peek().map(|(_, k, _)| *k);
    assert_eq!(binomial.peek().map(|(_, k, _)| *k), peek);
    assert_eq!(fibonacci.peek().map(|(_, k, _)| *k), peek);
}
