//! Shared behaviour tests for the binary and Patricia tries
//!
//! Both tries expose the same inherent operations, so one macro generates the
//! suite for each of them.

use rust_advanced_collections::binary_trie::BinaryTrie;
use rust_advanced_collections::patricia::PatriciaTrie;
use rust_advanced_collections::{Order, OrderedTrie, TrieError};

const WORDS: [(&str, u32); 7] = [
    ("box", 2),
    ("dad", 3),
    ("baby", 5),
    ("dome", 7),
    ("band", 11),
    ("dance", 13),
    ("balloon", 17),
];

fn keys_of(pairs: &[(Vec<u8>, u32)]) -> Vec<&str> {
    pairs
        .iter()
        .map(|(k, _)| std::str::from_utf8(k).unwrap())
        .collect()
}

macro_rules! trie_tests {
    ($module:ident, $trie:ident) => {
        mod $module {
            use super::*;

            fn words() -> $trie<u32> {
                let mut trie = $trie::new();
                for (k, v) in WORDS {
                    trie.put(k.as_bytes(), v).unwrap();
                }
                assert!(trie.verify_invariants());
                trie
            }

            fn gather<F>(run: F) -> Vec<(Vec<u8>, u32)>
            where
                F: FnOnce(&mut dyn FnMut(&[u8], &u32) -> bool),
            {
                let mut out = Vec::new();
                run(&mut |k, v| {
                    out.push((k.to_vec(), *v));
                    true
                });
                out
            }

            #[test]
            fn test_word_set_queries() {
                let trie = words();
                assert_eq!(trie.min(), Some((b"baby".to_vec(), &5)));
                assert_eq!(trie.max(), Some((b"dome".to_vec(), &7)));
                let prefixed = gather(|f| trie.with_prefix(b"ba", f));
                assert_eq!(keys_of(&prefixed), vec!["baby", "balloon", "band"]);
                assert_eq!(
                    trie.longest_prefix_of(b"domestic"),
                    Some((b"dome".to_vec(), &7))
                );
            }

            #[test]
            fn test_word_set_match_and_select() {
                let trie = words();
                let found = gather(|f| trie.matches(b"d***e", f));
                assert_eq!(found, vec![(b"dance".to_vec(), 13)]);
                assert_eq!(trie.select(3), Some((b"box".to_vec(), &2)));
            }

            #[test]
            fn test_shared_prefix_keys() {
                let mut trie = $trie::new();
                for (i, k) in ["ban", "band", "bandana", "b"].iter().enumerate() {
                    trie.put(k.as_bytes(), i as u32).unwrap();
                }
                assert!(trie.verify_invariants());
                assert_eq!(trie.get(b"b"), Some(&3));
                assert_eq!(trie.get(b"ba"), None);
                assert_eq!(trie.get(b"bandanas"), None);
                let all = gather(|f| trie.traverse(Order::Ascending, f));
                assert_eq!(keys_of(&all), vec!["b", "ban", "band", "bandana"]);
                assert_eq!(
                    trie.longest_prefix_of(b"bandit"),
                    Some((b"band".to_vec(), &1))
                );
                assert_eq!(trie.delete(b"band"), Some(1));
                assert!(trie.verify_invariants());
                assert_eq!(
                    trie.longest_prefix_of(b"bandit"),
                    Some((b"ban".to_vec(), &0))
                );
            }

            #[test]
            fn test_single_byte_keys() {
                let mut trie = $trie::new();
                for b in (b'a'..=b'z').rev() {
                    trie.put(&[b], u32::from(b)).unwrap();
                }
                assert_eq!(trie.len(), 26);
                assert_eq!(trie.min(), Some((b"a".to_vec(), &97)));
                assert_eq!(trie.max(), Some((b"z".to_vec(), &122)));
                assert_eq!(trie.rank(b"m"), 12);
                assert_eq!(trie.floor(b"mm"), Some((b"m".to_vec(), &109)));
                assert_eq!(trie.ceiling(b"mm"), Some((b"n".to_vec(), &110)));
                for b in b'a'..=b'z' {
                    assert_eq!(trie.delete(&[b]), Some(u32::from(b)));
                }
                assert!(trie.is_empty());
            }

            #[test]
            fn test_put_is_idempotent_in_size() {
                let mut trie = words();
                assert_eq!(trie.put(b"band", 1), Ok(Some(11)));
                assert_eq!(trie.put(b"band", 2), Ok(Some(1)));
                assert_eq!(trie.len(), 7);
                assert_eq!(trie.get(b"band"), Some(&2));
            }

            #[test]
            fn test_empty_key() {
                let mut trie = words();
                assert_eq!(trie.put(b"", 0), Err(TrieError::EmptyKey));
                assert_eq!(trie.get(b""), None);
                assert!(!trie.contains_key(b""));
                assert_eq!(trie.delete(b""), None);
                assert_eq!(trie.len(), 7);
            }

            #[test]
            fn test_range_is_inclusive() {
                let trie = words();
                let inside = gather(|f| trie.range(b"balloon", b"box", f));
                assert_eq!(keys_of(&inside), vec!["balloon", "band", "box"]);
                assert!(gather(|f| trie.range(b"e", b"z", f)).is_empty());
            }

            #[test]
            fn test_every_order_visits_every_key() {
                let trie = words();
                for order in Order::ALL {
                    let mut seen = keys_of(&gather(|f| trie.traverse(order, f)))
                        .into_iter()
                        .map(str::to_string)
                        .collect::<Vec<_>>();
                    seen.sort();
                    assert_eq!(seen.len(), 7, "{:?}", order);
                    seen.dedup();
                    assert_eq!(seen.len(), 7, "{:?}", order);
                }
            }

            #[test]
            fn test_insert_delete_permutations() {
                let orders: [[usize; 7]; 3] = [
                    [0, 1, 2, 3, 4, 5, 6],
                    [6, 5, 4, 3, 2, 1, 0],
                    [3, 0, 6, 2, 5, 1, 4],
                ];
                for insert in &orders {
                    for delete in &orders {
                        let mut trie = $trie::new();
                        for &i in insert {
                            let (k, v) = WORDS[i];
                            trie.put(k.as_bytes(), v).unwrap();
                        }
                        for &i in delete {
                            let (k, v) = WORDS[i];
                            assert_eq!(trie.delete(k.as_bytes()), Some(v));
                            assert!(trie.verify_invariants());
                        }
                        assert!(trie.is_empty());
                        for (k, _) in WORDS {
                            assert_eq!(trie.get(k.as_bytes()), None);
                        }
                    }
                }
            }

            #[test]
            fn test_equality_ignores_insertion_order() {
                let a = words();
                let mut b = $trie::new();
                for (k, v) in WORDS.iter().rev() {
                    b.put(k.as_bytes(), *v).unwrap();
                }
                assert_eq!(a, b);
                b.delete(b"dad");
                assert_ne!(a, b);
                b.put(b"dad", 4).unwrap();
                assert_ne!(a, b);
                b.put(b"dad", 3).unwrap();
                assert_eq!(a, b);
            }

            #[test]
            fn test_clear() {
                let mut trie = words();
                trie.clear();
                assert!(trie.is_empty());
                assert_eq!(trie.min(), None);
                assert!(trie.verify_invariants());
                trie.put(b"fresh", 1).unwrap();
                assert_eq!(trie.len(), 1);
            }
        }
    };
}

trie_tests!(binary, BinaryTrie);
trie_tests!(patricia, PatriciaTrie);

#[test]
fn test_tries_agree_on_ordered_queries() {
    let mut binary = BinaryTrie::new();
    let mut patricia = PatriciaTrie::new();
    let mut state = 99u64;
    for i in 0..300u32 {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        let len = 1 + (state >> 60) as usize;
        let key: Vec<u8> = (0..len)
            .map(|j| b'a' + (state.rotate_right(4 * j as u32) % 4) as u8)
            .collect();
        binary.put(&key, i).unwrap();
        patricia.put(&key, i).unwrap();
    }
    assert_eq!(binary.len(), patricia.len());
    assert!(patricia.verify_invariants());

    let collect = |trie: &dyn Fn(&mut dyn FnMut(&[u8], &u32) -> bool)| {
        let mut out = Vec::new();
        trie(&mut |k, v| {
            out.push((k.to_vec(), *v));
            true
        });
        out
    };
    let from_binary = collect(&|f| binary.traverse(Order::Ascending, f));
    let from_patricia = collect(&|f| patricia.traverse(Order::Ascending, f));
    assert_eq!(from_binary, from_patricia);

    let probes: [&[u8]; 5] = [b"a", b"abc", b"cc", b"dddd", b"b"];
    for probe in probes {
        assert_eq!(binary.floor(probe), patricia.floor(probe));
        assert_eq!(binary.ceiling(probe), patricia.ceiling(probe));
        assert_eq!(binary.rank(probe), patricia.rank(probe));
        assert_eq!(binary.longest_prefix_of(probe), patricia.longest_prefix_of(probe));
    }
}

#[test]
fn test_patricia_rejects_zero_padded_twin() {
    let mut trie = PatriciaTrie::new();
    trie.put(b"ab", 1).unwrap();
    assert_eq!(trie.put(b"ab\0", 2), Err(TrieError::AmbiguousKey));
    assert_eq!(
        TrieError::AmbiguousKey.to_string(),
        "key differs from a stored key only by trailing zero bytes"
    );
    assert_eq!(trie.len(), 1);
}
