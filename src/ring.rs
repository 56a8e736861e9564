//! Circular doubly linked sibling rings
//!
//! Fibonacci heaps keep both the root list and every child list as a ring of
//! nodes linked through `prev`/`next` pointers:
//!
//! - A single node points to itself (both `next` and `prev`)
//! - An empty ring is represented by `None`
//! - Splicing two rings together is O(1)
//! - Walking a ring must stop when it returns to its starting node
//!
//! All functions are `unsafe` because they dereference raw node pointers. The
//! caller guarantees every pointer is live, uniquely owned by one container,
//! and that ring membership is consistent (a node is in at most one ring).

use smallvec::SmallVec;
use std::ptr::NonNull;

/// A node that can be threaded onto a ring.
pub(crate) trait Ringed: Sized {
    fn prev(&self) -> Option<NonNull<Self>>;
    fn next(&self) -> Option<NonNull<Self>>;
    fn set_prev(&mut self, prev: Option<NonNull<Self>>);
    fn set_next(&mut self, next: Option<NonNull<Self>>);
}

#[inline]
unsafe fn prev_of<N: Ringed>(n: NonNull<N>) -> NonNull<N> {
    (*n.as_ptr()).prev().unwrap_or(n)
}

#[inline]
unsafe fn next_of<N: Ringed>(n: NonNull<N>) -> NonNull<N> {
    (*n.as_ptr()).next().unwrap_or(n)
}

#[inline]
unsafe fn set_prev<N: Ringed>(n: NonNull<N>, prev: NonNull<N>) {
    (*n.as_ptr()).set_prev(Some(prev));
}

#[inline]
unsafe fn set_next<N: Ringed>(n: NonNull<N>, next: NonNull<N>) {
    (*n.as_ptr()).set_next(Some(next));
}

/// Splices `n` into the ring headed by `head`, immediately before `head`.
///
/// Returns the ring's head: `n` itself when the ring was empty, otherwise the
/// unchanged `head`.
///
/// # Safety
///
/// `n` must not be linked into any ring.
pub(crate) unsafe fn insert<N: Ringed>(head: Option<NonNull<N>>, n: NonNull<N>) -> NonNull<N> {
    match head {
        None => {
            set_prev(n, n);
            set_next(n, n);
            n
        }
        Some(head) => {
            let tail = prev_of(head);
            set_next(n, head);
            set_prev(n, tail);
            set_next(tail, n);
            set_prev(head, n);
            head
        }
    }
}

/// Removes `n` from the ring headed by `head`.
///
/// Returns the new head: `None` when `n` was the only node, the node after
/// `n` when `n` was the head, otherwise `head`. `n` is left unlinked.
///
/// # Safety
///
/// `n` must be a member of the ring headed by `head`.
pub(crate) unsafe fn cut<N: Ringed>(head: NonNull<N>, n: NonNull<N>) -> Option<NonNull<N>> {
    let next = next_of(n);
    let new_head = if next == n {
        None
    } else {
        let prev = prev_of(n);
        set_next(prev, next);
        set_prev(next, prev);
        Some(if head == n { next } else { head })
    };
    (*n.as_ptr()).set_prev(None);
    (*n.as_ptr()).set_next(None);
    new_head
}

/// Concatenates two rings into one, returning a head of the result.
///
/// # Safety
///
/// The two rings must be distinct.
pub(crate) unsafe fn meld<N: Ringed>(
    a: Option<NonNull<N>>,
    b: Option<NonNull<N>>,
) -> Option<NonNull<N>> {
    match (a, b) {
        (None, None) => None,
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (Some(a), Some(b)) => {
            //   ... <-> a_prev <-> b <-> ... <-> b_prev <-> a <-> ...
            let a_prev = prev_of(a);
            let b_prev = prev_of(b);
            set_next(a_prev, b);
            set_prev(b, a_prev);
            set_next(b_prev, a);
            set_prev(a, b_prev);
            Some(a)
        }
    }
}

/// Snapshot of the ring members starting at `head`, in `next` order.
///
/// # Safety
///
/// `head`, if present, must be a member of a well-formed ring.
pub(crate) unsafe fn members<N: Ringed>(head: Option<NonNull<N>>) -> SmallVec<[NonNull<N>; 16]> {
    let mut out = SmallVec::new();
    if let Some(head) = head {
        let mut current = head;
        loop {
            out.push(current);
            current = next_of(current);
            if current == head {
                break;
            }
        }
    }
    out
}

/// Checks `x.next.prev == x` and `x.prev.next == x` around the whole ring.
///
/// # Safety
///
/// Every pointer reachable from `head` must be live.
pub(crate) unsafe fn is_well_formed<N: Ringed>(head: NonNull<N>, limit: usize) -> bool {
    let mut current = head;
    for _ in 0..=limit {
        let (Some(next), Some(prev)) = ((*current.as_ptr()).next(), (*current.as_ptr()).prev())
        else {
            return false;
        };
        if (*next.as_ptr()).prev() != Some(current) || (*prev.as_ptr()).next() != Some(current) {
            return false;
        }
        current = next;
        if current == head {
            return true;
        }
    }
    // Walked more nodes than can exist without returning to the head
    false
}
