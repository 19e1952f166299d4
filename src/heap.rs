//! `IndexedHeap` — a fixed-capacity binary max-heap with in-place updates.
//!
//! The heap stores elements in a [`FixedVec`] of slots laid out as a complete
//! binary tree: slot `i` has parent `(i - 1) / 2` and children `2i + 1`,
//! `2i + 2`. The max element occupies slot 0. Under the [`Keyed`] policy a
//! generational key table mirrors every slot move, so any element can be
//! re-prioritized through its [`HeapKey`] in O(log n) without the caller
//! knowing where it currently sits.
//!
//! Two loading patterns are supported:
//! - incremental: [`push`](IndexedHeap::push) sifts each element into place;
//! - bulk: [`fast_push`](IndexedHeap::fast_push) appends without ordering,
//!   followed by one O(n) [`reheapify`](IndexedHeap::reheapify).
//!
//! Between a `fast_push` and the matching `reheapify` the heap is in a
//! pending state; ordering-dependent operations fail with
//! [`HeapError::PendingReheapify`] instead of acting on unordered slots.

use core::fmt;
use core::mem;

use crate::error::{HeapError, PushError};
use crate::fixed_vec::FixedVec;
use crate::tracking::{HeapKey, Keyed, Tracking};

/// One heap slot: the element plus its identity tag.
#[derive(Debug, Clone)]
struct Slot<T, G> {
    value: T,
    tag: G,
}

/// A fixed-capacity binary max-heap with O(1) reverse lookup.
///
/// `X` selects the identity-tracking policy: [`Keyed`] (the default) hands
/// out a [`HeapKey`] per push and supports by-key updates;
/// [`Positional`](crate::Positional) keeps no index and supports
/// slot-addressed maintenance only.
///
/// # Examples
///
/// ```
/// use apex::IndexedHeap;
///
/// let mut heap: IndexedHeap<i32> = IndexedHeap::with_capacity(8);
/// let key = heap.push(3).unwrap();
/// heap.push(9).unwrap();
/// assert_eq!(heap.peek(), Some(&9));
///
/// // Raise the priority of the element behind `key`.
/// heap.set(key, 42).unwrap();
/// assert_eq!(heap.pop().unwrap(), 42);
/// assert_eq!(heap.pop().unwrap(), 9);
/// ```
///
/// Bulk loading:
///
/// ```
/// use apex::IndexedHeap;
///
/// let mut heap: IndexedHeap<u32> = IndexedHeap::with_capacity(100);
/// for x in 0..100 {
///     heap.fast_push(x).unwrap();
/// }
/// heap.reheapify();
/// assert_eq!(heap.pop().unwrap(), 99);
/// ```
pub struct IndexedHeap<T, X: Tracking = Keyed> {
    slots: FixedVec<Slot<T, X::Tag>>,
    table: X::Table,
    pending: bool,
}

impl<T, X: Tracking> IndexedHeap<T, X> {
    /// Creates an empty heap able to hold exactly `capacity` elements.
    ///
    /// Both the slot array and the key table are allocated here, once;
    /// no further allocation happens for the life of the heap.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or does not fit in 32-bit slot indices.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be non-zero");
        assert!(
            capacity < u32::MAX as usize,
            "capacity must fit in 32-bit slot indices"
        );
        Self {
            slots: FixedVec::with_capacity(capacity),
            table: X::table_with_capacity(capacity),
            pending: false,
        }
    }

    /// Returns the number of elements currently in the heap.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if the heap holds no elements.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns the capacity fixed at construction.
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Returns `true` if a `fast_push` batch still needs
    /// [`reheapify`](Self::reheapify).
    pub fn needs_reheapify(&self) -> bool {
        self.pending
    }

    /// Returns a reference to the element at the root slot.
    ///
    /// This is the max element, unless a reheapify is pending, in which case
    /// it is whatever happens to occupy slot 0.
    pub fn peek(&self) -> Option<&T> {
        self.slots.get(0).map(|slot| &slot.value)
    }

    /// Iterates over all elements in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().map(|slot| &slot.value)
    }

    /// Empties the heap without deallocating.
    ///
    /// Capacity is retained so the heap can be reloaded cheaply; all
    /// previously issued keys become stale.
    pub fn clear(&mut self) {
        #[cfg(feature = "tracing")]
        tracing::trace!(len = self.slots.len(), "clearing heap");
        self.slots.clear();
        X::clear(&mut self.table);
        self.pending = false;
    }
}

impl<T: Ord, X: Tracking> IndexedHeap<T, X> {
    /// Inserts `value` and sifts it into heap position.
    ///
    /// Returns the new element's ticket (a [`HeapKey`] under [`Keyed`],
    /// `()` under [`Positional`](crate::Positional)).
    ///
    /// # Errors
    ///
    /// [`PushError::CapacityExceeded`] if the heap is full, and
    /// [`PushError::PendingReheapify`] while a bulk load is unfinalized;
    /// either way the element is handed back inside the error.
    pub fn push(&mut self, value: T) -> Result<X::Ticket, PushError<T>> {
        if self.pending {
            return Err(PushError::PendingReheapify(value));
        }
        let ticket = self.append(value)?;
        self.sift_up(self.slots.len() - 1);
        Ok(ticket)
    }

    /// Inserts `value` without restoring heap order.
    ///
    /// Intended for bulk loading: `fast_push` everything, then call
    /// [`reheapify`](Self::reheapify) once. Until then the heap is in the
    /// pending state and ordering-dependent operations are refused.
    ///
    /// # Errors
    ///
    /// [`PushError::CapacityExceeded`] if the heap is full.
    pub fn fast_push(&mut self, value: T) -> Result<X::Ticket, PushError<T>> {
        let ticket = self.append(value)?;
        self.pending = true;
        Ok(ticket)
    }

    /// Removes and returns the max element.
    ///
    /// # Errors
    ///
    /// [`HeapError::Empty`] on an empty heap,
    /// [`HeapError::PendingReheapify`] while a bulk load is unfinalized.
    pub fn pop(&mut self) -> Result<T, HeapError> {
        if self.pending {
            return Err(HeapError::PendingReheapify);
        }
        if self.slots.is_empty() {
            return Err(HeapError::Empty);
        }
        let last = self.slots.len() - 1;
        self.swap_slots(0, last);
        let Some(popped) = self.slots.pop() else {
            return Err(HeapError::Empty);
        };
        X::release(&mut self.table, popped.tag);
        if !self.slots.is_empty() {
            self.sift_down(0);
        }
        Ok(popped.value)
    }

    /// Restores heap order after a `fast_push` batch, in O(n).
    ///
    /// Works level by level from the deepest internal level up to the root,
    /// sifting down every node on each level, so each subtree is already
    /// ordered when its parent is processed. Safe to call on a heap that is
    /// not pending; it then simply re-establishes an order that already
    /// holds.
    pub fn reheapify(&mut self) {
        let len = self.slots.len();
        if len > 0 {
            let levels = len.ilog2();
            for depth in (0..levels).rev() {
                let first = (1usize << depth) - 1;
                let last = ((1usize << (depth + 1)) - 2).min(len - 1);
                for slot in first..=last {
                    self.sift_down(slot);
                }
            }
        }
        self.pending = false;
        #[cfg(feature = "tracing")]
        tracing::trace!(len, "reheapified");
    }

    /// Re-establishes heap order around slot `slot` after its element's
    /// ordering key changed.
    ///
    /// Only one direction can be violated by a single-element change, so
    /// exactly one sift runs: down when the parent still dominates (or `slot`
    /// is the root), up otherwise.
    ///
    /// # Errors
    ///
    /// [`HeapError::OutOfRange`] unless `slot < len()`,
    /// [`HeapError::PendingReheapify`] while a bulk load is unfinalized.
    pub fn update_at(&mut self, slot: usize) -> Result<(), HeapError> {
        if self.pending {
            return Err(HeapError::PendingReheapify);
        }
        if slot >= self.slots.len() {
            return Err(HeapError::OutOfRange);
        }
        self.reorder(slot);
        Ok(())
    }

    /// Replaces the element at slot `slot`, reorders, and returns the old
    /// element.
    ///
    /// # Errors
    ///
    /// Same as [`update_at`](Self::update_at).
    pub fn set_at(&mut self, slot: usize, value: T) -> Result<T, HeapError> {
        if self.pending {
            return Err(HeapError::PendingReheapify);
        }
        if slot >= self.slots.len() {
            return Err(HeapError::OutOfRange);
        }
        let old = mem::replace(&mut self.slots.as_mut_slice()[slot].value, value);
        self.reorder(slot);
        Ok(old)
    }

    /// Appends at the tail slot and registers the identity mapping.
    fn append(&mut self, value: T) -> Result<X::Ticket, PushError<T>> {
        if self.slots.is_full() {
            return Err(PushError::CapacityExceeded(value));
        }
        let (tag, ticket) = X::claim(&mut self.table, self.slots.len());
        match self.slots.try_push(Slot { value, tag }) {
            Ok(()) => Ok(ticket),
            Err(rejected) => {
                X::release(&mut self.table, rejected.tag);
                Err(PushError::CapacityExceeded(rejected.value))
            }
        }
    }

    /// Sifts in whichever direction the element at `slot` violates order.
    fn reorder(&mut self, slot: usize) {
        let rootward_ok = slot == 0 || {
            let slots = self.slots.as_slice();
            slots[(slot - 1) / 2].value >= slots[slot].value
        };
        if rootward_ok {
            self.sift_down(slot);
        } else {
            self.sift_up(slot);
        }
    }

    /// Compares the elements at two slots.
    fn less(&self, a: usize, b: usize) -> bool {
        let slots = self.slots.as_slice();
        slots[a].value < slots[b].value
    }

    /// Exchanges two slots and re-points both identity entries.
    fn swap_slots(&mut self, a: usize, b: usize) {
        self.slots.swap(a, b);
        let tag_a = self.slots.as_slice()[a].tag;
        let tag_b = self.slots.as_slice()[b].tag;
        X::relocate(&mut self.table, tag_a, a);
        X::relocate(&mut self.table, tag_b, b);
    }

    fn sift_up(&mut self, mut slot: usize) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if self.less(parent, slot) {
                self.swap_slots(parent, slot);
                slot = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut slot: usize) {
        let len = self.slots.len();
        loop {
            let left = 2 * slot + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            // The left child wins ties; the right only when strictly greater.
            let mut chosen = left;
            if right < len && self.less(left, right) {
                chosen = right;
            }
            if self.less(slot, chosen) {
                self.swap_slots(slot, chosen);
                slot = chosen;
            } else {
                break;
            }
        }
    }
}

impl<T: Ord> IndexedHeap<T, Keyed> {
    /// Returns a reference to the element behind `key`, or `None` if the key
    /// is stale.
    pub fn get(&self, key: HeapKey) -> Option<&T> {
        let slot = self.table.slot_of(key)?;
        self.slots.get(slot).map(|s| &s.value)
    }

    /// Returns `true` if `key` still refers to an element in the heap.
    pub fn contains_key(&self, key: HeapKey) -> bool {
        self.table.slot_of(key).is_some()
    }

    /// Re-establishes heap order around the element behind `key`.
    ///
    /// For element types whose ordering key can change through interior
    /// mutability; otherwise use [`set`](Self::set) or
    /// [`update_with`](Self::update_with).
    ///
    /// # Errors
    ///
    /// [`HeapError::StaleKey`] if `key` no longer refers to a live element,
    /// [`HeapError::PendingReheapify`] while a bulk load is unfinalized.
    pub fn update(&mut self, key: HeapKey) -> Result<(), HeapError> {
        if self.pending {
            return Err(HeapError::PendingReheapify);
        }
        let slot = self.table.slot_of(key).ok_or(HeapError::StaleKey)?;
        self.reorder(slot);
        Ok(())
    }

    /// Mutates the element behind `key` in place, then reorders.
    ///
    /// # Errors
    ///
    /// Same as [`update`](Self::update).
    pub fn update_with<F>(&mut self, key: HeapKey, f: F) -> Result<(), HeapError>
    where
        F: FnOnce(&mut T),
    {
        if self.pending {
            return Err(HeapError::PendingReheapify);
        }
        let slot = self.table.slot_of(key).ok_or(HeapError::StaleKey)?;
        f(&mut self.slots.as_mut_slice()[slot].value);
        self.reorder(slot);
        Ok(())
    }

    /// Replaces the element behind `key`, reorders, and returns the old
    /// element.
    ///
    /// # Errors
    ///
    /// Same as [`update`](Self::update).
    pub fn set(&mut self, key: HeapKey, value: T) -> Result<T, HeapError> {
        if self.pending {
            return Err(HeapError::PendingReheapify);
        }
        let slot = self.table.slot_of(key).ok_or(HeapError::StaleKey)?;
        let old = mem::replace(&mut self.slots.as_mut_slice()[slot].value, value);
        self.reorder(slot);
        Ok(old)
    }
}

impl<T: Clone, X: Tracking> Clone for IndexedHeap<T, X> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            table: self.table.clone(),
            pending: self.pending,
        }
    }

    /// Reuses the target's allocation when capacities match; otherwise
    /// reallocates to the source's capacity.
    fn clone_from(&mut self, source: &Self) {
        self.slots.clone_from(&source.slots);
        self.table.clone_from(&source.table);
        self.pending = source.pending;
    }
}

impl<T, X: Tracking> fmt::Debug for IndexedHeap<T, X> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexedHeap")
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .field("needs_reheapify", &self.pending)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::Positional;

    impl<T: Ord> IndexedHeap<T, Keyed> {
        /// Checks the heap-order invariant and the identity-index invariant.
        fn assert_consistent(&self) {
            let slots = self.slots.as_slice();
            if !self.pending {
                for i in 1..slots.len() {
                    assert!(
                        slots[(i - 1) / 2].value >= slots[i].value,
                        "heap order violated at slot {i}"
                    );
                }
            }
            for (i, slot) in slots.iter().enumerate() {
                assert_eq!(
                    self.table.tag_slot(slot.tag),
                    i,
                    "index out of sync at slot {i}"
                );
            }
        }
    }

    fn drain(heap: &mut IndexedHeap<i32, Keyed>) -> Vec<i32> {
        let mut out = Vec::new();
        while let Ok(v) = heap.pop() {
            heap.assert_consistent();
            out.push(v);
        }
        out
    }

    #[test]
    fn bulk_load_drains_in_descending_order() {
        let mut heap: IndexedHeap<i32> = IndexedHeap::with_capacity(10);
        for x in 0..10 {
            heap.fast_push(x).unwrap();
        }
        heap.reheapify();
        heap.assert_consistent();
        assert_eq!(drain(&mut heap), vec![9, 8, 7, 6, 5, 4, 3, 2, 1, 0]);
    }

    #[test]
    fn set_moves_element_to_the_tail_of_the_drain() {
        let mut heap: IndexedHeap<i32> = IndexedHeap::with_capacity(10);
        let mut keys = Vec::new();
        for x in 0..10 {
            keys.push(heap.fast_push(x).unwrap());
        }
        heap.reheapify();
        assert_eq!(heap.set(keys[9], -1).unwrap(), 9);
        heap.assert_consistent();
        assert_eq!(drain(&mut heap), vec![8, 7, 6, 5, 4, 3, 2, 1, 0, -1]);
    }

    #[test]
    fn incremental_push_orders_pops() {
        let mut heap: IndexedHeap<i32> = IndexedHeap::with_capacity(3);
        heap.push(5).unwrap();
        heap.push(1).unwrap();
        heap.push(9).unwrap();
        heap.assert_consistent();
        assert_eq!(heap.pop().unwrap(), 9);
        assert_eq!(heap.pop().unwrap(), 5);
        assert_eq!(heap.pop().unwrap(), 1);
    }

    #[test]
    fn push_beyond_capacity_is_rejected_and_state_unchanged() {
        let mut heap: IndexedHeap<i32> = IndexedHeap::with_capacity(2);
        heap.push(1).unwrap();
        heap.push(2).unwrap();
        assert_eq!(heap.push(3), Err(PushError::CapacityExceeded(3)));
        assert_eq!(heap.len(), 2);
        heap.assert_consistent();
        assert_eq!(drain(&mut heap), vec![2, 1]);
    }

    #[test]
    fn pop_on_empty_heap_fails() {
        let mut heap: IndexedHeap<i32> = IndexedHeap::with_capacity(1);
        assert_eq!(heap.pop(), Err(HeapError::Empty));
    }

    #[test]
    fn pending_state_rejects_ordering_dependent_operations() {
        let mut heap: IndexedHeap<i32> = IndexedHeap::with_capacity(4);
        let key = heap.fast_push(1).unwrap();
        assert!(heap.needs_reheapify());
        assert_eq!(heap.pop(), Err(HeapError::PendingReheapify));
        assert_eq!(heap.update(key), Err(HeapError::PendingReheapify));
        assert_eq!(heap.update_at(0), Err(HeapError::PendingReheapify));
        assert_eq!(heap.push(2), Err(PushError::PendingReheapify(2)));
        heap.fast_push(3).unwrap();
        heap.reheapify();
        assert!(!heap.needs_reheapify());
        assert_eq!(drain(&mut heap), vec![3, 1]);
    }

    #[test]
    fn update_with_restores_order_in_both_directions() {
        let mut heap: IndexedHeap<i32> = IndexedHeap::with_capacity(8);
        let low = heap.push(1).unwrap();
        let high = heap.push(100).unwrap();
        for x in [20, 30, 40, 50] {
            heap.push(x).unwrap();
        }
        heap.update_with(low, |v| *v = 99).unwrap();
        heap.assert_consistent();
        heap.update_with(high, |v| *v = 0).unwrap();
        heap.assert_consistent();
        assert_eq!(drain(&mut heap), vec![99, 50, 40, 30, 20, 0]);
    }

    #[test]
    fn update_at_root_after_key_decrease() {
        let mut heap: IndexedHeap<i32> = IndexedHeap::with_capacity(10);
        for x in 0..10 {
            heap.push(x).unwrap();
        }
        assert_eq!(heap.set_at(0, -1).unwrap(), 9);
        heap.assert_consistent();
        assert_eq!(drain(&mut heap), vec![8, 7, 6, 5, 4, 3, 2, 1, 0, -1]);
    }

    #[test]
    fn update_at_out_of_range() {
        let mut heap: IndexedHeap<i32> = IndexedHeap::with_capacity(4);
        heap.push(1).unwrap();
        assert_eq!(heap.update_at(1), Err(HeapError::OutOfRange));
        assert_eq!(heap.set_at(7, 0), Err(HeapError::OutOfRange));
    }

    #[test]
    fn keys_go_stale_on_pop_and_clear() {
        let mut heap: IndexedHeap<i32> = IndexedHeap::with_capacity(4);
        let a = heap.push(10).unwrap();
        let b = heap.push(5).unwrap();
        assert_eq!(heap.pop().unwrap(), 10);
        assert_eq!(heap.update(a), Err(HeapError::StaleKey));
        assert!(!heap.contains_key(a));
        assert!(heap.contains_key(b));

        heap.clear();
        assert_eq!(heap.update(b), Err(HeapError::StaleKey));
        assert!(heap.is_empty());
        assert_eq!(heap.capacity(), 4);
    }

    #[test]
    fn keys_survive_arbitrary_movement() {
        let mut heap: IndexedHeap<i32> = IndexedHeap::with_capacity(16);
        let keys: Vec<_> = (0..16).map(|x| heap.push(x).unwrap()).collect();
        heap.pop().unwrap();
        heap.pop().unwrap();
        heap.assert_consistent();
        for (x, key) in keys.iter().enumerate().take(14) {
            assert_eq!(heap.get(*key), Some(&(x as i32)));
        }
    }

    #[test]
    fn fast_push_matches_push_drain_order() {
        let values = [42, 7, 19, 3, 88, 61, 5, 23, 77, 14, 2, 96];

        let mut incremental: IndexedHeap<i32> = IndexedHeap::with_capacity(values.len());
        for &x in &values {
            incremental.push(x).unwrap();
        }

        let mut bulk: IndexedHeap<i32> = IndexedHeap::with_capacity(values.len());
        for &x in &values {
            bulk.fast_push(x).unwrap();
        }
        bulk.reheapify();
        bulk.assert_consistent();

        assert_eq!(drain(&mut incremental), drain(&mut bulk));
    }

    #[test]
    fn reheapify_on_ordered_heap_is_harmless() {
        let mut heap: IndexedHeap<i32> = IndexedHeap::with_capacity(8);
        for x in [4, 1, 7, 3] {
            heap.push(x).unwrap();
        }
        heap.reheapify();
        heap.assert_consistent();
        assert_eq!(drain(&mut heap), vec![7, 4, 3, 1]);
    }

    #[test]
    fn clear_supports_reuse_without_reallocation() {
        let mut heap: IndexedHeap<i32> = IndexedHeap::with_capacity(3);
        for x in 0..3 {
            heap.fast_push(x).unwrap();
        }
        heap.clear();
        for x in [9, 4, 6] {
            heap.push(x).unwrap();
        }
        heap.assert_consistent();
        assert_eq!(drain(&mut heap), vec![9, 6, 4]);
    }

    #[test]
    fn clone_and_clone_from_replicate_state() {
        let mut heap: IndexedHeap<i32> = IndexedHeap::with_capacity(6);
        let key = heap.push(10).unwrap();
        heap.push(20).unwrap();
        heap.push(15).unwrap();

        let mut copy = heap.clone();
        assert_eq!(copy.capacity(), 6);
        assert_eq!(copy.get(key), Some(&10));
        assert_eq!(drain(&mut copy), vec![20, 15, 10]);

        let mut other: IndexedHeap<i32> = IndexedHeap::with_capacity(2);
        other.clone_from(&heap);
        assert_eq!(other.capacity(), 6);
        assert_eq!(drain(&mut other), vec![20, 15, 10]);
        // Source untouched.
        assert_eq!(drain(&mut heap), vec![20, 15, 10]);
    }

    #[test]
    fn positional_policy_supports_slot_addressed_updates() {
        let mut heap: IndexedHeap<i32, Positional> = IndexedHeap::with_capacity(10);
        for x in 0..10 {
            heap.fast_push(x).unwrap();
        }
        heap.reheapify();
        assert_eq!(heap.set_at(0, -1).unwrap(), 9);

        let mut out = Vec::new();
        while let Ok(v) = heap.pop() {
            out.push(v);
        }
        assert_eq!(out, vec![8, 7, 6, 5, 4, 3, 2, 1, 0, -1]);
    }

    #[test]
    fn duplicate_values_drain_completely() {
        let mut heap: IndexedHeap<i32> = IndexedHeap::with_capacity(9);
        for x in [5, 5, 5, 3, 3, 9, 9, 1, 5] {
            heap.push(x).unwrap();
        }
        heap.assert_consistent();
        assert_eq!(drain(&mut heap), vec![9, 9, 5, 5, 5, 5, 3, 3, 1]);
    }

    #[test]
    #[should_panic(expected = "capacity must be non-zero")]
    fn zero_capacity_is_refused() {
        let _heap: IndexedHeap<i32> = IndexedHeap::with_capacity(0);
    }

    #[test]
    fn debug_reports_shape() {
        let mut heap: IndexedHeap<i32> = IndexedHeap::with_capacity(4);
        heap.fast_push(1).unwrap();
        let repr = format!("{heap:?}");
        assert!(repr.contains("len: 1"));
        assert!(repr.contains("capacity: 4"));
        assert!(repr.contains("needs_reheapify: true"));
    }
}
