//! `FixedVec` — an owned contiguous buffer with capacity fixed at construction.
//!
//! Goals:
//! - one allocation at construction, none afterwards
//! - explicit capacity and length, no hidden resizing
//! - rejected pushes hand the value back instead of growing
//!
//! This is the backing store for [`IndexedHeap`](crate::IndexedHeap); the heap
//! relies on the buffer never relocating its contents behind its back.

use core::fmt;
use core::slice;

/// A contiguous buffer whose capacity is set once and never changes.
pub struct FixedVec<T> {
    data: Vec<T>,
    cap: usize,
}

impl<T> FixedVec<T> {
    /// Creates an empty buffer able to hold exactly `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            cap: capacity,
        }
    }

    /// Returns the number of elements currently stored.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if there are no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the fixed capacity.
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Returns `true` if `len() == capacity()`.
    pub fn is_full(&self) -> bool {
        self.data.len() == self.cap
    }

    /// Appends `value`, or returns it unchanged if the buffer is full.
    pub fn try_push(&mut self, value: T) -> Result<(), T> {
        if self.is_full() {
            return Err(value);
        }
        self.data.push(value);
        Ok(())
    }

    /// Removes and returns the last element, if any.
    pub fn pop(&mut self) -> Option<T> {
        self.data.pop()
    }

    /// Swaps the elements at positions `a` and `b`.
    ///
    /// # Panics
    ///
    /// Panics if either position is out of bounds.
    pub fn swap(&mut self, a: usize, b: usize) {
        self.data.swap(a, b);
    }

    /// Returns a reference to the element at `index`, if in bounds.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.data.get(index)
    }

    /// Returns a mutable reference to the element at `index`, if in bounds.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.data.get_mut(index)
    }

    /// Drops all elements. Capacity is retained.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Returns the stored elements as a slice.
    pub fn as_slice(&self) -> &[T] {
        self.data.as_slice()
    }

    /// Returns the stored elements as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.data.as_mut_slice()
    }

    /// Iterates over the stored elements in storage order.
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.data.iter()
    }
}

impl<T: Clone> Clone for FixedVec<T> {
    fn clone(&self) -> Self {
        let mut data = Vec::with_capacity(self.cap);
        data.extend(self.data.iter().cloned());
        Self { data, cap: self.cap }
    }

    fn clone_from(&mut self, source: &Self) {
        if self.cap == source.cap {
            self.data.clear();
            self.data.extend(source.data.iter().cloned());
        } else {
            *self = source.clone();
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for FixedVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedVec")
            .field("len", &self.len())
            .field("capacity", &self.cap)
            .finish()
    }
}
