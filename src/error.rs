//! Error types for heap operations.
//!
//! Every contract violation the heap can detect is a typed failure rather
//! than a silent no-op: a full heap hands the rejected element back, popping
//! an empty heap fails, and operating on a heap that still needs
//! [`reheapify`](crate::IndexedHeap::reheapify) is refused instead of
//! quietly corrupting slot order.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Error returned by [`push`](crate::IndexedHeap::push) and
/// [`fast_push`](crate::IndexedHeap::fast_push).
///
/// Carries the element that was not inserted, so a rejected value is never
/// lost to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushError<T> {
    /// The heap already holds `capacity` elements.
    CapacityExceeded(T),
    /// A `fast_push` batch has not been finalized with `reheapify` yet.
    PendingReheapify(T),
}

impl<T> PushError<T> {
    /// Consumes the error, returning the element that was not inserted.
    pub fn into_inner(self) -> T {
        match self {
            Self::CapacityExceeded(value) | Self::PendingReheapify(value) => value,
        }
    }
}

impl<T> fmt::Display for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded(_) => f.write_str("heap is at capacity"),
            Self::PendingReheapify(_) => f.write_str("heap has unordered fast-pushed elements; call reheapify first"),
        }
    }
}

impl<T: fmt::Debug> std::error::Error for PushError<T> {}

/// Error returned by the non-inserting heap operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeapError {
    /// The heap holds no elements.
    Empty,
    /// A `fast_push` batch has not been finalized with `reheapify` yet.
    PendingReheapify,
    /// The slot index is not in `0..len`.
    OutOfRange,
    /// The key refers to an element that is no longer in the heap.
    StaleKey,
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("heap is empty"),
            Self::PendingReheapify => f.write_str("heap has unordered fast-pushed elements; call reheapify first"),
            Self::OutOfRange => f.write_str("slot index is out of range"),
            Self::StaleKey => f.write_str("key refers to an element that has left the heap"),
        }
    }
}

impl std::error::Error for HeapError {}
