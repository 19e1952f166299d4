//! # `apex` — a fixed-capacity indexed binary max-heap
//!
//! A priority queue for workloads that know their maximum size up front and
//! need to change element priorities in place: event schedulers, simulation
//! queues, shortest-path frontiers. All storage is allocated once at
//! construction; nothing resizes behind the caller's back.
//!
//! ## What it adds over `std::collections::BinaryHeap`
//!
//! 1. **By-key updates**: every push returns an opaque [`HeapKey`]; the
//!    element behind a key can be re-prioritized in O(log n) with
//!    [`set`](IndexedHeap::set) / [`update_with`](IndexedHeap::update_with),
//!    no matter where it has drifted in the heap. The reverse lookup
//!    (key → slot) is O(1) through a generational table that mirrors every
//!    slot move.
//! 2. **Bulk loading**: [`fast_push`](IndexedHeap::fast_push) appends
//!    without ordering; one O(n) [`reheapify`](IndexedHeap::reheapify)
//!    then fixes the whole heap, cheaper than n sifted pushes.
//! 3. **Fixed footprint**: capacity is set at construction and never grows.
//!    A full heap rejects the push and hands the element back.
//!
//! ## Explicit failure over silent corruption
//!
//! Every contract violation is a typed error: pushing past capacity
//! ([`PushError::CapacityExceeded`]), popping an empty heap
//! ([`HeapError::Empty`]), addressing a slot out of range
//! ([`HeapError::OutOfRange`]), using a key whose element already left
//! ([`HeapError::StaleKey`]), and touching an unordered heap before its
//! `reheapify` ([`HeapError::PendingReheapify`]).
//!
//! ## Tracking policies
//!
//! The engine is generic over a [`Tracking`] policy. [`Keyed`] (default)
//! maintains the key table. [`Positional`] strips it for callers that track
//! slot positions themselves; pushes then return `()` and maintenance goes
//! through [`update_at`](IndexedHeap::update_at) /
//! [`set_at`](IndexedHeap::set_at).
//!
//! ## Example
//!
//! ```
//! use apex::{HeapError, IndexedHeap};
//!
//! let mut frontier: IndexedHeap<u64> = IndexedHeap::with_capacity(64);
//!
//! let a = frontier.push(10).unwrap();
//! let b = frontier.push(40).unwrap();
//! frontier.push(25).unwrap();
//!
//! // A better path was found for `a`: raise its priority in place.
//! frontier.set(a, 99).unwrap();
//!
//! assert_eq!(frontier.pop().unwrap(), 99);
//! assert_eq!(frontier.pop().unwrap(), 40);
//! assert!(!frontier.contains_key(b));
//! assert_eq!(frontier.pop().unwrap(), 25);
//! assert_eq!(frontier.pop(), Err(HeapError::Empty));
//! ```
//!
//! Single-threaded by design; wrap the heap in your own synchronization if
//! it must be shared.

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]

pub mod error;
pub mod fixed_vec;
pub mod heap;
pub mod tracking;

pub use error::{HeapError, PushError};
pub use fixed_vec::FixedVec;
pub use heap::IndexedHeap;
pub use tracking::{HeapKey, Keyed, Positional, Tracking};
