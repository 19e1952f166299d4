//! Identity tracking policies and the generational key table.
//!
//! Reverse lookup (element identity → current slot) is a policy the heap is
//! generic over. [`Keyed`] maintains a generational key table so any element
//! can be updated through an opaque [`HeapKey`] without the caller tracking
//! its slot. [`Positional`] drops all per-element bookkeeping for callers
//! that address slots directly.
//!
//! Policy selection is a generic parameter on
//! [`IndexedHeap`](crate::IndexedHeap); both policies share one engine.

use core::fmt;
use serde::{Deserialize, Serialize};

/// Free-list terminator.
const NONE: u32 = u32::MAX;

/// An opaque handle to an element stored in a [`Keyed`] heap.
///
/// A key stays valid while its element remains in the heap, no matter how the
/// element moves between slots. Popping the element, or clearing the heap,
/// invalidates the key: the table entry's generation advances on every reuse,
/// so a stale key is rejected rather than silently remapped onto whichever
/// element occupies the recycled entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HeapKey {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone, Copy)]
struct KeyEntry {
    /// Parity encodes occupancy: even = live, odd = free.
    generation: u32,
    /// Current heap slot when live; next free entry when free.
    slot: u32,
}

/// Identity → slot table with generation-tagged entries.
///
/// Holds exactly `capacity` entries, allocated once. Free entries thread an
/// intrusive free list through their `slot` field.
#[derive(Debug, Clone)]
pub struct KeyTable {
    entries: Vec<KeyEntry>,
    free_head: u32,
}

impl KeyTable {
    fn with_capacity(capacity: usize) -> Self {
        let mut table = Self {
            entries: vec![
                KeyEntry {
                    generation: 1,
                    slot: NONE,
                };
                capacity
            ],
            free_head: NONE,
        };
        table.rebuild_free_list();
        table
    }

    /// Threads every entry onto the free list in index order.
    fn rebuild_free_list(&mut self) {
        let len = self.entries.len();
        for (i, entry) in self.entries.iter_mut().enumerate() {
            if entry.generation % 2 == 0 {
                entry.generation = entry.generation.wrapping_add(1);
            }
            entry.slot = if i + 1 < len { (i + 1) as u32 } else { NONE };
        }
        self.free_head = if len == 0 { NONE } else { 0 };
    }

    /// Claims a free entry for an element entering the heap at `slot`.
    ///
    /// The caller guarantees a free entry exists (the heap checks fullness
    /// before inserting).
    fn claim(&mut self, slot: usize) -> (u32, HeapKey) {
        debug_assert!(self.free_head != NONE, "key table exhausted");
        let index = self.free_head;
        let entry = &mut self.entries[index as usize];
        self.free_head = entry.slot;
        entry.generation = entry.generation.wrapping_add(1);
        entry.slot = slot as u32;
        (
            index,
            HeapKey {
                index,
                generation: entry.generation,
            },
        )
    }

    /// Records that the element tagged `tag` now lives at `slot`.
    fn relocate(&mut self, tag: u32, slot: usize) {
        self.entries[tag as usize].slot = slot as u32;
    }

    /// Releases the entry of an element leaving the heap.
    fn release(&mut self, tag: u32) {
        let entry = &mut self.entries[tag as usize];
        entry.generation = entry.generation.wrapping_add(1);
        entry.slot = self.free_head;
        self.free_head = tag;
    }

    /// Resolves a key to its element's current slot, or `None` if stale.
    pub(crate) fn slot_of(&self, key: HeapKey) -> Option<usize> {
        let entry = self.entries.get(key.index as usize)?;
        if entry.generation == key.generation && entry.generation % 2 == 0 {
            Some(entry.slot as usize)
        } else {
            None
        }
    }

    fn clear(&mut self) {
        self.rebuild_free_list();
    }

    /// Test hook: the raw slot recorded for a live tag.
    #[cfg(test)]
    pub(crate) fn tag_slot(&self, tag: u32) -> usize {
        self.entries[tag as usize].slot as usize
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Policy deciding whether the heap maintains a reverse-lookup index.
///
/// Implemented by [`Keyed`] and [`Positional`]; sealed, since the heap engine
/// depends on the table staying consistent with the slot array.
pub trait Tracking: sealed::Sealed {
    /// Per-slot identity stored beside each element.
    type Tag: Copy + fmt::Debug;
    /// Identity → slot bookkeeping owned by the heap.
    type Table: Clone + fmt::Debug;
    /// What a successful push hands back to the caller.
    type Ticket: fmt::Debug;

    #[doc(hidden)]
    fn table_with_capacity(capacity: usize) -> Self::Table;
    #[doc(hidden)]
    fn clear(table: &mut Self::Table);
    #[doc(hidden)]
    fn claim(table: &mut Self::Table, slot: usize) -> (Self::Tag, Self::Ticket);
    #[doc(hidden)]
    fn relocate(table: &mut Self::Table, tag: Self::Tag, slot: usize);
    #[doc(hidden)]
    fn release(table: &mut Self::Table, tag: Self::Tag);
}

/// Maintains the key table; pushes return a [`HeapKey`].
#[derive(Debug, Clone, Copy)]
pub struct Keyed;

/// No reverse lookup; pushes return `()` and maintenance is slot-addressed.
#[derive(Debug, Clone, Copy)]
pub struct Positional;

impl sealed::Sealed for Keyed {}
impl sealed::Sealed for Positional {}

impl Tracking for Keyed {
    type Tag = u32;
    type Table = KeyTable;
    type Ticket = HeapKey;

    fn table_with_capacity(capacity: usize) -> KeyTable {
        KeyTable::with_capacity(capacity)
    }

    fn clear(table: &mut KeyTable) {
        table.clear();
    }

    fn claim(table: &mut KeyTable, slot: usize) -> (u32, HeapKey) {
        table.claim(slot)
    }

    fn relocate(table: &mut KeyTable, tag: u32, slot: usize) {
        table.relocate(tag, slot);
    }

    fn release(table: &mut KeyTable, tag: u32) {
        table.release(tag);
    }
}

impl Tracking for Positional {
    type Tag = ();
    type Table = ();
    type Ticket = ();

    fn table_with_capacity(_capacity: usize) {}

    fn clear(_table: &mut ()) {}

    fn claim(_table: &mut (), _slot: usize) -> ((), ()) {
        ((), ())
    }

    fn relocate(_table: &mut (), _tag: (), _slot: usize) {}

    fn release(_table: &mut (), _tag: ()) {}
}
