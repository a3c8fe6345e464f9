// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! Slot table storage.
//!
//! Slots are held internally as [`SlotState`], an explicit `Empty` /
//! `Occupied` tag, while the wire and the persisted image keep the all-zero
//! entry as the empty sentinel. Writing the sentinel therefore clears a slot.

use log::debug;
use slot_apdu::{SlotEntry, SlotIndex, ENTRY_LEN};
use thiserror::Error;

pub mod file;
mod memory;

pub use file::FileSlotStore;
pub use memory::MemorySlotStore;

/// Largest table addressable with one-byte slot indices.
pub const MAX_CAPACITY: usize = u8::MAX as usize + 1;

/// Contents of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotState {
    /// Never written, or cleared with the zero entry.
    #[default]
    Empty,
    /// Bound to an account and derivation path.
    Occupied(SlotEntry),
}

impl SlotState {
    /// Classify a wire entry, mapping the zero sentinel to `Empty`.
    pub fn from_entry(entry: SlotEntry) -> Self {
        if entry.is_sentinel() {
            Self::Empty
        } else {
            Self::Occupied(entry)
        }
    }

    /// Entry held by an occupied slot.
    pub fn entry(&self) -> Option<&SlotEntry> {
        match self {
            Self::Empty => None,
            Self::Occupied(entry) => Some(entry),
        }
    }

    /// Whether the slot holds an entry.
    pub fn is_occupied(&self) -> bool {
        matches!(self, Self::Occupied(_))
    }

    /// Wire form; empty slots serialize as the zero sentinel.
    pub fn to_wire(&self) -> [u8; ENTRY_LEN] {
        self.entry().copied().unwrap_or(SlotEntry::ZERO).to_wire()
    }
}

/// Errors surfaced by slot stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Index lies outside the table.
    #[error("slot {index} outside table of {capacity} slots")]
    InvalidIndex { index: SlotIndex, capacity: usize },
    /// Slot holds no entry.
    #[error("slot {0} is empty")]
    EmptySlot(SlotIndex),
    /// Backing storage failed.
    #[error("slot store i/o: {0}")]
    Io(#[from] std::io::Error),
    /// Requested table exceeds the one-byte index space.
    #[error("capacity {0} exceeds {max} slots", max = MAX_CAPACITY)]
    Capacity(usize),
    /// Persisted image failed validation.
    #[error("corrupt slot image: {0}")]
    Corrupt(String),
}

/// Fixed-size slot table.
///
/// Implementors provide raw slot access; the table operations are built on
/// top so every backend enforces the same bounds and sentinel rules.
/// A failed `write` must leave the previous state observable.
pub trait SlotStore {
    /// Number of addressable slots.
    fn capacity(&self) -> usize;

    /// Current state of `index`, or `None` outside the table.
    fn read(&self, index: SlotIndex) -> Option<SlotState>;

    /// Replace the state of an in-range `index`.
    fn write(&mut self, index: SlotIndex, state: SlotState) -> Result<(), StoreError>;

    /// Whether `index` addresses a slot of this table.
    fn contains(&self, index: SlotIndex) -> bool {
        index.as_usize() < self.capacity()
    }

    /// One occupancy flag per slot in index order.
    fn status(&self) -> Vec<bool> {
        (0..self.capacity())
            .map(|raw| {
                u8::try_from(raw)
                    .ok()
                    .and_then(|raw| self.read(SlotIndex::new(raw)))
                    .is_some_and(|state| state.is_occupied())
            })
            .collect()
    }

    /// Entry stored at `index`; out-of-range and empty slots both report `EmptySlot`.
    fn get(&self, index: SlotIndex) -> Result<SlotEntry, StoreError> {
        match self.read(index) {
            Some(SlotState::Occupied(entry)) => Ok(entry),
            _ => Err(StoreError::EmptySlot(index)),
        }
    }

    /// Store `entry` at `index`, returning the state it replaced.
    fn set(&mut self, index: SlotIndex, entry: SlotEntry) -> Result<SlotState, StoreError> {
        let previous = self.read(index).ok_or(StoreError::InvalidIndex {
            index,
            capacity: self.capacity(),
        })?;
        let next = SlotState::from_entry(entry);
        self.write(index, next)?;
        debug!("slot {index}: {previous:?} -> {next:?}");
        Ok(previous)
    }

    /// Clear `index` by writing the zero sentinel.
    fn clear(&mut self, index: SlotIndex) -> Result<SlotState, StoreError> {
        self.set(index, SlotEntry::ZERO)
    }
}

impl<S: SlotStore + ?Sized> SlotStore for Box<S> {
    fn capacity(&self) -> usize {
        (**self).capacity()
    }

    fn read(&self, index: SlotIndex) -> Option<SlotState> {
        (**self).read(index)
    }

    fn write(&mut self, index: SlotIndex, state: SlotState) -> Result<(), StoreError> {
        (**self).write(index, state)
    }
}
