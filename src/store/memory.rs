// CLASSIFICATION: COMMUNITY
// Filename: memory.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-16

//! In-memory slot table used by tests and the emulator build.

use log::warn;
use slot_apdu::{SlotIndex, SLOT_COUNT};

use super::{SlotState, SlotStore, StoreError, MAX_CAPACITY};

/// Volatile slot table, all slots empty at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemorySlotStore {
    slots: Vec<SlotState>,
}

impl Default for MemorySlotStore {
    fn default() -> Self {
        Self::new(SLOT_COUNT)
    }
}

impl MemorySlotStore {
    /// Create an empty table of `capacity` slots, at most [`MAX_CAPACITY`].
    pub fn new(capacity: usize) -> Self {
        if capacity > MAX_CAPACITY {
            warn!("slot table of {capacity} clamped to {MAX_CAPACITY}");
        }
        Self {
            slots: vec![SlotState::Empty; capacity.min(MAX_CAPACITY)],
        }
    }

    /// Borrow every slot in index order.
    pub fn slots(&self) -> &[SlotState] {
        &self.slots
    }
}

impl SlotStore for MemorySlotStore {
    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn read(&self, index: SlotIndex) -> Option<SlotState> {
        self.slots.get(index.as_usize()).copied()
    }

    fn write(&mut self, index: SlotIndex, state: SlotState) -> Result<(), StoreError> {
        let capacity = self.slots.len();
        let slot = self
            .slots
            .get_mut(index.as_usize())
            .ok_or(StoreError::InvalidIndex { index, capacity })?;
        *slot = state;
        Ok(())
    }
}
