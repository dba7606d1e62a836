//! Shared population count

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};
use embassy_sync::blocking_mutex::Mutex;

/// Current estimated population inside the enclosure.
///
/// Mutations are serialized by a blocking mutex held only for the
/// arithmetic. Reads take the same lock; a reading task seeing a value one
/// mutation stale is acceptable for telemetry.
pub struct PopulationCounter<M: RawMutex> {
    value: Mutex<M, Cell<u32>>,
}

impl<M: RawMutex> PopulationCounter<M> {
    pub const fn new() -> Self {
        Self {
            value: Mutex::new(Cell::new(0)),
        }
    }

    /// One confirmed entry. Returns the new count.
    pub fn increment(&self) -> u32 {
        self.value.lock(|v| {
            let count = v.get().saturating_add(1);
            v.set(count);
            count
        })
    }

    /// One confirmed exit, clamped at zero. An exit seen before any entry
    /// (boot while the enclosure is occupied) must not underflow the count.
    /// Returns the new count.
    pub fn decrement_saturating(&self) -> u32 {
        self.value.lock(|v| {
            let count = v.get().saturating_sub(1);
            v.set(count);
            count
        })
    }

    /// Current count, callable from any task at any time
    pub fn read(&self) -> u32 {
        self.value.lock(|v| v.get())
    }
}

impl<M: RawMutex> Default for PopulationCounter<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// Counter with the interrupt-safe mutex the firmware tasks share.
pub type SharedCounter = PopulationCounter<CriticalSectionRawMutex>;
