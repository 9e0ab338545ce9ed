//! Per-ward bed pool: the leaf resource allocator.
//!
//! A pool is a resizable sequence of slots. Slot index is identity — it is
//! what render layers and roster back-references point at — so shrinking
//! removes only unoccupied slots and the aggregate re-links any references
//! whose indices shifted.
//!
//! Whether an admission succeeds is governed solely by "at least one free
//! slot exists"; the uniform-random choice among free slots only decides
//! which physical position a patient lands on.

use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when changing a pool's capacity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BedPoolError {
    /// A shrink request went below the number of occupied slots. The request
    /// is refused wholesale; occupants are never evicted to satisfy it.
    #[error("cannot shrink to {requested} bed(s): {occupied} currently occupied")]
    ShrinkBelowOccupancy { requested: usize, occupied: usize },
}

/// One bed slot, holding at most one occupant id. The reference is
/// non-owning: the roster owns the patient, the slot only records who is in
/// it, and freeing only clears the slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bed {
    occupant: Option<u64>,
}

impl Bed {
    /// Patient id currently occupying this slot, if any.
    pub fn occupant(&self) -> Option<u64> {
        self.occupant
    }

    pub fn is_free(&self) -> bool {
        self.occupant.is_none()
    }

    fn clear(&mut self) {
        self.occupant = None;
    }
}

/// Fixed-identity, resizable collection of bed slots.
///
/// # Example
/// ```
/// use hospital_replay_core_rs::{BedPool, RngManager};
///
/// let mut pool = BedPool::new(2);
/// let mut rng = RngManager::new(7);
///
/// let slot = pool.allocate_any_free(1, &mut rng).unwrap();
/// assert_eq!(pool.occupied(), 1);
///
/// pool.free(slot);
/// pool.free(slot); // idempotent
/// assert_eq!(pool.occupied(), 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BedPool {
    beds: Vec<Bed>,
}

impl BedPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            beds: vec![Bed::default(); capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.beds.len()
    }

    pub fn occupied(&self) -> usize {
        self.beds.iter().filter(|b| !b.is_free()).count()
    }

    pub fn free_count(&self) -> usize {
        self.beds.iter().filter(|b| b.is_free()).count()
    }

    pub fn beds(&self) -> &[Bed] {
        &self.beds
    }

    /// Seat `patient_id` in a uniformly chosen free slot and return its
    /// index. `None` means the pool is full — the caller must treat that as
    /// a data-consistency failure, not drop the patient silently.
    pub fn allocate_any_free(&mut self, patient_id: u64, rng: &mut RngManager) -> Option<usize> {
        let free: Vec<usize> = self
            .beds
            .iter()
            .enumerate()
            .filter(|(_, bed)| bed.is_free())
            .map(|(index, _)| index)
            .collect();
        if free.is_empty() {
            return None;
        }

        let slot = free[rng.index(free.len())];
        self.beds[slot].occupant = Some(patient_id);
        Some(slot)
    }

    /// Clear a slot's occupant. Idempotent; out-of-range indices are a no-op.
    pub fn free(&mut self, index: usize) {
        if let Some(bed) = self.beds.get_mut(index) {
            bed.clear();
        }
    }

    /// Change capacity. Growing appends fresh unoccupied slots. Shrinking
    /// removes unoccupied slots scanning down from the highest index, and is
    /// refused outright if the target is below the occupied count.
    pub fn resize(&mut self, new_capacity: usize) -> Result<(), BedPoolError> {
        let occupied = self.occupied();
        if new_capacity < occupied {
            return Err(BedPoolError::ShrinkBelowOccupancy {
                requested: new_capacity,
                occupied,
            });
        }

        if new_capacity >= self.beds.len() {
            self.beds.resize_with(new_capacity, Bed::default);
            return Ok(());
        }

        let mut to_remove = self.beds.len() - new_capacity;
        let mut index = self.beds.len();
        while to_remove > 0 && index > 0 {
            index -= 1;
            if self.beds[index].is_free() {
                self.beds.remove(index);
                to_remove -= 1;
            }
        }
        debug_assert_eq!(self.beds.len(), new_capacity);
        Ok(())
    }

    /// Occupants with their current slot index, lowest index first. Used to
    /// re-link roster back-references after a shrink compacts indices.
    pub fn occupants(&self) -> Vec<(usize, u64)> {
        self.beds
            .iter()
            .enumerate()
            .filter_map(|(index, bed)| bed.occupant().map(|id| (index, id)))
            .collect()
    }

    /// Clear every slot. Roster bookkeeping is the aggregate's problem.
    pub(crate) fn clear_all(&mut self) {
        for bed in &mut self.beds {
            bed.clear();
        }
    }
}
