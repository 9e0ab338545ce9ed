//! Ward: a capacity-bounded care unit for one disease type.
//!
//! Wraps a bed pool with the static policy data the metrics computation
//! needs: the urgency weight of a blocked admission for this disease, and
//! the relocation-tolerance vector toward every other ward.

use crate::config::WardConfig;
use crate::models::bed::{Bed, BedPool, BedPoolError};
use crate::models::disease::Disease;
use crate::rng::RngManager;
use std::collections::HashMap;

/// A capacity-bounded care unit for one disease type.
#[derive(Debug, Clone, PartialEq)]
pub struct Ward {
    disease: Disease,
    pool: BedPool,
    urgency: f64,
    relocation: HashMap<Disease, f64>,
}

impl Ward {
    pub(crate) fn new(config: &WardConfig) -> Self {
        Self {
            disease: config.disease,
            pool: BedPool::new(config.beds),
            urgency: config.urgency,
            relocation: config.relocation.clone(),
        }
    }

    /// Disease key; unique across the hospital.
    pub fn disease(&self) -> Disease {
        self.disease
    }

    /// Severity weight of a blocked admission for this disease.
    pub fn urgency(&self) -> f64 {
        self.urgency
    }

    /// Probability in [0, 1] that a patient of this ward's disease tolerates
    /// being housed in `ward` instead. Unlisted wards get 0.
    pub fn relocation_toward(&self, ward: Disease) -> f64 {
        self.relocation.get(&ward).copied().unwrap_or(0.0)
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    pub fn occupied(&self) -> usize {
        self.pool.occupied()
    }

    pub fn beds(&self) -> &[Bed] {
        self.pool.beds()
    }

    /// Occupants with their current slot index, lowest index first.
    pub fn occupants(&self) -> Vec<(usize, u64)> {
        self.pool.occupants()
    }

    /// Seat a patient in a uniformly chosen free bed; `None` means the ward
    /// is full.
    pub(crate) fn admit(&mut self, patient_id: u64, rng: &mut RngManager) -> Option<usize> {
        self.pool.allocate_any_free(patient_id, rng)
    }

    pub(crate) fn free_bed(&mut self, index: usize) {
        self.pool.free(index);
    }

    pub(crate) fn resize(&mut self, new_capacity: usize) -> Result<(), BedPoolError> {
        self.pool.resize(new_capacity)
    }

    /// Free every bed. Roster cleanup belongs to the hospital; this is only
    /// called as part of a full teardown.
    pub(crate) fn reset(&mut self) {
        self.pool.clear_all();
    }
}
