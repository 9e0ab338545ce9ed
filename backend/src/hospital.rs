//! Hospital aggregate: the only component that mutates ward, roster, and
//! metric state.
//!
//! The hospital applies one event at a time through a single exhaustive
//! dispatch. Every inconsistency between the log and the live configuration
//! is surfaced as a [`HospitalError`] value: nothing is silently dropped and
//! no occupied bed is ever evicted to satisfy a request.
//!
//! # Critical Invariants
//!
//! 1. Occupied beds never exceed ward capacity
//! 2. A roster patient occupies exactly one bed, and that bed names them back
//! 3. Metrics reflect only events that actually mutated state

use crate::config::{ConfigError, HospitalConfig};
use crate::metrics::MetricsAccumulator;
use crate::models::bed::BedPoolError;
use crate::models::disease::Disease;
use crate::models::event::{EventKind, EventRecord};
use crate::models::patient::{BedRef, Patient};
use crate::models::ward::Ward;
use crate::rng::RngManager;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Recoverable inconsistencies between the event log and live state. None of
/// these abort a replay; the driver reports them and continues.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HospitalError {
    /// An arrival resolved against a ward with no free bed: the log and the
    /// bed-distribution configuration disagree. The patient is admitted
    /// nowhere and no counter moves.
    #[error("no free bed in ward {ward} for patient {patient_id} at t={time}")]
    CapacityInconsistency {
        time: f64,
        patient_id: u64,
        ward: Disease,
    },

    /// An arrival named a patient id already on the roster.
    #[error("patient {patient_id} is already admitted; duplicate arrival at t={time}")]
    DuplicateAdmission { time: f64, patient_id: u64 },

    /// A discharge named a patient id not on the roster. Arises when the
    /// matching arrival failed, or when the log itself is inconsistent.
    #[error("discharge at t={time} references patient {patient_id} not on the roster")]
    DanglingDischarge { time: f64, patient_id: u64 },

    /// A capacity update was refused by a ward's bed pool.
    #[error("ward {ward}: {source}")]
    Ward {
        ward: Disease,
        #[source]
        source: BedPoolError,
    },
}

/// Occupancy snapshot for one ward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WardStatus {
    pub disease: Disease,
    pub occupied: usize,
    pub capacity: usize,
}

/// The aggregate root: all wards, the roster of currently admitted patients,
/// and the metrics accumulator whose lifetime matches the hospital's.
#[derive(Debug, Clone, PartialEq)]
pub struct Hospital {
    wards: HashMap<Disease, Ward>,
    roster: HashMap<u64, Patient>,
    metrics: MetricsAccumulator,
    rng: RngManager,
    rng_seed: u64,
}

impl Hospital {
    /// Build an empty hospital from a validated configuration. The hospital
    /// keeps its own copy of the ward table; later capacity changes go
    /// through [`Hospital::update_bed_distribution`] only.
    pub fn new(config: &HospitalConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let wards = config
            .wards
            .iter()
            .map(|ward_config| (ward_config.disease, Ward::new(ward_config)))
            .collect();
        Ok(Self {
            wards,
            roster: HashMap::new(),
            metrics: MetricsAccumulator::new(),
            rng: RngManager::new(config.rng_seed),
            rng_seed: config.rng_seed,
        })
    }

    /// Apply one event, mutating ward occupancy and feeding the metrics
    /// accumulator. Errors are recoverable data inconsistencies; state is
    /// left untouched when one is returned.
    pub fn apply(&mut self, event: &EventRecord) -> Result<(), HospitalError> {
        match event.kind {
            EventKind::Arrival { ward } => {
                self.admit(event.time, event.patient_id, event.disease, ward)
            }
            EventKind::Discharge => self.discharge(event.time, event.patient_id),
            EventKind::Rejection => self.reject(event.time, event.disease),
        }
    }

    fn admit(
        &mut self,
        time: f64,
        patient_id: u64,
        disease: Disease,
        ward: Disease,
    ) -> Result<(), HospitalError> {
        if self.roster.contains_key(&patient_id) {
            return Err(HospitalError::DuplicateAdmission { time, patient_id });
        }

        let ward_entry = self
            .wards
            .get_mut(&ward)
            .expect("validated config has one ward per disease");
        let Some(slot) = ward_entry.admit(patient_id, &mut self.rng) else {
            return Err(HospitalError::CapacityInconsistency {
                time,
                patient_id,
                ward,
            });
        };

        let mut patient = Patient::new(patient_id, disease);
        patient.assign_bed(BedRef { ward, index: slot });
        self.roster.insert(patient_id, patient);
        self.metrics.record_treated(disease);

        // Overflow placement: cost the blocked home admission, discounted by
        // how well this disease tolerates the admitting ward.
        if disease != ward {
            let home = self
                .wards
                .get(&disease)
                .expect("validated config has one ward per disease");
            let discounted = home.urgency() * (1.0 - home.relocation_toward(ward));
            self.metrics.record_urgency(time, disease, discounted);
            self.metrics.record_acceptance(time, ward, true);
        }

        Ok(())
    }

    fn discharge(&mut self, time: f64, patient_id: u64) -> Result<(), HospitalError> {
        let Some(patient) = self.roster.remove(&patient_id) else {
            return Err(HospitalError::DanglingDischarge { time, patient_id });
        };

        if let Some(bed) = patient.bed() {
            if let Some(ward) = self.wards.get_mut(&bed.ward) {
                ward.free_bed(bed.index);
            }
        }
        Ok(())
    }

    fn reject(&mut self, time: f64, disease: Disease) -> Result<(), HospitalError> {
        let urgency = self
            .wards
            .get(&disease)
            .expect("validated config has one ward per disease")
            .urgency();
        self.metrics.record_rejected(disease);
        self.metrics.record_urgency(time, disease, urgency);
        self.metrics.record_acceptance(time, disease, false);
        Ok(())
    }

    /// Forward each entry to the matching ward's resize. Entries are
    /// independent: refused wards stay untouched, accepted wards are applied
    /// and their occupants' back-references re-linked.
    pub fn update_bed_distribution(
        &mut self,
        distribution: &HashMap<Disease, usize>,
    ) -> Result<(), Vec<HospitalError>> {
        let mut refusals = Vec::new();
        for disease in Disease::ALL {
            let Some(&capacity) = distribution.get(&disease) else {
                continue;
            };
            let ward = self
                .wards
                .get_mut(&disease)
                .expect("validated config has one ward per disease");
            if let Err(source) = ward.resize(capacity) {
                log::warn!("refusing bed update for ward {disease}: {source}");
                refusals.push(HospitalError::Ward {
                    ward: disease,
                    source,
                });
                continue;
            }
            self.relink_ward(disease);
        }

        if refusals.is_empty() {
            Ok(())
        } else {
            Err(refusals)
        }
    }

    // A shrink may compact slot indices; point roster entries at the slots
    // that now hold them.
    fn relink_ward(&mut self, disease: Disease) {
        let occupants = self
            .wards
            .get(&disease)
            .expect("validated config has one ward per disease")
            .occupants();
        for (index, patient_id) in occupants {
            if let Some(patient) = self.roster.get_mut(&patient_id) {
                patient.assign_bed(BedRef {
                    ward: disease,
                    index,
                });
            }
        }
    }

    pub fn get_ward(&self, disease: Disease) -> Option<&Ward> {
        self.wards.get(&disease)
    }

    /// Currently admitted patients, keyed by id.
    pub fn roster(&self) -> &HashMap<u64, Patient> {
        &self.roster
    }

    pub fn patient(&self, patient_id: u64) -> Option<&Patient> {
        self.roster.get(&patient_id)
    }

    pub fn num_admitted(&self) -> usize {
        self.roster.len()
    }

    pub fn metrics(&self) -> &MetricsAccumulator {
        &self.metrics
    }

    /// Per-ward occupancy and capacity, in disease order.
    pub fn ward_status(&self) -> Vec<WardStatus> {
        Disease::ALL
            .iter()
            .map(|&disease| {
                let ward = self
                    .wards
                    .get(&disease)
                    .expect("validated config has one ward per disease");
                WardStatus {
                    disease,
                    occupied: ward.occupied(),
                    capacity: ward.capacity(),
                }
            })
            .collect()
    }

    /// Full teardown to the empty state: clears the roster, frees every bed,
    /// resets metrics, and reseeds the bed-selection RNG. Current ward
    /// capacities are kept.
    pub fn reset(&mut self) {
        self.roster.clear();
        for ward in self.wards.values_mut() {
            ward.reset();
        }
        self.metrics.reset();
        self.rng = RngManager::new(self.rng_seed);
    }
}
