//! Service-quality metrics accumulated during replay.
//!
//! Pure accumulation: the hospital feeds entries in event-application order
//! (== non-decreasing time) and nothing here derives or aggregates further.
//! Both histories are append-only; read access preserves insertion order.

use crate::models::disease::Disease;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One urgency-loss entry: the severity cost of a blocked or misallocated
/// admission, discounted by relocation tolerance for overflow placements and
/// undiscounted for rejections.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UrgencySample {
    pub time: f64,
    pub disease: Disease,
    pub urgency: f64,
}

/// One acceptance entry: `accepted` is true for an overflow placement that
/// found a bed, false for a rejection. Exact-match admissions produce no
/// entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AcceptanceSample {
    pub time: f64,
    pub disease: Disease,
    pub accepted: bool,
}

/// Append-only urgency/acceptance histories plus per-disease counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsAccumulator {
    urgency_history: Vec<UrgencySample>,
    acceptance_history: Vec<AcceptanceSample>,
    treated: HashMap<Disease, u64>,
    rejected: HashMap<Disease, u64>,
}

impl MetricsAccumulator {
    /// Empty accumulator with every counter present at zero.
    pub fn new() -> Self {
        let zeros: HashMap<Disease, u64> = Disease::ALL.iter().map(|&d| (d, 0)).collect();
        Self {
            urgency_history: Vec::new(),
            acceptance_history: Vec::new(),
            treated: zeros.clone(),
            rejected: zeros,
        }
    }

    pub fn urgency_history(&self) -> &[UrgencySample] {
        &self.urgency_history
    }

    pub fn acceptance_history(&self) -> &[AcceptanceSample] {
        &self.acceptance_history
    }

    /// Patients of `disease` who received a bed.
    pub fn treated(&self, disease: Disease) -> u64 {
        self.treated.get(&disease).copied().unwrap_or(0)
    }

    /// Patients of `disease` turned away.
    pub fn rejected(&self, disease: Disease) -> u64 {
        self.rejected.get(&disease).copied().unwrap_or(0)
    }

    pub fn treated_counts(&self) -> &HashMap<Disease, u64> {
        &self.treated
    }

    pub fn rejected_counts(&self) -> &HashMap<Disease, u64> {
        &self.rejected
    }

    pub(crate) fn record_urgency(&mut self, time: f64, disease: Disease, urgency: f64) {
        self.urgency_history.push(UrgencySample {
            time,
            disease,
            urgency,
        });
    }

    pub(crate) fn record_acceptance(&mut self, time: f64, disease: Disease, accepted: bool) {
        self.acceptance_history.push(AcceptanceSample {
            time,
            disease,
            accepted,
        });
    }

    pub(crate) fn record_treated(&mut self, disease: Disease) {
        *self.treated.entry(disease).or_insert(0) += 1;
    }

    pub(crate) fn record_rejected(&mut self, disease: Disease) {
        *self.rejected.entry(disease).or_insert(0) += 1;
    }

    /// Empty both histories and zero both count mappings.
    pub fn reset(&mut self) {
        self.urgency_history.clear();
        self.acceptance_history.clear();
        for count in self.treated.values_mut() {
            *count = 0;
        }
        for count in self.rejected.values_mut() {
            *count = 0;
        }
    }
}

impl Default for MetricsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}
