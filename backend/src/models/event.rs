//! Replay event records and the master event log.
//!
//! An [`EventRecord`] is one time-stamped fact about one patient, produced by
//! an out-of-process generator and consumed verbatim here. Records are never
//! created, deleted, or reordered after the log is loaded; the `resolved`
//! flag is the single mutable field, set true exactly once when the record is
//! applied to the hospital.
//!
//! [`EventLog`] wraps the full record sequence with the query helpers the
//! replay driver needs: due-and-unresolved selection, per-patient lookup, and
//! flag clearing for rewind.

use crate::models::disease::Disease;
use serde::{Deserialize, Serialize};

/// What happened to the patient, with the admitting ward for arrivals.
///
/// The closed variant set makes dispatch exhaustive: there is no way to add
/// an event kind without the hospital handling it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// The patient was admitted to the ward keyed by `ward`. The admitting
    /// ward may differ from the patient's own disease (overflow placement).
    Arrival { ward: Disease },

    /// The patient left the facility and their bed was released.
    Discharge,

    /// The patient was turned away; they never enter the roster.
    Rejection,
}

/// One time-stamped fact about one patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Simulation clock time, finite and non-negative. Not wall-clock.
    pub time: f64,

    /// Stable patient identity for the lifetime of an admission.
    pub patient_id: u64,

    /// The patient's own disease (their home ward's key).
    pub disease: Disease,

    /// Event variant.
    pub kind: EventKind,

    /// Set true exactly once by successful application.
    #[serde(default)]
    resolved: bool,
}

impl EventRecord {
    /// Admission of `patient_id` into `ward`.
    pub fn arrival(time: f64, patient_id: u64, disease: Disease, ward: Disease) -> Self {
        Self {
            time,
            patient_id,
            disease,
            kind: EventKind::Arrival { ward },
            resolved: false,
        }
    }

    /// Departure of a previously admitted patient.
    pub fn discharge(time: f64, patient_id: u64, disease: Disease) -> Self {
        Self {
            time,
            patient_id,
            disease,
            kind: EventKind::Discharge,
            resolved: false,
        }
    }

    /// A blocked admission: the patient never received a bed.
    pub fn rejection(time: f64, patient_id: u64, disease: Disease) -> Self {
        Self {
            time,
            patient_id,
            disease,
            kind: EventKind::Rejection,
            resolved: false,
        }
    }

    /// Ward this record allocates the patient to, if it is an arrival.
    pub fn allocated_ward(&self) -> Option<Disease> {
        match self.kind {
            EventKind::Arrival { ward } => Some(ward),
            EventKind::Discharge | EventKind::Rejection => None,
        }
    }

    /// Whether this record has already been applied.
    pub fn resolved(&self) -> bool {
        self.resolved
    }

    pub(crate) fn mark_resolved(&mut self) {
        self.resolved = true;
    }
}

/// The master event log: the full record sequence, stable-sorted ascending by
/// time at load. Ties keep producer order, which is required to place an
/// arrival before a same-timestamp discharge of the same patient.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventLog {
    entries: Vec<EventRecord>,
}

impl EventLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build the master log from raw records: clears every resolved flag and
    /// stable-sorts ascending by time.
    pub(crate) fn from_entries(mut entries: Vec<EventRecord>) -> Self {
        for entry in &mut entries {
            entry.resolved = false;
        }
        entries.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { entries }
    }

    /// Number of records in the log.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log holds no records.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All records in replay order.
    pub fn entries(&self) -> &[EventRecord] {
        &self.entries
    }

    /// Number of records not yet applied.
    pub fn unresolved(&self) -> usize {
        self.entries.iter().filter(|e| !e.resolved()).count()
    }

    /// Records referencing a specific patient, in replay order.
    pub fn entries_for_patient(&self, patient_id: u64) -> Vec<&EventRecord> {
        self.entries
            .iter()
            .filter(|e| e.patient_id == patient_id)
            .collect()
    }

    /// Indices of unresolved records due at or before `time`, in log order.
    pub(crate) fn due_unresolved(&self, time: f64) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| !e.resolved() && e.time <= time)
            .map(|(index, _)| index)
            .collect()
    }

    pub(crate) fn entry_mut(&mut self, index: usize) -> &mut EventRecord {
        &mut self.entries[index]
    }

    /// Forget all application progress; used by rewind.
    pub(crate) fn clear_resolved(&mut self) {
        for entry in &mut self.entries {
            entry.resolved = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_entries_sorts_ascending_by_time() {
        let log = EventLog::from_entries(vec![
            EventRecord::arrival(5.0, 2, Disease::B, Disease::B),
            EventRecord::arrival(1.0, 1, Disease::A, Disease::A),
            EventRecord::discharge(3.0, 1, Disease::A),
        ]);

        let times: Vec<f64> = log.entries().iter().map(|e| e.time).collect();
        assert_eq!(times, vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn from_entries_keeps_producer_order_on_ties() {
        // Arrival precedes the same-timestamp discharge in producer order and
        // must stay that way through the sort.
        let log = EventLog::from_entries(vec![
            EventRecord::arrival(2.0, 7, Disease::C, Disease::C),
            EventRecord::discharge(2.0, 7, Disease::C),
        ]);

        assert_eq!(
            log.entries()[0].kind,
            EventKind::Arrival { ward: Disease::C }
        );
        assert_eq!(log.entries()[1].kind, EventKind::Discharge);
    }

    #[test]
    fn from_entries_clears_resolved_flags() {
        let mut record = EventRecord::arrival(0.0, 1, Disease::A, Disease::A);
        record.mark_resolved();

        let log = EventLog::from_entries(vec![record]);
        assert_eq!(log.unresolved(), 1);
    }

    #[test]
    fn due_unresolved_selects_by_time_and_flag() {
        let mut log = EventLog::from_entries(vec![
            EventRecord::arrival(1.0, 1, Disease::A, Disease::A),
            EventRecord::arrival(2.0, 2, Disease::B, Disease::B),
            EventRecord::arrival(9.0, 3, Disease::C, Disease::C),
        ]);

        assert_eq!(log.due_unresolved(2.0), vec![0, 1]);

        log.entry_mut(0).mark_resolved();
        assert_eq!(log.due_unresolved(2.0), vec![1]);
        assert_eq!(log.unresolved(), 2);
    }

    #[test]
    fn entries_for_patient_filters_by_id() {
        let log = EventLog::from_entries(vec![
            EventRecord::arrival(0.0, 1, Disease::A, Disease::A),
            EventRecord::arrival(0.5, 2, Disease::B, Disease::B),
            EventRecord::discharge(4.0, 1, Disease::A),
        ]);

        assert_eq!(log.entries_for_patient(1).len(), 2);
        assert_eq!(log.entries_for_patient(2).len(), 1);
        assert!(log.entries_for_patient(99).is_empty());
    }
}
