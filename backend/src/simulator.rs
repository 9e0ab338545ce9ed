//! Replay driver: the only component exposed to callers.
//!
//! The simulator owns the full sorted event log and exactly one live
//! hospital. Callers drive it with `advance(time)` from their playback tick;
//! `reset()` is the only way to rewind. Replay is deterministic: rebuilding
//! the hospital reseeds the bed-selection RNG, so replaying the same log to
//! the same time reproduces state bit for bit.
//!
//! # Example
//! ```
//! use hospital_replay_core_rs::{Disease, EventRecord, HospitalConfig, Simulator};
//!
//! let mut sim = Simulator::new(HospitalConfig::default()).unwrap();
//! sim.load(vec![EventRecord::arrival(0.0, 1, Disease::A, Disease::A)])
//!     .unwrap();
//!
//! let report = sim.advance(0.0);
//! assert_eq!(report.admitted, 1);
//! assert_eq!(sim.hospital().num_admitted(), 1);
//! ```

use crate::config::{ConfigError, HospitalConfig};
use crate::hospital::{Hospital, HospitalError};
use crate::models::disease::Disease;
use crate::models::event::{EventKind, EventLog, EventRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors surfaced when constructing a simulator or loading a log. A load
/// failure is wholesale: no partial log is ever kept.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("event {index}: time {time} is not a finite non-negative number")]
    InvalidTime { index: usize, time: f64 },
}

/// Parameter set accepted from the caller. Only `bed_distribution` is
/// consumed by the engine; arrival rates and stay means ride along
/// unconsumed for the out-of-process log producer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    #[serde(default)]
    pub bed_distribution: Option<HashMap<Disease, usize>>,

    #[serde(default)]
    pub arrival_rates: Option<HashMap<Disease, f64>>,

    #[serde(default)]
    pub stay_means: Option<HashMap<Disease, f64>>,
}

/// One recoverable inconsistency surfaced during replay.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayAnomaly {
    /// Index of the offending record in the loaded log.
    pub event_index: usize,
    pub error: HospitalError,
}

/// Result of a single `advance` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdvanceReport {
    /// The requested cutoff time.
    pub target_time: f64,

    /// Records applied by this call, anomalous or not.
    pub events_applied: usize,

    /// Successful admissions this call.
    pub admitted: usize,

    /// Successful discharges this call.
    pub discharged: usize,

    /// Rejections recorded this call.
    pub rejected: usize,

    /// Inconsistencies encountered this call.
    pub anomalies: Vec<ReplayAnomaly>,
}

/// State-reconstruction driver over an immutable event log.
#[derive(Debug, Clone)]
pub struct Simulator {
    config: HospitalConfig,
    log: EventLog,
    hospital: Hospital,
    parameters: Option<ParameterSet>,
    clock: f64,
    anomalies: Vec<ReplayAnomaly>,
}

impl Simulator {
    /// Build a simulator with an empty log.
    pub fn new(config: HospitalConfig) -> Result<Self, LoadError> {
        let hospital = Hospital::new(&config)?;
        Ok(Self {
            config,
            log: EventLog::new(),
            hospital,
            parameters: None,
            clock: 0.0,
            anomalies: Vec::new(),
        })
    }

    /// Load a new event log, replacing any previous replay state.
    ///
    /// Validates every record (finite, non-negative time), stable-sorts
    /// ascending by time — ties keep producer order, which must already
    /// place an arrival before any same-timestamp discharge of the same
    /// patient — rebuilds the hospital, and clears all resolved flags. An
    /// active bed-distribution override is reapplied to the fresh hospital.
    pub fn load(&mut self, entries: Vec<EventRecord>) -> Result<(), LoadError> {
        for (index, entry) in entries.iter().enumerate() {
            if !entry.time.is_finite() || entry.time < 0.0 {
                return Err(LoadError::InvalidTime {
                    index,
                    time: entry.time,
                });
            }
        }

        self.log = EventLog::from_entries(entries);
        self.rebuild_hospital();
        self.clock = 0.0;
        self.anomalies.clear();
        Ok(())
    }

    /// Apply every unresolved event due at or before `time`, in time order.
    ///
    /// Valid for non-decreasing `time` across successive calls: repeated or
    /// equal cutoffs are idempotent (resolved records are skipped), and a
    /// smaller cutoff than previously reached applies nothing and rolls
    /// nothing back — rewinding is [`Simulator::reset`]'s job.
    ///
    /// Recoverable inconsistencies never abort the remaining due events;
    /// they are logged, recorded in the report and the cumulative anomaly
    /// list, and the offending record is still marked resolved.
    pub fn advance(&mut self, time: f64) -> AdvanceReport {
        let mut report = AdvanceReport {
            target_time: time,
            ..AdvanceReport::default()
        };

        let mut due = self.log.due_unresolved(time);
        // The master log is already sorted; this re-sort is a stability
        // guard, not a correctness requirement.
        due.sort_by(|&a, &b| {
            self.log.entries()[a]
                .time
                .total_cmp(&self.log.entries()[b].time)
        });

        for index in due {
            let entry = self.log.entries()[index].clone();
            let outcome = self.hospital.apply(&entry);
            self.log.entry_mut(index).mark_resolved();
            report.events_applied += 1;

            match outcome {
                Ok(()) => match entry.kind {
                    EventKind::Arrival { .. } => report.admitted += 1,
                    EventKind::Discharge => report.discharged += 1,
                    EventKind::Rejection => report.rejected += 1,
                },
                Err(error) => {
                    log::warn!("skipping inconsistent event at t={}: {error}", entry.time);
                    let anomaly = ReplayAnomaly {
                        event_index: index,
                        error,
                    };
                    report.anomalies.push(anomaly.clone());
                    self.anomalies.push(anomaly);
                }
            }
        }

        if time > self.clock {
            self.clock = time;
        }
        report
    }

    /// Rewind to zero: discard all resolved flags, rebuild the hospital from
    /// its construction config, and reapply the stored parameter override if
    /// one is active. The only correct way to go backwards.
    pub fn reset(&mut self) {
        self.log.clear_resolved();
        self.rebuild_hospital();
        self.clock = 0.0;
        self.anomalies.clear();
    }

    /// Store the caller's parameter set and apply the bed-distribution
    /// override, if present, to the live hospital. Affects only future bed
    /// selection, never already-seated patients.
    pub fn update_parameters(
        &mut self,
        parameters: ParameterSet,
    ) -> Result<(), Vec<HospitalError>> {
        let result = match &parameters.bed_distribution {
            Some(distribution) => self.hospital.update_bed_distribution(distribution),
            None => Ok(()),
        };
        self.parameters = Some(parameters);
        result
    }

    /// Apply a bed-distribution override directly, folding it into the
    /// stored parameter set so a rewind reapplies it.
    pub fn update_bed_distribution(
        &mut self,
        distribution: &HashMap<Disease, usize>,
    ) -> Result<(), Vec<HospitalError>> {
        let result = self.hospital.update_bed_distribution(distribution);
        self.parameters
            .get_or_insert_with(ParameterSet::default)
            .bed_distribution = Some(distribution.clone());
        result
    }

    pub fn hospital(&self) -> &Hospital {
        &self.hospital
    }

    pub fn events(&self) -> &EventLog {
        &self.log
    }

    /// Highest cutoff reached since the last load or reset.
    pub fn current_time(&self) -> f64 {
        self.clock
    }

    /// Every inconsistency encountered since the last load or reset.
    pub fn anomalies(&self) -> &[ReplayAnomaly] {
        &self.anomalies
    }

    pub fn parameters(&self) -> Option<&ParameterSet> {
        self.parameters.as_ref()
    }

    fn rebuild_hospital(&mut self) {
        self.hospital =
            Hospital::new(&self.config).expect("config validated at construction");
        let Some(distribution) = self
            .parameters
            .as_ref()
            .and_then(|p| p.bed_distribution.as_ref())
        else {
            return;
        };
        if let Err(refusals) = self.hospital.update_bed_distribution(distribution) {
            for refusal in refusals {
                log::warn!("bed override not reapplied after rewind: {refusal}");
            }
        }
    }
}
