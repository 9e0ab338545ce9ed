//! Event-log ingestion.
//!
//! The external log producer hands over history in one of two shapes:
//!
//! - a comma-separated line format, `kind, patient_id, time, disease,
//!   allocation`, one record per line, with an optional header row;
//! - a JSON event-history document, either a bare array of records or the
//!   producer's response envelope carrying an `event_history` array.
//!
//! Both normalize to [`EventRecord`]s: an arrival whose allocation is the
//! `Rejected` sentinel becomes a rejection record, and the producer's
//! `Departure` (or legacy `Transfer`) kind becomes a discharge. Ingestion is
//! strict — the first malformed record fails the whole parse; no partial log
//! is returned.

use crate::models::disease::{Disease, UnknownDisease};
use crate::models::event::EventRecord;
use serde::Deserialize;
use thiserror::Error;

/// Errors surfaced while parsing either wire format.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line}: expected `kind, patient_id, time, disease, allocation`, got {found} field(s)")]
    FieldCount { line: usize, found: usize },

    #[error("line {line}: unknown event kind `{kind}`")]
    UnknownKind { line: usize, kind: String },

    #[error("line {line}: invalid patient id `{value}`")]
    InvalidPatientId { line: usize, value: String },

    #[error("line {line}: invalid time `{value}`")]
    InvalidTime { line: usize, value: String },

    #[error("line {line}: {source}")]
    UnknownDisease {
        line: usize,
        #[source]
        source: UnknownDisease,
    },

    #[error("invalid event history JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("event {index}: unknown event type `{value}`")]
    UnknownEventType { index: usize, value: String },

    #[error("event {index}: unknown allocation `{value}`")]
    UnknownAllocation { index: usize, value: String },
}

const REJECTED_SENTINEL: &str = "Rejected";

enum RawKind {
    Arrival,
    Discharge,
    Rejection,
}

fn parse_kind(field: &str) -> Option<RawKind> {
    match field {
        "Arrival" => Some(RawKind::Arrival),
        // The producer writes departures; older logs used Transfer for the
        // discharge half of a move.
        "Departure" | "Discharge" | "Transfer" => Some(RawKind::Discharge),
        "Rejection" | "Reject" => Some(RawKind::Rejection),
        _ => None,
    }
}

fn is_rejected(field: &str) -> bool {
    field.eq_ignore_ascii_case(REJECTED_SENTINEL)
}

/// Parse the comma-separated line format.
///
/// Blank lines are skipped. One leading header row (a first line whose kind
/// field is not a known kind) is tolerated; every other malformation fails
/// the parse.
pub fn parse_log_lines(input: &str) -> Result<Vec<EventRecord>, ParseError> {
    let mut records = Vec::new();
    let mut seen_data = false;

    for (offset, raw) in input.lines().enumerate() {
        let line = offset + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }

        let fields: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        let kind = match parse_kind(fields[0]) {
            Some(kind) => kind,
            None if !seen_data => continue, // header row
            None => {
                return Err(ParseError::UnknownKind {
                    line,
                    kind: fields[0].to_string(),
                })
            }
        };
        seen_data = true;

        if fields.len() != 5 {
            return Err(ParseError::FieldCount {
                line,
                found: fields.len(),
            });
        }

        let patient_id: u64 = fields[1].parse().map_err(|_| ParseError::InvalidPatientId {
            line,
            value: fields[1].to_string(),
        })?;
        let time: f64 = fields[2].parse().map_err(|_| ParseError::InvalidTime {
            line,
            value: fields[2].to_string(),
        })?;
        let disease: Disease = fields[3]
            .parse()
            .map_err(|source| ParseError::UnknownDisease { line, source })?;

        let record = match kind {
            RawKind::Arrival if is_rejected(fields[4]) => {
                EventRecord::rejection(time, patient_id, disease)
            }
            RawKind::Arrival => {
                let ward: Disease = fields[4]
                    .parse()
                    .map_err(|source| ParseError::UnknownDisease { line, source })?;
                EventRecord::arrival(time, patient_id, disease, ward)
            }
            RawKind::Discharge => EventRecord::discharge(time, patient_id, disease),
            RawKind::Rejection => EventRecord::rejection(time, patient_id, disease),
        };
        records.push(record);
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct HistoryEvent {
    #[serde(alias = "type")]
    event_type: String,
    time: f64,
    patient_id: u64,
    #[serde(alias = "disease")]
    patient_disease: Disease,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AllocationField {
    Ward(Disease),
    Nested { ward: Disease },
    Other(String),
}

#[derive(Debug, Deserialize)]
struct HistoryRecord {
    event: HistoryEvent,
    allocation: AllocationField,
}

#[derive(Debug, Deserialize)]
struct HistoryEnvelope {
    event_history: Vec<HistoryRecord>,
}

/// Parse the JSON event-history format: a bare array of records, or the
/// producer's response envelope with an `event_history` array.
pub fn parse_event_history(json: &str) -> Result<Vec<EventRecord>, ParseError> {
    let raw: Vec<HistoryRecord> = match serde_json::from_str(json) {
        Ok(records) => records,
        Err(_) => serde_json::from_str::<HistoryEnvelope>(json)?.event_history,
    };

    let mut records = Vec::with_capacity(raw.len());
    for (index, record) in raw.into_iter().enumerate() {
        let HistoryEvent {
            event_type,
            time,
            patient_id,
            patient_disease,
        } = record.event;

        let allocated = match record.allocation {
            AllocationField::Ward(ward) | AllocationField::Nested { ward } => Some(ward),
            AllocationField::Other(value) if is_rejected(&value) => None,
            AllocationField::Other(value) => {
                return Err(ParseError::UnknownAllocation { index, value })
            }
        };

        let record = match event_type.as_str() {
            "Arrival" => match allocated {
                Some(ward) => EventRecord::arrival(time, patient_id, patient_disease, ward),
                None => EventRecord::rejection(time, patient_id, patient_disease),
            },
            "Departure" | "Discharge" | "Transfer" => {
                EventRecord::discharge(time, patient_id, patient_disease)
            }
            other => {
                return Err(ParseError::UnknownEventType {
                    index,
                    value: other.to_string(),
                })
            }
        };
        records.push(record);
    }

    Ok(records)
}
