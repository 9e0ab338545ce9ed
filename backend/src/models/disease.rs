//! Disease classification codes.
//!
//! The facility recognizes a fixed, closed set of six disease codes. A code
//! identifies both a patient's condition and the ward that specializes in it,
//! and keys every metric breakdown. Codes outside the set are a data error
//! and fail ingestion.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error returned when a disease code is outside the fixed set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown disease code `{0}`")]
pub struct UnknownDisease(pub String);

/// One of the six fixed disease categories.
///
/// # Example
/// ```
/// use hospital_replay_core_rs::Disease;
///
/// let disease: Disease = "C".parse().unwrap();
/// assert_eq!(disease, Disease::C);
/// assert!("G".parse::<Disease>().is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Disease {
    A,
    B,
    C,
    D,
    E,
    F,
}

impl Disease {
    /// Every code, in deterministic order. Use this to iterate wards or
    /// counters so output order never depends on hash-map internals.
    pub const ALL: [Disease; 6] = [
        Disease::A,
        Disease::B,
        Disease::C,
        Disease::D,
        Disease::E,
        Disease::F,
    ];

    /// Single-letter code used in log files and reports.
    pub fn code(&self) -> &'static str {
        match self {
            Disease::A => "A",
            Disease::B => "B",
            Disease::C => "C",
            Disease::D => "D",
            Disease::E => "E",
            Disease::F => "F",
        }
    }
}

impl fmt::Display for Disease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Disease {
    type Err = UnknownDisease;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(Disease::A),
            "B" => Ok(Disease::B),
            "C" => Ok(Disease::C),
            "D" => Ok(Disease::D),
            "E" => Ok(Disease::E),
            "F" => Ok(Disease::F),
            other => Err(UnknownDisease(other.to_string())),
        }
    }
}
