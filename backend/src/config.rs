//! Engine configuration.
//!
//! Configuration is explicit: the hospital receives its ward table as a
//! constructor argument and holds its own copy. The only mutation path after
//! construction is `update_bed_distribution`; nothing subscribes to shared
//! mutable state.

use crate::models::disease::Disease;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Errors produced by configuration validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("ward list must contain disease {0} exactly once")]
    WardCoverage(Disease),

    #[error("ward {disease}: urgency must be finite and non-negative, got {value}")]
    InvalidUrgency { disease: Disease, value: f64 },

    #[error("ward {from}: relocation tolerance toward {toward} must be in [0, 1], got {value}")]
    InvalidRelocation {
        from: Disease,
        toward: Disease,
        value: f64,
    },
}

/// Static configuration for one ward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WardConfig {
    /// Disease the ward specializes in; unique across the hospital.
    pub disease: Disease,

    /// Initial bed capacity.
    pub beds: usize,

    /// Severity weight of a blocked admission for this disease.
    pub urgency: f64,

    /// Probability, per foreign ward, that a patient of this disease
    /// tolerates being housed there instead. Values in [0, 1].
    pub relocation: HashMap<Disease, f64>,
}

/// Complete hospital configuration: one ward per disease plus the seed for
/// the deterministic bed-selection RNG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HospitalConfig {
    /// Ward table, one entry per disease.
    pub wards: Vec<WardConfig>,

    /// Seed for deterministic bed selection.
    #[serde(default = "default_seed")]
    pub rng_seed: u64,
}

fn default_seed() -> u64 {
    12345
}

impl HospitalConfig {
    /// Check that the ward table covers every disease exactly once and that
    /// all policy numbers are sane.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for disease in Disease::ALL {
            let count = self.wards.iter().filter(|w| w.disease == disease).count();
            if count != 1 {
                return Err(ConfigError::WardCoverage(disease));
            }
        }

        for ward in &self.wards {
            if !ward.urgency.is_finite() || ward.urgency < 0.0 {
                return Err(ConfigError::InvalidUrgency {
                    disease: ward.disease,
                    value: ward.urgency,
                });
            }
            for (&toward, &value) in &ward.relocation {
                if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                    return Err(ConfigError::InvalidRelocation {
                        from: ward.disease,
                        toward,
                        value,
                    });
                }
            }
        }

        Ok(())
    }
}

impl Default for HospitalConfig {
    /// The standard facility: six wards with the reference bed distribution,
    /// urgency weights, and relocation-tolerance matrix.
    fn default() -> Self {
        const BEDS: [usize; 6] = [55, 40, 30, 20, 20, 0];
        const URGENCY: [f64; 6] = [7.0, 5.0, 2.0, 10.0, 5.0, 0.0];
        const RELOCATION: [[f64; 6]; 6] = [
            [0.00, 0.05, 0.10, 0.05, 0.80, 0.00],
            [0.20, 0.00, 0.50, 0.15, 0.15, 0.00],
            [0.30, 0.20, 0.00, 0.20, 0.30, 0.00],
            [0.35, 0.30, 0.05, 0.00, 0.30, 0.00],
            [0.20, 0.10, 0.60, 0.10, 0.00, 0.00],
            [0.20, 0.20, 0.20, 0.20, 0.20, 0.00],
        ];

        let wards = Disease::ALL
            .iter()
            .enumerate()
            .map(|(row, &disease)| WardConfig {
                disease,
                beds: BEDS[row],
                urgency: URGENCY[row],
                relocation: Disease::ALL
                    .iter()
                    .enumerate()
                    .filter(|&(col, _)| col != row)
                    .map(|(col, &toward)| (toward, RELOCATION[row][col]))
                    .collect(),
            })
            .collect();

        Self {
            wards,
            rng_seed: default_seed(),
        }
    }
}
