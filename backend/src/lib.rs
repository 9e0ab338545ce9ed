//! Hospital Occupancy Replay Engine
//!
//! Reconstructs the occupancy state of a multi-ward facility at any requested
//! simulated time from a time-ordered log of patient admission, discharge,
//! and rejection events, and accumulates service-quality metrics
//! (urgency-weighted loss, ward acceptance) as a byproduct of the replay.
//!
//! # Architecture
//!
//! - **models**: domain types (Disease, EventRecord, Patient, Bed, Ward)
//! - **hospital**: the aggregate that applies one event at a time
//! - **metrics**: append-only urgency/acceptance histories and counters
//! - **simulator**: the replay driver (`load`, `advance`, `reset`)
//! - **loader**: event-log ingestion (line format and JSON event history)
//! - **config**: explicit ward/policy configuration with reference defaults
//! - **rng**: deterministic random number generation
//!
//! # Critical Invariants
//!
//! 1. Occupied beds never exceed ward capacity
//! 2. Roster membership and bed back-references stay mutually consistent
//! 3. Replay is idempotent and deterministic (seeded RNG)

// Module declarations
pub mod config;
pub mod hospital;
pub mod loader;
pub mod metrics;
pub mod models;
pub mod rng;
pub mod simulator;

// Re-exports for convenience
pub use config::{ConfigError, HospitalConfig, WardConfig};
pub use hospital::{Hospital, HospitalError, WardStatus};
pub use loader::{parse_event_history, parse_log_lines, ParseError};
pub use metrics::{AcceptanceSample, MetricsAccumulator, UrgencySample};
pub use models::{
    bed::{Bed, BedPool, BedPoolError},
    disease::{Disease, UnknownDisease},
    event::{EventKind, EventLog, EventRecord},
    patient::{BedRef, Patient},
    ward::Ward,
};
pub use rng::RngManager;
pub use simulator::{
    AdvanceReport, LoadError, ParameterSet, ReplayAnomaly, Simulator,
};
