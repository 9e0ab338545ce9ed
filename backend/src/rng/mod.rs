//! Deterministic random number generation.
//!
//! Bed selection among free slots is uniform-random, and it is the only
//! randomness in the engine. Routing it through a seeded generator keeps
//! replay deterministic: same seed + same log = same bed placement, which is
//! what makes rewind-and-replay bit-for-bit reproducible.

mod xorshift;

pub use xorshift::RngManager;
