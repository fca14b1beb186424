//! Pure position-sizing calculators.
//!
//! Deterministic, side-effect-free functions: invalid inputs come back
//! as explicit `Err` results, never panics.

pub mod kelly;
pub mod sizing;
