//! Per-subcommand orchestration: argument types and command bodies.
//!
//! Every command resolves to a single `serde_json::Value` printed to
//! stdout by `main`. State mutations go through the store; network
//! work goes through the provider traits.

pub mod bet;
pub mod calc;
pub mod config;
pub mod journal;
pub mod narrative;
pub mod review;
pub mod scan;
pub mod watch;
