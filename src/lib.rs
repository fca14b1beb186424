//! PROSPECTOR: on-chain token discovery, position sizing, and a
//! persistent trade journal, packaged as a JSON-emitting CLI for an
//! agent runtime to invoke.

pub mod commands;
pub mod config;
pub mod engine;
pub mod journal;
pub mod providers;
pub mod store;
pub mod strategy;
pub mod types;
