//! Core building blocks for the Hark transcript compliance engine.
//!
//! This crate carries everything the other workspace members share: the
//! domain model (rules, reference records, entity bags, violations), the
//! per-subsystem error enums, layered configuration, the event dispatcher,
//! capability traits for pluggable collaborators, and the numeric constants
//! that pin evaluation behavior.

pub mod config;
pub mod constants;
pub mod errors;
pub mod events;
pub mod logging;
pub mod traits;
pub mod types;
