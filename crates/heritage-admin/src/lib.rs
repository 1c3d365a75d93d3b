//! Core library for the cultural-heritage platform admin backend.
//!
//! The interesting machinery lives in [`workflows::contributors`]: the
//! contributor lifecycle state machine, the search/pagination engine, the
//! per-status tally, and the workflow service that ties them to a store.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
