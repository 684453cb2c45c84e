//! Observability: log subscriber setup for the binary.
//!
//! The library itself logs through [`crate::retention::SweepLog`]; this module
//! only installs the global `tracing` subscriber that [`crate::retention::TracingLog`]
//! writes to.

mod tracing_init;

pub use tracing_init::*;
