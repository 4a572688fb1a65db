//!
//! # novac-process
//! The bounded-concurrency orchestrator: discovers scan recordings, dispatches them
//! across a fixed worker pool for DOAS evaluation and plume detection, sweeps results
//! for geometry pairs, integrates flux, and persists every run output — evaluation
//! logs, flux logs, the geometry log, run statistics, and the wind database — under
//! the configured output directory.
//!

#![forbid(unsafe_code)]
#![warn(clippy::correctness)]
#![allow(clippy::too_many_arguments)]

pub mod config;
pub mod continuation;
pub mod flux_log;
pub mod orchestrator;
pub mod pairing;
pub mod result;
pub mod statistics;

pub use config::{Config, Molecule, ProcessingMode};
pub use orchestrator::Orchestrator;
pub use result::{Error, Result};
pub use statistics::{ProcessingStatistics, RejectionReason};
