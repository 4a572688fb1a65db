//!
//! # novac-scan
//! Drives the DOAS evaluator ([`novac_doas`]) across every spectrum of a recorded scan,
//! derives plume position and shape from the resulting column-vs-angle series, and
//! reads and writes the canonical evaluation-log file format.
//!

#![forbid(unsafe_code)]
#![warn(clippy::correctness)]
#![allow(clippy::too_many_arguments)]

pub mod evaluator;
pub mod evaluation_log;
pub mod plume;
pub mod result;

pub use result::{Error, Result};
