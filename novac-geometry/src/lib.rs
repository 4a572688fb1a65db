//!
//! # novac-geometry
//! Reconstructs plume altitude and wind direction from one or two scanning instruments'
//! lines of sight: GPS distance/bearing math, line-of-sight projection, a damped-Newton
//! two-scan solver, a direct two-scan ray-intersection solver, single-instrument modes for
//! when either the wind direction or the plume altitude is already known, and a
//! perturbation-based error model for all of them.
//!

#![forbid(unsafe_code)]
#![warn(clippy::correctness)]
#![allow(clippy::too_many_arguments)]

pub mod error_model;
pub mod gps;
pub mod los;
pub mod result;
pub mod single_instrument;
pub mod two_scan;

pub use result::{Error, Result};
