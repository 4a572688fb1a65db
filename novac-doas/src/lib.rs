//!
//! # novac-doas
//! The DOAS (Differential Optical Absorption Spectroscopy) spectral evaluator. Given a
//! sky spectrum, a measured spectrum, and a configured fit window, solves for each
//! reference's column density, spectral shift, and squeeze by nonlinear least squares,
//! with the per-reference amplitudes and polynomial background solved by an inner
//! linear least-squares step at every outer iteration.
//!
//! The `solar_shift` module implements the fixed-column solar-registration fit used to
//! derive a per-instrument shift/squeeze correction ahead of normal evaluation.
//!

#![forbid(unsafe_code)]
#![warn(clippy::correctness)]
#![allow(clippy::too_many_arguments)]

pub mod precondition;
pub mod result;
pub mod solar_shift;
pub mod solver;
pub mod spline;

mod evaluate;
pub use evaluate::evaluate;

pub use result::{Error, Result};
