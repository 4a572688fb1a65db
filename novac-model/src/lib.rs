//!
//! # novac-model
//! A common model for representing the inputs and outputs of the NOVAC post-processing
//! pipeline: spectra, reference cross sections, DOAS evaluation results, scan-level plume
//! properties, instrument and volcano metadata, wind and plume-height databases, and the
//! geometry and flux results derived from them.
//!
//! A number of optional features are available:
//! - `serde`: Implement `serde::Serialize` and `serde::Deserialize` for all models.
//!

#![forbid(unsafe_code)]
#![warn(clippy::correctness)]
#![allow(clippy::too_many_arguments)]

pub mod data;
pub mod meta;
pub mod result;

pub use result::{Error, Result};
