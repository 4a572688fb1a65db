//!
//! # novac-data
//! Persistence and discovery for the post-processing pipeline's external boundary:
//! the wind- and plume-height database XML format, an instrument-location catalog
//! with overlap validation, and discovery of raw scan files over local directory
//! trees. The raw spectrum binary format itself remains an external collaborator;
//! this crate only exposes the [`RawScanReader`] interface the orchestrator drives
//! it through.
//!

#![forbid(unsafe_code)]
#![warn(clippy::correctness)]
#![allow(clippy::too_many_arguments)]

pub mod discovery;
pub mod location_catalog;
pub mod raw_scan;
pub mod result;
pub mod wind_xml;

pub use location_catalog::LocationCatalog;
pub use raw_scan::{RawScan, RawScanReader};
pub use result::{Error, Result};
