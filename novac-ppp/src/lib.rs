#![forbid(unsafe_code)]
#![warn(clippy::correctness)]

//!
//! # novac-ppp
//! The command-line binary that drives the post-processing pipeline: parses CLI
//! arguments and an optional bootstrap document into a [`novac_process::Config`] and
//! its catalogs, then hands them to [`novac_process::Orchestrator`].
//!

pub mod bootstrap;
pub mod cli;
pub mod reader;
pub mod result;

pub use result::{Error, Result};
