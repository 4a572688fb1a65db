//!
//! Unified error type for the `novac-ppp` binary.
//!
//! Consolidates errors from every sub-crate into a single surface so `main` has one
//! `?`-friendly error to report and map onto a process exit code. Each variant wraps
//! the sub-crate's own error type, preserving its source chain.
//!

use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type covering the whole pipeline, from CLI parsing through run
/// persistence.
#[derive(ThisError, Debug)]
pub enum Error {
    #[error("data error: {0}")]
    Data(#[from] novac_data::Error),

    #[error("process error: {0}")]
    Process(#[from] novac_process::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid CLI argument {flag}: {reason}")]
    InvalidArgument { flag: String, reason: String },
}
