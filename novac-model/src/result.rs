//!
//! Contains the Result and Error types for novac-model operations.
//!

use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("fit window expects {expected} references but evaluation result has {actual}")]
    ReferenceCountMismatch { expected: usize, actual: usize },

    #[error("instrument location validity intervals overlap for serial {serial}")]
    OverlappingValidityInterval { serial: String },

    #[error("plume-in-scan property requested on a scan with no detected plume")]
    NoPlumeDetected,
}
