//!
//! Contains the Result and Error types for novac-flux operations.
//!

use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("scan has no detected plume; cannot compute flux")]
    NoPlumeDetected,

    #[error("scan completeness {completeness:.2} is below the configured limit of {limit:.2}")]
    BelowCompletenessLimit { completeness: f64, limit: f64 },

    #[error("plume altitude is at or below the instrument's own altitude")]
    NonPositivePlumeHeight,

    #[error("reference index {index} is out of range for this scan's evaluations")]
    MissingReference { index: usize },
}
