//!
//! Contains the Result and Error types for novac-scan operations.
//!

use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("DOAS evaluation failed for spectrum at scan angle {scan_angle}: {source}")]
    EvaluationFailed { scan_angle: f64, source: novac_doas::Error },

    #[error("scan has no measurement spectra to evaluate")]
    EmptyScan,

    #[error("evaluation log IO error")]
    LogIo(#[from] std::io::Error),

    #[error("evaluation log parse error: {0}")]
    LogParse(String),
}
