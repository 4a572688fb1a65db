//!
//! Contains the Result and Error types for novac-data operations.
//!

use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("instrument location validity intervals overlap for serial {serial}")]
    OverlappingValidityInterval { serial: String },

    #[error("IO error reading {path}: {source}")]
    Io { path: String, #[source] source: std::io::Error },

    #[error("wind XML parse error: {0}")]
    WindXmlParse(String),

    #[error("raw scan file {path} could not be read: {reason}")]
    RawScanUnreadable { path: String, reason: String },
}
