//!
//! Contains the Result and Error types for novac-process operations.
//!

use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can terminate a run outright (§7 categories 1 and 5: configuration and
/// programmer errors). Everything else — per-file IO failures, per-scan data-quality
/// rejections, per-spectrum numerical failures — is caught at scan granularity and
/// recorded as a [`crate::statistics::ProcessingStatistics`] count instead of
/// propagated here.
#[derive(ThisError, Debug)]
pub enum Error {
    #[error("unknown volcano: {query}")]
    UnknownVolcano { query: String },

    #[error("output directory {path} is not writable: {source}")]
    OutputDirectoryUnwritable { path: String, #[source] source: std::io::Error },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("wind database error: {0}")]
    WindDatabase(#[from] novac_data::Error),

    #[error("no instrument locations are configured")]
    NoInstrumentLocations,
}
