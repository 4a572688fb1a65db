//! The interface boundary to the raw spectrum file reader: an external collaborator
//! that exposes a recorded scan as typed [`Spectrum`] values (§1, §3). This crate
//! never parses the on-disk binary format itself; it only defines the shape the
//! orchestrator consumes and the trait a concrete reader implements.

use std::path::Path;

use novac_model::data::{InstrumentType, ScanMode, Spectrum};

use crate::result::Result;

/// One scan as handed to the evaluator: the sky and dark references, optional
/// offset/dark-current spectra, and the ordered measurement series, plus the
/// instrument and mode metadata the scan evaluator needs but which the raw format
/// stores alongside the spectra rather than in the measurements themselves.
#[derive(Debug, Clone)]
pub struct RawScan {
    pub serial: String,
    pub instrument_type: InstrumentType,
    pub mode: ScanMode,
    pub sky: Spectrum,
    pub dark: Spectrum,
    pub offset: Option<Spectrum>,
    pub dark_current: Option<Spectrum>,
    pub measurements: Vec<Spectrum>,
    pub battery: Option<f64>,
    pub temperature: Option<f64>,
}

/// Reads one raw scan recording from disk. Implementations live outside this crate's
/// scope (§1 lists the raw-spectrum reader as an external collaborator with a given
/// binary format); this trait is the seam the orchestrator drives it through, letting
/// tests substitute an in-memory fixture without touching any real file format.
pub trait RawScanReader: Send + Sync {
    fn read_scan(&self, path: &Path) -> Result<RawScan>;
}
