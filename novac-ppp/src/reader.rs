//! A JSON-encoded stand-in for the raw spectrum file reader, an external collaborator
//! whose real on-disk binary format is out of scope. This reader exists so the
//! pipeline can run end to end against fixture scans shaped like [`RawScan`], without
//! this crate inventing and owning a competing binary format.

use std::path::Path;

use serde::Deserialize;

use novac_data::{Error, RawScan, RawScanReader, Result};
use novac_model::data::{InstrumentType, ScanMode, Spectrum};

#[derive(Deserialize)]
struct RawScanDocument {
    serial: String,
    instrument_type: InstrumentType,
    mode: ScanMode,
    sky: Spectrum,
    dark: Spectrum,
    offset: Option<Spectrum>,
    dark_current: Option<Spectrum>,
    measurements: Vec<Spectrum>,
    battery: Option<f64>,
    temperature: Option<f64>,
}

/// Reads one scan per invocation from a JSON document at the given path.
pub struct JsonRawScanReader;

impl RawScanReader for JsonRawScanReader {
    fn read_scan(&self, path: &Path) -> Result<RawScan> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io { path: path.display().to_string(), source })?;
        let doc: RawScanDocument =
            serde_json::from_str(&text).map_err(|err| Error::RawScanUnreadable { path: path.display().to_string(), reason: err.to_string() })?;

        Ok(RawScan {
            serial: doc.serial,
            instrument_type: doc.instrument_type,
            mode: doc.mode,
            sky: doc.sky,
            dark: doc.dark,
            offset: doc.offset,
            dark_current: doc.dark_current,
            measurements: doc.measurements,
            battery: doc.battery,
            temperature: doc.temperature,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rejects_malformed_document() {
        let path = std::env::temp_dir().join(format!("novac-ppp-rawscan-bad-{}.json", std::process::id()));
        std::fs::write(&path, b"not json").unwrap();

        let reader = JsonRawScanReader;
        assert!(reader.read_scan(&path).is_err());

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn reports_io_error_for_missing_file() {
        let reader = JsonRawScanReader;
        let missing = std::env::temp_dir().join("novac-ppp-rawscan-does-not-exist.json");
        assert!(reader.read_scan(&missing).is_err());
    }
}
