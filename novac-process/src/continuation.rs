//! Continuation detection (§5): rerunning the pipeline against the same output
//! directory with an unchanged configuration should skip re-evaluating scans whose
//! log already exists, rather than overwrite them. The orchestrator byte-matches the
//! previous run's `setup.xml`/`processing.xml` copies against the current
//! configuration snapshot to decide whether it is safe to reuse existing logs.

use std::fs;
use std::path::{Path, PathBuf};

use crate::result::{Error, Result};

/// Whether the current run may treat existing evaluation logs as already valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContinuationState {
    pub is_continuation: bool,
}

/// Compares the current configuration snapshot against whatever `setup.xml` and
/// `processing.xml` copies are already archived in `{output_directory}/configuration/`.
/// A byte-for-byte match on both files means the previous run used identical settings,
/// so its logs may be reused; any difference — including either file being absent —
/// means every scan must be re-evaluated.
pub fn detect(output_directory: &Path, current_setup_xml: &[u8], current_processing_xml: &[u8]) -> Result<ContinuationState> {
    let config_dir = output_directory.join("configuration");
    let setup_path = config_dir.join("setup.xml");
    let processing_path = config_dir.join("processing.xml");

    let is_continuation = match (read_if_exists(&setup_path)?, read_if_exists(&processing_path)?) {
        (Some(setup), Some(processing)) => setup == current_setup_xml && processing == current_processing_xml,
        _ => false,
    };

    Ok(ContinuationState { is_continuation })
}

/// Writes the current configuration snapshot into `{output_directory}/configuration/`,
/// so the next run can detect continuation against it.
pub fn persist(output_directory: &Path, setup_xml: &[u8], processing_xml: &[u8]) -> Result<()> {
    let config_dir = output_directory.join("configuration");
    fs::create_dir_all(&config_dir).map_err(|source| Error::OutputDirectoryUnwritable { path: config_dir.display().to_string(), source })?;
    fs::write(config_dir.join("setup.xml"), setup_xml).map_err(|source| Error::OutputDirectoryUnwritable { path: config_dir.display().to_string(), source })?;
    fs::write(config_dir.join("processing.xml"), processing_xml).map_err(|source| Error::OutputDirectoryUnwritable { path: config_dir.display().to_string(), source })
}

fn read_if_exists(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(Error::OutputDirectoryUnwritable { path: path.display().to_string(), source }),
    }
}

/// The evaluation-log path a given serial/date would be written to, used both to
/// write new logs and, under continuation, to check for an existing one.
pub fn evaluation_log_path(output_directory: &Path, serial: &str, date: &str) -> PathBuf {
    output_directory.join(serial).join(format!("{date}.txt"))
}

/// Whether an evaluation log already exists at the given path and may be reused
/// instead of re-evaluating the scan, per the continuation flag.
pub fn has_existing_log(state: ContinuationState, path: &Path) -> bool {
    state.is_continuation && path.is_file()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn detects_continuation_when_bytes_match() {
        let dir = std::env::temp_dir().join(format!("novac-continuation-test-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        persist(&dir, b"<setup/>", b"<processing/>").unwrap();

        let state = detect(&dir, b"<setup/>", b"<processing/>").unwrap();
        assert!(state.is_continuation);

        let state = detect(&dir, b"<setup/>", b"<processing changed=\"1\"/>").unwrap();
        assert!(!state.is_continuation);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_configuration_is_not_a_continuation() {
        let dir = std::env::temp_dir().join(format!("novac-continuation-missing-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);

        let state = detect(&dir, b"<setup/>", b"<processing/>").unwrap();
        assert!(!state.is_continuation);
    }
}
