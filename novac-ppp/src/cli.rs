//! Command-line argument parsing (§6). Recognized flags are parsed by `clap`'s derive
//! API; the legacy NOVAC operator scripts that invoke flags as bare `key=value` pairs
//! (no leading dash at all) are supported by rewriting each such argument to
//! `--key=value` before `clap` ever sees it.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;

use novac_process::{Molecule, ProcessingMode};

use crate::result::{Error, Result};

#[derive(Parser, Debug)]
#[command(name = "novac-ppp", about = "Post-processing pipeline for scanning UV spectrometer networks")]
pub struct Cli {
    /// Inclusive UTC start date (YYYY.MM.DD or YYYY-MM-DD).
    #[arg(long)]
    pub fromdate: String,

    /// Inclusive UTC end date (YYYY.MM.DD or YYYY-MM-DD).
    #[arg(long)]
    pub todate: String,

    /// Volcano name, simplified name, or catalog code.
    #[arg(long)]
    pub volcano: String,

    /// Executable directory used for locating `configuration/`.
    #[arg(long)]
    pub workdir: Option<PathBuf>,

    /// Worker pool size, clamped to at least 1.
    #[arg(long)]
    pub maxthreadnum: Option<usize>,

    #[arg(long)]
    pub localdirectory: Option<PathBuf>,
    #[arg(long)]
    pub ftpdirectory: Option<String>,
    #[arg(long)]
    pub ftpusername: Option<String>,
    #[arg(long)]
    pub ftppassword: Option<String>,

    #[arg(long, default_value_t = false)]
    pub includesubdirs_local: bool,
    #[arg(long, default_value_t = false)]
    pub includesubdirs_ftp: bool,
    #[arg(long, default_value_t = false)]
    pub uploadresults: bool,

    #[arg(long)]
    pub outputdirectory: PathBuf,
    #[arg(long)]
    pub tempdirectory: Option<PathBuf>,
    #[arg(long)]
    pub windfieldfile: Option<PathBuf>,

    /// One of flux, composition, stratosphere, troposphere, geometry, dualbeam,
    /// instrument_calibration.
    #[arg(long, default_value = "flux")]
    pub mode: String,

    /// One of SO2, NO2, O3, BrO.
    #[arg(long, default_value = "SO2")]
    pub molecule: String,
}

/// Rewrites legacy bare `key=value` arguments (no dash) into `--key=value`, so both
/// styles parse through the same `clap::Parser`. Arguments that already start with a
/// dash, or that carry no `=`, pass through unchanged.
pub fn normalize_legacy_flags(args: impl Iterator<Item = String>) -> Vec<String> {
    args.map(|arg| {
        if arg.starts_with('-') || !arg.contains('=') {
            arg
        } else {
            format!("--{arg}")
        }
    })
    .collect()
}

pub fn parse_date(flag: &str, value: &str) -> Result<NaiveDate> {
    for format in ["%Y.%m.%d", "%Y-%m-%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Ok(date);
        }
    }
    Err(Error::InvalidArgument { flag: flag.to_string(), reason: format!("unrecognized date format: {value}") })
}

pub fn parse_mode(value: &str) -> Result<ProcessingMode> {
    match value.to_ascii_lowercase().as_str() {
        "flux" => Ok(ProcessingMode::Flux),
        "composition" => Ok(ProcessingMode::Composition),
        "stratosphere" => Ok(ProcessingMode::Stratosphere),
        "troposphere" => Ok(ProcessingMode::Troposphere),
        "geometry" => Ok(ProcessingMode::Geometry),
        "dualbeam" => Ok(ProcessingMode::DualBeam),
        "instrument_calibration" => Ok(ProcessingMode::InstrumentCalibration),
        _ => Err(Error::InvalidArgument { flag: "mode".to_string(), reason: format!("unrecognized mode: {value}") }),
    }
}

pub fn parse_molecule(value: &str) -> Result<Molecule> {
    match value.to_ascii_uppercase().as_str() {
        "SO2" => Ok(Molecule::So2),
        "NO2" => Ok(Molecule::No2),
        "O3" => Ok(Molecule::O3),
        "BRO" => Ok(Molecule::Bro),
        _ => Err(Error::InvalidArgument { flag: "molecule".to_string(), reason: format!("unrecognized molecule: {value}") }),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn normalizes_bare_key_value_pairs() {
        let args = vec!["novac-ppp".to_string(), "fromdate=2024.01.01".to_string(), "--todate=2024.01.31".to_string(), "volcano=Kilauea".to_string()];
        let normalized = normalize_legacy_flags(args.into_iter());
        assert_eq!(normalized, vec!["novac-ppp", "--fromdate=2024.01.01", "--todate=2024.01.31", "--volcano=Kilauea"]);
    }

    #[test]
    fn parses_both_date_formats() {
        assert_eq!(parse_date("fromdate", "2024.06.01").unwrap(), NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(parse_date("fromdate", "2024-06-01").unwrap(), NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
    }

    #[test]
    fn rejects_unrecognized_mode() {
        assert!(parse_mode("bogus").is_err());
    }
}
