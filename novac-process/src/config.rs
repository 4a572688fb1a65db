//! The merged run configuration (§10.4): hardcoded defaults, overridden by an optional
//! configuration file pair, finally overridden by CLI flags. The result is an
//! immutable [`Config`] built once at startup and shared by reference across the
//! worker pool, replacing the original tool's `g_setup`/`g_userSettings` singletons
//! (§9's cyclic-graph-elimination guidance).

use std::path::PathBuf;

use chrono::NaiveDate;

/// The gas species a run's fit windows target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Molecule {
    So2,
    No2,
    O3,
    Bro,
}

impl Default for Molecule {
    fn default() -> Self {
        Molecule::So2
    }
}

/// The top-level processing mode selected by `--mode` (§6). `Flux` runs the complete
/// pipeline through mass-flux integration; `Geometry` stops after the geometry engine;
/// the remaining modes evaluate and log scans without attempting geometry or flux,
/// since no further algorithm beyond per-spectrum evaluation applies to them
/// (see DESIGN.md).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingMode {
    Flux,
    Composition,
    Stratosphere,
    Troposphere,
    Geometry,
    DualBeam,
    InstrumentCalibration,
}

impl Default for ProcessingMode {
    fn default() -> Self {
        ProcessingMode::Flux
    }
}

/// Default minimum completeness below which a scan is rejected before flux
/// integration is attempted at all (§4.5).
pub const DEFAULT_COMPLETENESS_LIMIT: f64 = 0.9;
/// Default minimum completeness required of both scans before they are considered as
/// a geometry pair (§4.6).
pub const DEFAULT_GEOMETRY_COMPLETENESS_LIMIT: f64 = 0.7;
/// Default minimum baseline, in meters, between two instruments considered for a
/// geometry pair (§4.6).
pub const DEFAULT_MIN_INSTRUMENT_DISTANCE_M: f64 = 200.0;
/// Default maximum baseline, in meters, between two instruments considered for a
/// geometry pair (§4.6).
pub const DEFAULT_MAX_INSTRUMENT_DISTANCE_M: f64 = 10_000.0;
/// Default maximum start-time separation, in seconds, between two scans considered for
/// a geometry pair (§4.6).
pub const DEFAULT_MAX_START_TIME_DIFF_S: i64 = 900;
/// Default acceptance ceiling, in meters, above which a plume-altitude error estimate
/// is treated as too unreliable to grade green (tunable per §9's open questions).
pub const DEFAULT_MAX_PLUME_ALTITUDE_ERROR_M: f64 = 500.0;
/// Default acceptance ceiling, in degrees, above which a wind-direction error estimate
/// is treated as too unreliable to grade green.
pub const DEFAULT_MAX_WIND_DIRECTION_ERROR_DEG: f64 = 10.0;

/// The complete, merged configuration for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub volcano: String,
    pub mode: ProcessingMode,
    pub molecule: Molecule,

    pub max_thread_num: usize,

    pub local_directory: Option<PathBuf>,
    pub include_subdirs_local: bool,
    pub ftp_directory: Option<String>,
    pub ftp_username: Option<String>,
    pub ftp_password: Option<String>,
    pub include_subdirs_ftp: bool,
    pub upload_results: bool,

    pub output_directory: PathBuf,
    pub temp_directory: Option<PathBuf>,
    pub wind_field_file: Option<PathBuf>,

    pub completeness_limit: f64,
    pub geometry_completeness_limit: f64,
    pub min_instrument_distance_m: f64,
    pub max_instrument_distance_m: f64,
    pub max_start_time_diff_s: i64,
    pub max_plume_altitude_error_m: f64,
    pub max_wind_direction_error_deg: f64,

    /// The fit window and reference index whose evaluation drives plume detection and
    /// flux integration for this run's molecule.
    pub main_window_index: usize,
    pub main_reference_index: usize,
}

impl Config {
    /// Hardcoded defaults, layer (a) of §10.4, before any file or CLI override is
    /// applied. Callers fill in the run-specific fields (`from_date`, `to_date`,
    /// `volcano`, `output_directory`) that have no sensible default.
    pub fn defaults(from_date: NaiveDate, to_date: NaiveDate, volcano: impl Into<String>, output_directory: PathBuf) -> Self {
        Self {
            from_date,
            to_date,
            volcano: volcano.into(),
            mode: ProcessingMode::default(),
            molecule: Molecule::default(),
            max_thread_num: std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
            local_directory: None,
            include_subdirs_local: false,
            ftp_directory: None,
            ftp_username: None,
            ftp_password: None,
            include_subdirs_ftp: false,
            upload_results: false,
            output_directory,
            temp_directory: None,
            wind_field_file: None,
            completeness_limit: DEFAULT_COMPLETENESS_LIMIT,
            geometry_completeness_limit: DEFAULT_GEOMETRY_COMPLETENESS_LIMIT,
            min_instrument_distance_m: DEFAULT_MIN_INSTRUMENT_DISTANCE_M,
            max_instrument_distance_m: DEFAULT_MAX_INSTRUMENT_DISTANCE_M,
            max_start_time_diff_s: DEFAULT_MAX_START_TIME_DIFF_S,
            max_plume_altitude_error_m: DEFAULT_MAX_PLUME_ALTITUDE_ERROR_M,
            max_wind_direction_error_deg: DEFAULT_MAX_WIND_DIRECTION_ERROR_DEG,
            main_window_index: 0,
            main_reference_index: 0,
        }
    }

    /// Clamp the configured worker pool size to at least one thread (§6's
    /// `maxthreadnum` flag).
    pub fn clamped_thread_num(&self) -> usize {
        self.max_thread_num.max(1)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults_clamp_thread_num_to_at_least_one() {
        let mut config = Config::defaults(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            "Kilauea",
            PathBuf::from("/tmp/out"),
        );
        config.max_thread_num = 0;
        assert_eq!(config.clamped_thread_num(), 1);
    }
}
