use chrono::{DateTime, Utc};

use crate::data::{EvaluationResult, InstrumentType, PlumeInScanProperty};

/// The measurement purpose a scan was recorded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScanMode {
    Flux,
    WindSpeed,
    Composition,
    Stratospheric,
}

/// One evaluated spectrum bound to its viewing angle(s).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanPoint {
    scan_angle: f64,
    azimuth: Option<f64>,
    start_time: DateTime<Utc>,
    stop_time: DateTime<Utc>,
    evaluation: EvaluationResult,
    is_good: bool,
}

impl ScanPoint {
    pub fn new(
        scan_angle: f64,
        azimuth: Option<f64>,
        start_time: DateTime<Utc>,
        stop_time: DateTime<Utc>,
        evaluation: EvaluationResult,
        is_good: bool,
    ) -> Self {
        Self {
            scan_angle,
            azimuth,
            start_time,
            stop_time,
            evaluation,
            is_good,
        }
    }

    pub fn scan_angle(&self) -> f64 {
        self.scan_angle
    }

    pub fn azimuth(&self) -> Option<f64> {
        self.azimuth
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn stop_time(&self) -> DateTime<Utc> {
        self.stop_time
    }

    pub fn evaluation(&self) -> &EvaluationResult {
        &self.evaluation
    }

    /// Whether this point passed both the evaluator's fit-quality judgment and any
    /// scan-level plume-detection exclusion.
    pub fn is_good(&self) -> bool {
        self.is_good
    }
}

/// The complete evaluated result of one scan: its ordered measurement points plus the
/// derived plume properties and provenance needed downstream by geometry and flux.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanResult {
    serial: String,
    instrument_type: InstrumentType,
    mode: ScanMode,
    points: Vec<ScanPoint>,
    plume: PlumeInScanProperty,
    sky_start_time: DateTime<Utc>,
    battery: Option<f64>,
    temperature: Option<f64>,
    evaluation_log_path: Option<String>,
}

impl ScanResult {
    pub fn new(
        serial: impl Into<String>,
        instrument_type: InstrumentType,
        mode: ScanMode,
        points: Vec<ScanPoint>,
        plume: PlumeInScanProperty,
        sky_start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            serial: serial.into(),
            instrument_type,
            mode,
            points,
            plume,
            sky_start_time,
            battery: None,
            temperature: None,
            evaluation_log_path: None,
        }
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn instrument_type(&self) -> InstrumentType {
        self.instrument_type
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    pub fn points(&self) -> &[ScanPoint] {
        &self.points
    }

    pub fn plume(&self) -> &PlumeInScanProperty {
        &self.plume
    }

    pub fn set_plume(&mut self, plume: PlumeInScanProperty) {
        self.plume = plume;
    }

    pub fn sky_start_time(&self) -> DateTime<Utc> {
        self.sky_start_time
    }

    pub fn battery(&self) -> Option<f64> {
        self.battery
    }

    pub fn set_battery(&mut self, battery: f64) {
        self.battery = Some(battery);
    }

    pub fn temperature(&self) -> Option<f64> {
        self.temperature
    }

    pub fn set_temperature(&mut self, temperature: f64) {
        self.temperature = Some(temperature);
    }

    pub fn evaluation_log_path(&self) -> Option<&str> {
        self.evaluation_log_path.as_deref()
    }

    pub fn set_evaluation_log_path(&mut self, path: impl Into<String>) {
        self.evaluation_log_path = Some(path.into());
    }

    /// Number of points that passed quality judgment.
    pub fn good_point_count(&self) -> usize {
        self.points.iter().filter(|p| p.is_good()).count()
    }

    /// Columns for the given reference index across all points, paired with an
    /// `is_good` flag, in scan order. Used by the plume analyzer and flux integrator.
    pub fn column_series(&self, reference_index: usize) -> Vec<(f64, f64, bool)> {
        self.points
            .iter()
            .filter_map(|p| {
                p.evaluation()
                    .reference_result(reference_index)
                    .map(|r| (r.column, r.column_error, p.is_good()))
            })
            .collect()
    }
}
