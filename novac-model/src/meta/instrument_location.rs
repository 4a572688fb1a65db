use chrono::{DateTime, Utc};

use crate::data::InstrumentType;

/// A scanning instrument's placement and configuration, valid over `[valid_from,
/// valid_to)`. An instrument may be relocated or reconfigured over its lifetime, each
/// producing a new, non-overlapping `InstrumentLocation`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstrumentLocation {
    serial: String,
    valid_from: DateTime<Utc>,
    valid_to: DateTime<Utc>,
    latitude: f64,
    longitude: f64,
    altitude_masl: f64,
    compass: f64,
    /// Half-angle of the scan cone in degrees; 90.0 denotes a flat scanner.
    cone_angle: f64,
    tilt: f64,
    instrument_type: InstrumentType,
    volcano: String,
}

impl InstrumentLocation {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        serial: impl Into<String>,
        valid_from: DateTime<Utc>,
        valid_to: DateTime<Utc>,
        latitude: f64,
        longitude: f64,
        altitude_masl: f64,
        compass: f64,
        cone_angle: f64,
        tilt: f64,
        instrument_type: InstrumentType,
        volcano: impl Into<String>,
    ) -> Self {
        Self {
            serial: serial.into(),
            valid_from,
            valid_to,
            latitude,
            longitude,
            altitude_masl,
            compass,
            cone_angle,
            tilt,
            instrument_type,
            volcano: volcano.into(),
        }
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn valid_from(&self) -> DateTime<Utc> {
        self.valid_from
    }

    pub fn valid_to(&self) -> DateTime<Utc> {
        self.valid_to
    }

    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        time >= self.valid_from && time < self.valid_to
    }

    /// Whether this location's validity interval overlaps another's. Instrument
    /// locations for the same serial must never overlap.
    pub fn overlaps(&self, other: &InstrumentLocation) -> bool {
        self.valid_from < other.valid_to && other.valid_from < self.valid_to
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn altitude_masl(&self) -> f64 {
        self.altitude_masl
    }

    pub fn compass(&self) -> f64 {
        self.compass
    }

    pub fn cone_angle(&self) -> f64 {
        self.cone_angle
    }

    /// Whether this is a flat (non-conical) scanner.
    pub fn is_flat_scanner(&self) -> bool {
        (self.cone_angle - 90.0).abs() < 0.5
    }

    pub fn tilt(&self) -> f64 {
        self.tilt
    }

    pub fn instrument_type(&self) -> InstrumentType {
        self.instrument_type
    }

    pub fn volcano(&self) -> &str {
        &self.volcano
    }
}
