use chrono::{DateTime, Utc};

/// Provenance of a wind measurement or forecast, used both for record keeping and for
/// the flux integrator's quality grading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WindSource {
    Default,
    User,
    EcmwfForecast,
    EcmwfAnalysis,
    DualBeam,
    Wrf,
    NoaaGdas,
    NoaaFnl,
    GeometryCalculation,
    GeometryCalculationSingleInstrument,
}

impl WindSource {
    /// Lower is better; used to break ties when two database records cover the same
    /// instant.
    pub fn rank(&self) -> u8 {
        match self {
            WindSource::EcmwfForecast
            | WindSource::EcmwfAnalysis
            | WindSource::DualBeam
            | WindSource::Wrf
            | WindSource::NoaaGdas
            | WindSource::NoaaFnl => 0,
            WindSource::GeometryCalculation | WindSource::GeometryCalculationSingleInstrument => 1,
            WindSource::Default | WindSource::User => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WindSource::Default => "default",
            WindSource::User => "user",
            WindSource::EcmwfForecast => "ecmwf_forecast",
            WindSource::EcmwfAnalysis => "ecmwf_analysis",
            WindSource::DualBeam => "dual_beam",
            WindSource::Wrf => "wrf",
            WindSource::NoaaGdas => "noaa_gdas",
            WindSource::NoaaFnl => "noaa_fnl",
            WindSource::GeometryCalculation => "geometry_calc",
            WindSource::GeometryCalculationSingleInstrument => "geometry_calc_single_instr",
        }
    }
}

/// A wind speed and direction measurement or forecast, optionally tied to a validity
/// interval and geographic point.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindField {
    speed_ms: f64,
    speed_error: f64,
    direction_deg: f64,
    direction_error: f64,
    source: WindSource,
    valid_from: DateTime<Utc>,
    valid_to: DateTime<Utc>,
    point: Option<(f64, f64, f64)>,
}

impl WindField {
    pub fn new(
        speed_ms: f64,
        speed_error: f64,
        direction_deg: f64,
        direction_error: f64,
        source: WindSource,
        valid_from: DateTime<Utc>,
        valid_to: DateTime<Utc>,
    ) -> Self {
        Self {
            speed_ms,
            speed_error,
            direction_deg: normalize_bearing(direction_deg),
            direction_error,
            source,
            valid_from,
            valid_to,
            point: None,
        }
    }

    pub fn with_point(mut self, latitude: f64, longitude: f64, altitude_masl: f64) -> Self {
        self.point = Some((normalize_latitude(latitude), normalize_longitude(longitude), altitude_masl));
        self
    }

    pub fn speed_ms(&self) -> f64 {
        self.speed_ms
    }

    pub fn speed_error(&self) -> f64 {
        self.speed_error
    }

    pub fn direction_deg(&self) -> f64 {
        self.direction_deg
    }

    pub fn direction_error(&self) -> f64 {
        self.direction_error
    }

    pub fn source(&self) -> WindSource {
        self.source
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

    pub fn point(&self) -> Option<(f64, f64, f64)> {
        self.point
    }
}

/// Clamp a latitude into `[-90, 90]`, matching the wind-XML reader's tolerant parsing
/// of out-of-range values: out-of-range latitudes wrap modulo 90, not by reflection
/// about the pole (so 95 degrees becomes 5, not 85).
pub fn normalize_latitude(lat: f64) -> f64 {
    if lat.abs() <= 90.0 {
        lat
    } else {
        lat % 90.0
    }
}

/// Wrap a longitude into `[-180, 180]`.
pub fn normalize_longitude(mut lon: f64) -> f64 {
    while lon > 180.0 {
        lon -= 360.0;
    }
    while lon < -180.0 {
        lon += 360.0;
    }
    lon
}

/// Wrap a compass bearing into `[0, 360)`.
pub fn normalize_bearing(mut deg: f64) -> f64 {
    deg %= 360.0;
    if deg < 0.0 {
        deg += 360.0;
    }
    deg
}

/// An append-only, time-indexed store of wind measurements, queried by the instant a
/// scan was taken. Mutation is confined to the orchestrator thread; see the
/// concurrency model this crate's consumers implement.
#[derive(Debug, Clone, Default)]
pub struct WindDataBase {
    records: Vec<WindField>,
}

impl WindDataBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: WindField) {
        self.records.push(field);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WindField> {
        self.records.iter()
    }

    /// The best record whose validity interval contains `time`. When multiple records
    /// match, the one with the lowest (best) source rank wins.
    pub fn query(&self, time: DateTime<Utc>) -> Option<&WindField> {
        self.records
            .iter()
            .filter(|r| r.contains(time))
            .min_by_key(|r| r.source().rank())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn query_prefers_better_ranked_source_on_overlap() {
        let mut db = WindDataBase::new();
        db.insert(WindField::new(5.0, 1.0, 90.0, 5.0, WindSource::Default, at(0), at(12)));
        db.insert(WindField::new(6.0, 0.5, 95.0, 2.0, WindSource::EcmwfForecast, at(0), at(12)));

        let result = db.query(at(6)).unwrap();
        assert_eq!(result.source(), WindSource::EcmwfForecast);
    }

    #[test]
    fn query_outside_validity_returns_none() {
        let mut db = WindDataBase::new();
        db.insert(WindField::new(5.0, 1.0, 90.0, 5.0, WindSource::Default, at(0), at(12)));
        assert!(db.query(at(23)).is_none());
    }

    #[test]
    fn bearing_wraps_into_0_360() {
        assert_eq!(normalize_bearing(-10.0), 350.0);
        assert_eq!(normalize_bearing(370.0), 10.0);
    }

    #[test]
    fn latitude_wraps_modulo_90_out_of_range() {
        assert!((normalize_latitude(95.0) - 5.0).abs() < 1e-9);
    }
}
