use chrono::{DateTime, Utc};

/// Provenance of a plume-height estimate, used by the flux integrator's quality grading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlumeHeightSource {
    Default,
    User,
    GeometryCalculation,
}

impl PlumeHeightSource {
    pub fn rank(&self) -> u8 {
        match self {
            PlumeHeightSource::GeometryCalculation => 0,
            PlumeHeightSource::Default | PlumeHeightSource::User => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlumeHeightSource::Default => "default",
            PlumeHeightSource::User => "user",
            PlumeHeightSource::GeometryCalculation => "geometry_calc",
        }
    }
}

/// A plume altitude estimate with a validity interval.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlumeHeight {
    altitude_masl: f64,
    error: f64,
    source: PlumeHeightSource,
    valid_from: DateTime<Utc>,
    valid_to: DateTime<Utc>,
}

impl PlumeHeight {
    pub fn new(
        altitude_masl: f64,
        error: f64,
        source: PlumeHeightSource,
        valid_from: DateTime<Utc>,
        valid_to: DateTime<Utc>,
    ) -> Self {
        Self {
            altitude_masl,
            error,
            source,
            valid_from,
            valid_to,
        }
    }

    pub fn altitude_masl(&self) -> f64 {
        self.altitude_masl
    }

    pub fn error(&self) -> f64 {
        self.error
    }

    pub fn source(&self) -> PlumeHeightSource {
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
}

/// An append-only, time-indexed store of plume-height estimates.
#[derive(Debug, Clone, Default)]
pub struct PlumeDataBase {
    records: Vec<PlumeHeight>,
}

impl PlumeDataBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, height: PlumeHeight) {
        self.records.push(height);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlumeHeight> {
        self.records.iter()
    }

    pub fn query(&self, time: DateTime<Utc>) -> Option<&PlumeHeight> {
        self.records
            .iter()
            .filter(|r| r.contains(time))
            .min_by_key(|r| r.source().rank())
    }
}
