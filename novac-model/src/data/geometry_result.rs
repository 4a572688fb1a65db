use chrono::{DateTime, Utc};

/// The outcome of combining one or two scans' plume geometry: a reconstructed plume
/// altitude, wind direction, or both, along with perturbation-based error estimates.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeometryResult {
    altitude_masl: Option<f64>,
    altitude_error: Option<f64>,
    wind_direction: Option<f64>,
    wind_direction_error: Option<f64>,
    time: DateTime<Utc>,
    serials: (String, Option<String>),
}

impl GeometryResult {
    pub fn new(
        altitude_masl: Option<f64>,
        altitude_error: Option<f64>,
        wind_direction: Option<f64>,
        wind_direction_error: Option<f64>,
        time: DateTime<Utc>,
        serials: (String, Option<String>),
    ) -> Self {
        Self {
            altitude_masl,
            altitude_error,
            wind_direction,
            wind_direction_error,
            time,
            serials,
        }
    }

    pub fn altitude_masl(&self) -> Option<f64> {
        self.altitude_masl
    }

    pub fn altitude_error(&self) -> Option<f64> {
        self.altitude_error
    }

    pub fn wind_direction(&self) -> Option<f64> {
        self.wind_direction
    }

    pub fn wind_direction_error(&self) -> Option<f64> {
        self.wind_direction_error
    }

    /// The averaged start time of the contributing scan(s).
    pub fn time(&self) -> DateTime<Utc> {
        self.time
    }

    /// The contributing instrument serial(s); the second is `None` for single-instrument
    /// geometry.
    pub fn serials(&self) -> &(String, Option<String>) {
        &self.serials
    }

    pub fn is_two_instrument(&self) -> bool {
        self.serials.1.is_some()
    }

    /// Attach perturbation-based error estimates computed after the fix itself, since
    /// the four-corner perturbation solve needs the unperturbed result as its baseline.
    pub fn with_errors(mut self, altitude_error: Option<f64>, wind_direction_error: Option<f64>) -> Self {
        self.altitude_error = altitude_error;
        self.wind_direction_error = wind_direction_error;
        self
    }
}
