/// Aggregate quality grade for a flux result, the worst of its three sub-grades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FluxQuality {
    Green,
    Yellow,
    Red,
}

/// A computed gas flux for one scan, with the provenance needed to reconstruct why it
/// received its quality grade.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FluxResult {
    flux_kg_s: f64,
    wind_error_component: f64,
    plume_height_error_component: f64,
    quality: FluxQuality,
    wind_speed: f64,
    wind_speed_error: f64,
    wind_source: String,
    wind_direction: f64,
    wind_direction_error: f64,
    plume_altitude_masl: f64,
    plume_altitude_error: f64,
    plume_height_source: String,
    compass: f64,
    cone_angle: f64,
    tilt: f64,
    good_spectrum_count: usize,
    plume_centre: [f64; 2],
    completeness: f64,
    offset: f64,
}

impl FluxResult {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        flux_kg_s: f64,
        wind_error_component: f64,
        plume_height_error_component: f64,
        quality: FluxQuality,
        wind_speed: f64,
        wind_speed_error: f64,
        wind_source: impl Into<String>,
        wind_direction: f64,
        wind_direction_error: f64,
        plume_altitude_masl: f64,
        plume_altitude_error: f64,
        plume_height_source: impl Into<String>,
        compass: f64,
        cone_angle: f64,
        tilt: f64,
        good_spectrum_count: usize,
        plume_centre: [f64; 2],
        completeness: f64,
        offset: f64,
    ) -> Self {
        Self {
            flux_kg_s,
            wind_error_component,
            plume_height_error_component,
            quality,
            wind_speed,
            wind_speed_error,
            wind_source: wind_source.into(),
            wind_direction,
            wind_direction_error,
            plume_altitude_masl,
            plume_altitude_error,
            plume_height_source: plume_height_source.into(),
            compass,
            cone_angle,
            tilt,
            good_spectrum_count,
            plume_centre,
            completeness,
            offset,
        }
    }

    pub fn flux_kg_s(&self) -> f64 {
        self.flux_kg_s
    }

    pub fn quality(&self) -> FluxQuality {
        self.quality
    }

    pub fn wind_error_component(&self) -> f64 {
        self.wind_error_component
    }

    pub fn plume_height_error_component(&self) -> f64 {
        self.plume_height_error_component
    }

    pub fn wind_speed(&self) -> f64 {
        self.wind_speed
    }

    pub fn wind_speed_error(&self) -> f64 {
        self.wind_speed_error
    }

    pub fn wind_source(&self) -> &str {
        &self.wind_source
    }

    pub fn wind_direction(&self) -> f64 {
        self.wind_direction
    }

    pub fn wind_direction_error(&self) -> f64 {
        self.wind_direction_error
    }

    pub fn plume_altitude_masl(&self) -> f64 {
        self.plume_altitude_masl
    }

    pub fn plume_altitude_error(&self) -> f64 {
        self.plume_altitude_error
    }

    pub fn plume_height_source(&self) -> &str {
        &self.plume_height_source
    }

    pub fn compass(&self) -> f64 {
        self.compass
    }

    pub fn cone_angle(&self) -> f64 {
        self.cone_angle
    }

    pub fn tilt(&self) -> f64 {
        self.tilt
    }

    pub fn good_spectrum_count(&self) -> usize {
        self.good_spectrum_count
    }

    pub fn plume_centre(&self) -> [f64; 2] {
        self.plume_centre
    }

    pub fn completeness(&self) -> f64 {
        self.completeness
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }
}
