/// Plume position and shape properties derived from one scan's column-vs-angle series.
///
/// `centre` carries two components to support dual-axis (Heidelberg) instruments; for
/// single-axis instruments only the first component is meaningful.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlumeInScanProperty {
    centre: [f64; 2],
    centre_error: [f64; 2],
    low_edge: f64,
    high_edge: f64,
    completeness: f64,
    offset: f64,
}

impl PlumeInScanProperty {
    /// The sentinel "no plume detected" value: all angle fields are NaN, offset and
    /// completeness are zero.
    pub fn none() -> Self {
        Self {
            centre: [f64::NAN, f64::NAN],
            centre_error: [f64::NAN, f64::NAN],
            low_edge: f64::NAN,
            high_edge: f64::NAN,
            completeness: 0.0,
            offset: 0.0,
        }
    }

    pub fn new(
        centre: [f64; 2],
        centre_error: [f64; 2],
        low_edge: f64,
        high_edge: f64,
        completeness: f64,
        offset: f64,
    ) -> Self {
        Self {
            centre,
            centre_error,
            low_edge,
            high_edge,
            completeness,
            offset,
        }
    }

    pub fn is_plume_found(&self) -> bool {
        !self.centre[0].is_nan()
    }

    pub fn centre(&self) -> [f64; 2] {
        self.centre
    }

    pub fn centre_error(&self) -> [f64; 2] {
        self.centre_error
    }

    pub fn low_edge(&self) -> f64 {
        self.low_edge
    }

    pub fn high_edge(&self) -> f64 {
        self.high_edge
    }

    pub fn completeness(&self) -> f64 {
        self.completeness
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }
}

impl Default for PlumeInScanProperty {
    fn default() -> Self {
        Self::none()
    }
}
