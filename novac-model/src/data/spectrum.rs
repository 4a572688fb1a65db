use chrono::{DateTime, Utc};

/// The type of instrument that recorded a [`Spectrum`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InstrumentType {
    /// A single-axis scanner as used in the original Gothenburg design.
    Gothenburg,
    /// A dual-axis scanner as used at Heidelberg University.
    Heidelberg,
}

/// A single recorded spectrum: a fixed-length vector of channel intensities plus the
/// acquisition metadata needed to evaluate and later integrate it.
///
/// All spectra belonging to one scan share `serial` and `channel`; their `intensities`
/// lengths match the fit window they are evaluated against.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spectrum {
    intensities: Vec<f64>,
    start_time: DateTime<Utc>,
    stop_time: DateTime<Utc>,
    exposure_time_ms: u32,
    co_adds: u32,
    scan_angle: f64,
    azimuth: Option<f64>,
    serial: String,
    channel: u8,
    offset: f64,
    peak_intensity: f64,
}

impl Spectrum {
    pub fn new(
        intensities: Vec<f64>,
        start_time: DateTime<Utc>,
        stop_time: DateTime<Utc>,
        exposure_time_ms: u32,
        co_adds: u32,
        scan_angle: f64,
        azimuth: Option<f64>,
        serial: String,
        channel: u8,
    ) -> Self {
        let peak_intensity = intensities.iter().cloned().fold(f64::MIN, f64::max);
        Self {
            intensities,
            start_time,
            stop_time,
            exposure_time_ms,
            co_adds,
            scan_angle,
            azimuth,
            serial,
            channel,
            offset: 0.0,
            peak_intensity,
        }
    }

    /// The recorded channel intensities, in instrument pixel order.
    pub fn intensities(&self) -> &[f64] {
        &self.intensities
    }

    /// Number of channels recorded.
    pub fn len(&self) -> usize {
        self.intensities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intensities.is_empty()
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn stop_time(&self) -> DateTime<Utc> {
        self.stop_time
    }

    pub fn exposure_time_ms(&self) -> u32 {
        self.exposure_time_ms
    }

    pub fn co_adds(&self) -> u32 {
        self.co_adds
    }

    /// Elevation scan angle in degrees, alpha in the geometry engine's notation.
    pub fn scan_angle(&self) -> f64 {
        self.scan_angle
    }

    /// Azimuth angle in degrees for dual-axis (Heidelberg) instruments.
    pub fn azimuth(&self) -> Option<f64> {
        self.azimuth
    }

    pub fn serial(&self) -> &str {
        &self.serial
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn set_offset(&mut self, offset: f64) {
        self.offset = offset;
    }

    /// The highest single-channel intensity in the spectrum, used for saturation checks.
    pub fn peak_intensity(&self) -> f64 {
        self.peak_intensity
    }

    /// Fraction of full-scale the peak intensity represents, given the instrument's
    /// saturation level (typically 4095 or 65535 depending on digitizer depth).
    pub fn saturation_ratio(&self, full_scale: f64) -> f64 {
        if full_scale <= 0.0 {
            return 0.0;
        }
        (self.peak_intensity / self.co_adds.max(1) as f64) / full_scale
    }
}
