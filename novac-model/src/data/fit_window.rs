use crate::data::Reference;

/// How the sky reference is folded into the measured spectrum before fitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FitMode {
    /// Remove offset, high-pass both spectra, take logs, subtract.
    HpSub,
    /// Remove offset, divide measurement by sky, high-pass the ratio.
    HpDiv,
    /// Remove offset, log both, subtract, negate.
    Poly,
    /// No sky preconditioning; used only for raw diagnostic fits.
    None,
}

/// A channel range `[low, high)` within a spectrum over which a fit window operates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FitInterval {
    pub low: usize,
    pub high: usize,
}

impl FitInterval {
    pub fn new(low: usize, high: usize) -> Self {
        Self { low, high }
    }

    pub fn len(&self) -> usize {
        self.high.saturating_sub(self.low)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A configured DOAS fit: the references to fit, the polynomial order, the channel range,
/// and the preconditioning mode.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FitWindow {
    name: String,
    references: Vec<Reference>,
    polynomial_order: usize,
    interval: FitInterval,
    spectrum_length: usize,
    mode: FitMode,
    fraunhofer_reference: Option<String>,
    is_uv: bool,
}

impl FitWindow {
    pub fn new(
        name: impl Into<String>,
        references: Vec<Reference>,
        polynomial_order: usize,
        interval: FitInterval,
        spectrum_length: usize,
        mode: FitMode,
        fraunhofer_reference: Option<String>,
        is_uv: bool,
    ) -> Self {
        Self {
            name: name.into(),
            references,
            polynomial_order,
            interval,
            spectrum_length,
            mode,
            fraunhofer_reference,
            is_uv,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    pub fn polynomial_order(&self) -> usize {
        self.polynomial_order
    }

    pub fn interval(&self) -> FitInterval {
        self.interval
    }

    pub fn spectrum_length(&self) -> usize {
        self.spectrum_length
    }

    pub fn mode(&self) -> FitMode {
        self.mode
    }

    pub fn fraunhofer_reference(&self) -> Option<&str> {
        self.fraunhofer_reference.as_deref()
    }

    pub fn is_uv(&self) -> bool {
        self.is_uv
    }

    /// The offset-removal band: a fixed index range whose mean is subtracted from the
    /// whole spectrum before preconditioning. UV instruments use a lower band because
    /// their lowest channels are least affected by the absorbing species.
    pub fn offset_band(&self) -> FitInterval {
        if self.is_uv {
            FitInterval::new(40, 80)
        } else {
            FitInterval::new(self.spectrum_length.saturating_sub(80), self.spectrum_length.saturating_sub(40))
        }
    }
}
