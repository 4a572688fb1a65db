//! Spectral preconditioning: offset removal, high-pass filtering, and the per-mode
//! combination of sky and measured spectra into the vector actually fit.

use novac_model::data::{FitInterval, FitMode, FitWindow};

/// Number of taps in the binomial smoothing kernel subtracted out by the high-pass
/// filter. A 500-tap binomial kernel is realized as 499 successive two-point averaging
/// passes, which converges to the same result as a direct binomial convolution but
/// avoids computing binomial coefficients for large n.
const HIGH_PASS_TAPS: usize = 500;

/// Subtract the mean of `band` from every sample of `spectrum`.
pub fn remove_offset(spectrum: &mut [f64], band: FitInterval) {
    let band = clamp_band(band, spectrum.len());
    if band.is_empty() {
        return;
    }
    let mean: f64 = spectrum[band.low..band.high].iter().sum::<f64>() / band.len() as f64;
    for value in spectrum.iter_mut() {
        *value -= mean;
    }
}

fn clamp_band(band: FitInterval, length: usize) -> FitInterval {
    FitInterval::new(band.low.min(length), band.high.min(length))
}

/// A low-pass (binomial-smoothed) copy of `data`, used internally by [`high_pass`].
fn binomial_low_pass(data: &[f64]) -> Vec<f64> {
    let mut current = data.to_vec();
    for _ in 0..HIGH_PASS_TAPS.saturating_sub(1) {
        let mut next = current.clone();
        for i in 0..current.len() {
            let left = if i == 0 { current[0] } else { current[i - 1] };
            let right = if i + 1 == current.len() { current[i] } else { current[i + 1] };
            next[i] = 0.25 * left + 0.5 * current[i] + 0.25 * right;
        }
        current = next;
    }
    current
}

/// Remove the low-frequency trend from `data` with the configured 500-tap binomial
/// high-pass kernel, in place.
pub fn high_pass(data: &mut [f64]) {
    let low = binomial_low_pass(data);
    for (value, baseline) in data.iter_mut().zip(low.into_iter()) {
        *value -= baseline;
    }
}

/// The natural log of each element, clamped below at a small positive floor to avoid
/// `-inf` from zero or negative intensities (which indicate a degenerate spectrum
/// rather than a physically meaningful zero).
pub fn log_in_place(data: &mut [f64]) {
    for value in data.iter_mut() {
        *value = value.max(1e-6).ln();
    }
}

/// Combine a sky and measurement spectrum per the fit window's configured mode,
/// yielding the single vector the DOAS solver fits against. Both inputs must already
/// be restricted to the fit window's pixel range and have had [`remove_offset`]
/// applied.
pub fn combine(mode: FitMode, sky: &[f64], measurement: &[f64]) -> Vec<f64> {
    assert_eq!(sky.len(), measurement.len());
    match mode {
        FitMode::HpSub => {
            let mut sky_log = sky.to_vec();
            let mut meas_log = measurement.to_vec();
            log_in_place(&mut sky_log);
            log_in_place(&mut meas_log);
            high_pass(&mut sky_log);
            high_pass(&mut meas_log);
            meas_log.iter().zip(sky_log.iter()).map(|(m, s)| m - s).collect()
        }
        FitMode::HpDiv => {
            let mut ratio: Vec<f64> = measurement
                .iter()
                .zip(sky.iter())
                .map(|(m, s)| if s.abs() > 1e-12 { m / s } else { 0.0 })
                .collect();
            high_pass(&mut ratio);
            ratio
        }
        FitMode::Poly => {
            let mut sky_log = sky.to_vec();
            let mut meas_log = measurement.to_vec();
            log_in_place(&mut sky_log);
            log_in_place(&mut meas_log);
            meas_log
                .iter()
                .zip(sky_log.iter())
                .map(|(m, s)| -(m - s))
                .collect()
        }
        FitMode::None => measurement.to_vec(),
    }
}

/// Precondition `measurement` against `sky` within the fit window's interval, returning
/// the vector to be fit (already offset-removed, high-passed, and combined per mode).
pub fn precondition(window: &FitWindow, sky: &[f64], measurement: &[f64]) -> Vec<f64> {
    let interval = window.interval();
    let band = window.offset_band();

    let mut sky_slice = sky.to_vec();
    let mut meas_slice = measurement.to_vec();
    remove_offset(&mut sky_slice, band);
    remove_offset(&mut meas_slice, band);

    let sky_window = &sky_slice[interval.low..interval.high];
    let meas_window = &meas_slice[interval.low..interval.high];

    combine(window.mode(), sky_window, meas_window)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn high_pass_removes_constant_offset() {
        let mut data = vec![5.0; 64];
        high_pass(&mut data);
        for value in data {
            assert!(value.abs() < 1e-9);
        }
    }

    #[test]
    fn remove_offset_zeroes_band_mean() {
        let mut data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        remove_offset(&mut data, FitInterval::new(0, 2));
        assert!((data[0] - (1.0 - 1.5)).abs() < 1e-9);
        assert!((data[1] - (2.0 - 1.5)).abs() < 1e-9);
    }

    #[test]
    fn hp_div_preserves_length() {
        let sky = vec![100.0; 32];
        let measurement = vec![90.0; 32];
        let combined = combine(FitMode::HpDiv, &sky, &measurement);
        assert_eq!(combined.len(), 32);
    }
}
