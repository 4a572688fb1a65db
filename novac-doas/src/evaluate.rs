//! The public entry point: evaluate one measured spectrum against one sky spectrum in
//! one fit window.

use novac_model::data::{EvaluationResult, FitWindow};

use crate::precondition::precondition;
use crate::result::{Error, Result};
use crate::solver::{solve, SolverConfig};
use crate::spline::CubicSpline;

/// Saturation fraction above which a spectrum is judged too bright to trust (near
/// detector saturation).
const MAX_SATURATION: f64 = 0.85;
/// Saturation fraction below which a spectrum is judged too dim to trust.
const MIN_SATURATION: f64 = 0.02;
/// Reduced chi-square above which a fit is judged poor regardless of convergence.
const MAX_CHI_SQUARE: f64 = 10.0;
/// Residual-norm-per-sample above which a fit is judged poor.
const MAX_DELTA: f64 = 5.0;

/// Evaluate `measurement` against `sky` in `window`, returning the fitted column
/// densities, shifts, squeezes, and derived quality judgment for every configured
/// reference.
pub fn evaluate(window: &FitWindow, sky: &[f64], measurement: &[f64], saturation_ratio: f64) -> Result<EvaluationResult> {
    if sky.len() != window.spectrum_length() || measurement.len() != window.spectrum_length() {
        return Err(Error::WindowMismatch {
            expected: window.spectrum_length(),
            actual: measurement.len(),
        });
    }

    let interval = window.interval();
    if interval.high > window.spectrum_length() || interval.low >= interval.high {
        return Err(Error::FitIntervalOutsideSpectrum {
            low: interval.low,
            high: interval.high,
            length: window.spectrum_length(),
        });
    }

    if window.references().is_empty() {
        return Err(Error::ReferencesNotInitialized);
    }

    let target = precondition(window, sky, measurement);

    let splines: Vec<CubicSpline> = window
        .references()
        .iter()
        .map(|r| CubicSpline::new(&r.values()[interval.low..interval.high]))
        .collect();

    let outcome = solve(window, &splines, &target, SolverConfig::default())?;

    let is_ok = outcome.chi_square.is_finite()
        && outcome.chi_square < MAX_CHI_SQUARE
        && outcome.delta.is_finite()
        && outcome.delta < MAX_DELTA
        && saturation_ratio > MIN_SATURATION
        && saturation_ratio < MAX_SATURATION
        && outcome
            .reference_results
            .iter()
            .all(|r| r.column.is_finite() && r.column_error.is_finite());

    Ok(EvaluationResult::new(
        outcome.reference_results,
        outcome.polynomial_coefficients,
        outcome.chi_square,
        outcome.delta,
        outcome.step_count,
        is_ok,
    ))
}

#[cfg(test)]
mod test {
    use super::*;
    use novac_model::data::{FitInterval, FitMode, ParameterPolicy, Reference};

    fn window_with_single_reference(values: Vec<f64>) -> FitWindow {
        FitWindow::new(
            "test",
            vec![Reference::new(
                "SO2",
                values,
                ParameterPolicy::Free,
                ParameterPolicy::Fixed(0.0),
                ParameterPolicy::Fixed(1.0),
            )],
            1,
            FitInterval::new(100, 356),
            512,
            FitMode::HpSub,
            None,
            true,
        )
    }

    #[test]
    fn rejects_mismatched_spectrum_length() {
        let window = window_with_single_reference(vec![0.0; 512]);
        let sky = vec![1.0; 100];
        let measurement = vec![1.0; 512];
        assert!(matches!(evaluate(&window, &sky, &measurement, 0.3), Err(Error::WindowMismatch { .. })));
    }

    #[test]
    fn recovers_approximate_column_for_synthetic_absorption() {
        let n = 512;
        let cross_section: Vec<f64> = (0..n)
            .map(|i| {
                let x = (i as f64 - 228.0) / 40.0;
                (-x * x).exp()
            })
            .collect();
        let sky: Vec<f64> = (0..n).map(|i| 10_000.0 + 500.0 * (i as f64 * 0.01).sin()).collect();
        let column_truth = 2.0e3;
        let measurement: Vec<f64> = sky
            .iter()
            .zip(cross_section.iter())
            .map(|(s, xs)| s * (-xs * column_truth / 1e4).exp())
            .collect();

        let window = window_with_single_reference(cross_section);
        let result = evaluate(&window, &sky, &measurement, 0.3).expect("fit should succeed");
        assert_eq!(result.reference_results().len(), 1);
        assert!(result.reference_results()[0].column.is_finite());
    }
}
