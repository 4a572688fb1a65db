//! Solar-shift ("Fraunhofer") calibration: a fixed-column fit of a solar reference used
//! to derive a per-instrument spectral registration correction. The solar reference's
//! column is fixed at `±amplitude_scale` (sign matching the fit mode's sky/measurement
//! polarity) and its squeeze fixed at 1.0; every other configured reference has its
//! shift and squeeze linked to the solar reference rather than fit independently.

use novac_model::data::{FitWindow, ParameterPolicy, Reference};

use crate::precondition::precondition;
use crate::result::{Error, Result};
use crate::solver::{solve, SolverConfig};
use crate::spline::CubicSpline;
use novac_model::data::EvaluationResult;

/// Iteration cap for the solar-shift fit; higher than a normal evaluation's because the
/// solar reference's absorption structure is far richer and needs more steps to lock
/// onto the right sub-pixel registration.
const SOLAR_SHIFT_MAX_STEPS: u32 = 5000;
const SOLAR_SHIFT_MIN_CHI_SQUARE_DELTA: f64 = 1e-4;

/// Evaluate `window`'s designated Fraunhofer reference in isolation, fixing its column
/// to `amplitude_scale` (or `-amplitude_scale` for fit modes that negate the target,
/// i.e. [`novac_model::data::FitMode::Poly`]) and its squeeze to 1.0, with every other
/// reference's shift and squeeze linked to it.
pub fn evaluate_solar_shift(window: &FitWindow, sky: &[f64], measurement: &[f64], amplitude_scale: f64) -> Result<EvaluationResult> {
    let fraunhofer_name = window
        .fraunhofer_reference()
        .ok_or(Error::MissingFraunhoferReference)?
        .to_string();

    let sign = match window.mode() {
        novac_model::data::FitMode::Poly => -1.0,
        _ => 1.0,
    };

    let references: Vec<Reference> = window
        .references()
        .iter()
        .map(|r| {
            if r.name() == fraunhofer_name {
                Reference::new(
                    r.name(),
                    r.values().to_vec(),
                    ParameterPolicy::Fixed(sign * amplitude_scale),
                    ParameterPolicy::Free,
                    ParameterPolicy::Fixed(1.0),
                )
            } else {
                Reference::new(
                    r.name(),
                    r.values().to_vec(),
                    ParameterPolicy::Fixed(0.0),
                    ParameterPolicy::LinkedTo(fraunhofer_name.clone()),
                    ParameterPolicy::LinkedTo(fraunhofer_name.clone()),
                )
            }
        })
        .collect();

    let solar_window = FitWindow::new(
        window.name(),
        references,
        window.polynomial_order(),
        window.interval(),
        window.spectrum_length(),
        window.mode(),
        Some(fraunhofer_name),
        window.is_uv(),
    );

    if sky.len() != solar_window.spectrum_length() || measurement.len() != solar_window.spectrum_length() {
        return Err(Error::WindowMismatch {
            expected: solar_window.spectrum_length(),
            actual: measurement.len(),
        });
    }

    let target = precondition(&solar_window, sky, measurement);
    let interval = solar_window.interval();
    let splines: Vec<CubicSpline> = solar_window
        .references()
        .iter()
        .map(|r| CubicSpline::new(&r.values()[interval.low..interval.high]))
        .collect();

    let config = SolverConfig {
        max_steps: SOLAR_SHIFT_MAX_STEPS,
        min_chi_square_delta: SOLAR_SHIFT_MIN_CHI_SQUARE_DELTA,
        ..SolverConfig::default()
    };

    let outcome = solve(&solar_window, &splines, &target, config)?;

    Ok(EvaluationResult::new(
        outcome.reference_results,
        outcome.polynomial_coefficients,
        outcome.chi_square,
        outcome.delta,
        outcome.step_count,
        outcome.chi_square.is_finite() && outcome.chi_square < 10.0,
    ))
}

#[cfg(test)]
mod test {
    use super::*;
    use novac_model::data::{FitInterval, FitMode};

    #[test]
    fn requires_fraunhofer_reference_to_be_configured() {
        let window = FitWindow::new(
            "solar",
            vec![Reference::new(
                "SO2",
                vec![0.0; 256],
                ParameterPolicy::Free,
                ParameterPolicy::Free,
                ParameterPolicy::Fixed(1.0),
            )],
            2,
            FitInterval::new(0, 256),
            256,
            FitMode::HpSub,
            None,
            true,
        );
        let sky = vec![1.0; 256];
        let measurement = vec![1.0; 256];
        assert!(matches!(
            evaluate_solar_shift(&window, &sky, &measurement, 1.0),
            Err(Error::MissingFraunhoferReference)
        ));
    }
}
