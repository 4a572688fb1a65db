//!
//! # novac-flux
//! Integrates mass flux across a completed scan's column series, selecting the flat,
//! conical (Gothenburg), or Heidelberg dual-axis formula by instrument geometry, and
//! grades the result green/yellow/red from the provenance of its wind and plume-height
//! inputs.
//!

#![forbid(unsafe_code)]
#![warn(clippy::correctness)]
#![allow(clippy::too_many_arguments)]

pub mod integrator;
pub mod quality;
pub mod result;

use novac_model::data::{FluxResult, InstrumentType, ScanResult};
use novac_model::meta::{InstrumentLocation, PlumeHeight, WindField};

use integrator::FluxPoint;

pub use result::{Error, Result};

/// Default minimum completeness below which a scan is rejected outright rather than
/// graded red.
pub const DEFAULT_COMPLETENESS_LIMIT: f64 = 0.9;

/// Compute the flux for `scan`'s `reference_index`-th reference, given the
/// instrument's location, the wind field and plume height valid at the time of the
/// scan, and the minimum completeness required to attempt integration at all.
pub fn compute_flux(
    scan: &ScanResult,
    reference_index: usize,
    location: &InstrumentLocation,
    wind: &WindField,
    plume_height: &PlumeHeight,
    completeness_limit: f64,
) -> Result<FluxResult> {
    let plume = scan.plume();
    if !plume.is_plume_found() {
        return Err(Error::NoPlumeDetected);
    }

    let completeness = plume.completeness();
    if completeness < completeness_limit {
        return Err(Error::BelowCompletenessLimit { completeness, limit: completeness_limit });
    }

    let relative_altitude = plume_height.altitude_masl() - location.altitude_masl();
    if relative_altitude <= 0.0 {
        return Err(Error::NonPositivePlumeHeight);
    }

    let points: Vec<FluxPoint> = scan
        .points()
        .iter()
        .map(|p| {
            let column = p
                .evaluation()
                .reference_result(reference_index)
                .map(|r| r.column)
                .ok_or(Error::MissingReference { index: reference_index });
            column.map(|column| FluxPoint { angle_deg: p.scan_angle(), azimuth_deg: p.azimuth(), column })
        })
        .collect::<Result<Vec<_>>>()?;

    let offset = plume.offset();

    let flux_kg_s = if location.is_flat_scanner() {
        integrator::flat_flux(&points, offset, relative_altitude, wind.speed_ms(), wind.direction_deg(), location.compass())
    } else {
        match location.instrument_type() {
            InstrumentType::Gothenburg => {
                integrator::conical_flux(&points, offset, relative_altitude, wind.speed_ms(), wind.direction_deg(), location.compass(), location.cone_angle(), location.tilt())
            }
            InstrumentType::Heidelberg => integrator::heidelberg_flux(&points, offset, relative_altitude, wind.speed_ms(), wind.direction_deg()),
        }
    };

    let quality = quality::grade(wind.source(), plume_height.source(), completeness);

    // Linear error propagation: flux scales roughly linearly with wind speed and with
    // plume height, so each input's relative error is applied directly to the flux.
    let wind_error_component = flux_kg_s * (wind.speed_error() / wind.speed_ms().max(1e-6)).abs();
    let plume_height_error_component = flux_kg_s * (plume_height.error() / relative_altitude).abs();

    Ok(FluxResult::new(
        flux_kg_s,
        wind_error_component,
        plume_height_error_component,
        quality,
        wind.speed_ms(),
        wind.speed_error(),
        wind.source().as_str(),
        wind.direction_deg(),
        wind.direction_error(),
        plume_height.altitude_masl(),
        plume_height.error(),
        plume_height.source().as_str(),
        location.compass(),
        location.cone_angle(),
        location.tilt(),
        scan.good_point_count(),
        plume.centre(),
        completeness,
        offset,
    ))
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{TimeZone, Utc};
    use novac_model::data::{EvaluationResult, PlumeInScanProperty, ReferenceResult, ScanMode, ScanPoint};
    use novac_model::meta::{PlumeHeightSource, WindSource};

    fn location(cone_angle: f64) -> InstrumentLocation {
        InstrumentLocation::new(
            "D2J123",
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            19.40,
            -155.30,
            1200.0,
            0.0,
            cone_angle,
            0.0,
            InstrumentType::Gothenburg,
            "Kilauea",
        )
    }

    fn scan_with_plume() -> ScanResult {
        let points: Vec<ScanPoint> = (0..30)
            .map(|i| {
                let angle = -60.0 + i as f64 * 4.0;
                let column = if (10..20).contains(&i) { 800.0 } else { 50.0 };
                let evaluation = EvaluationResult::new(
                    vec![ReferenceResult { column, column_error: 10.0, shift: 0.0, shift_error: 0.1, squeeze: 1.0, squeeze_error: 0.01 }],
                    vec![0.0; 3],
                    1.0,
                    0.5,
                    3,
                    true,
                );
                ScanPoint::new(angle, None, Utc.timestamp_opt(1_700_000_000 + i, 0).unwrap(), Utc.timestamp_opt(1_700_000_001 + i, 0).unwrap(), evaluation, true)
            })
            .collect();

        let plume = PlumeInScanProperty::new([-20.0, 0.0], [2.0, 2.0], -30.0, -10.0, 0.95, 50.0);
        ScanResult::new("D2J123", InstrumentType::Gothenburg, ScanMode::Flux, points, plume, Utc.timestamp_opt(1_700_000_000, 0).unwrap())
    }

    #[test]
    fn rejects_scan_below_completeness_limit() {
        let mut scan = scan_with_plume();
        scan.set_plume(PlumeInScanProperty::new([-20.0, 0.0], [2.0, 2.0], -30.0, -10.0, 0.5, 50.0));
        let location = location(90.0);
        let wind = WindField::new(5.0, 0.5, 180.0, 5.0, WindSource::EcmwfForecast, Utc.timestamp_opt(0, 0).unwrap(), Utc.timestamp_opt(2_000_000_000, 0).unwrap());
        let plume_height = PlumeHeight::new(2500.0, 100.0, PlumeHeightSource::GeometryCalculation, Utc.timestamp_opt(0, 0).unwrap(), Utc.timestamp_opt(2_000_000_000, 0).unwrap());

        let result = compute_flux(&scan, 0, &location, &wind, &plume_height, DEFAULT_COMPLETENESS_LIMIT);
        assert!(matches!(result, Err(Error::BelowCompletenessLimit { .. })));
    }

    #[test]
    fn computes_green_flux_for_flat_scanner_with_good_inputs() {
        let scan = scan_with_plume();
        let location = location(90.0);
        let wind = WindField::new(5.0, 0.5, 180.0, 5.0, WindSource::EcmwfForecast, Utc.timestamp_opt(0, 0).unwrap(), Utc.timestamp_opt(2_000_000_000, 0).unwrap());
        let plume_height = PlumeHeight::new(2500.0, 100.0, PlumeHeightSource::GeometryCalculation, Utc.timestamp_opt(0, 0).unwrap(), Utc.timestamp_opt(2_000_000_000, 0).unwrap());

        let result = compute_flux(&scan, 0, &location, &wind, &plume_height, DEFAULT_COMPLETENESS_LIMIT).expect("flux should compute");
        assert_eq!(result.quality(), novac_model::data::FluxQuality::Green);
        assert!(result.flux_kg_s() >= 0.0);
    }

    #[test]
    fn rejects_non_positive_relative_plume_height() {
        let scan = scan_with_plume();
        let location = location(90.0);
        let wind = WindField::new(5.0, 0.5, 180.0, 5.0, WindSource::EcmwfForecast, Utc.timestamp_opt(0, 0).unwrap(), Utc.timestamp_opt(2_000_000_000, 0).unwrap());
        let plume_height = PlumeHeight::new(900.0, 100.0, PlumeHeightSource::GeometryCalculation, Utc.timestamp_opt(0, 0).unwrap(), Utc.timestamp_opt(2_000_000_000, 0).unwrap());

        let result = compute_flux(&scan, 0, &location, &wind, &plume_height, DEFAULT_COMPLETENESS_LIMIT);
        assert!(matches!(result, Err(Error::NonPositivePlumeHeight)));
    }
}
