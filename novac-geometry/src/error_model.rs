//! Error propagation for two-scan geometry fixes: perturb each instrument's plume
//! centre by plus/minus its estimated error, recompute the fix at each of the four
//! corner combinations, and average the absolute deviation from the unperturbed fix.
//! The altitude error is additionally scaled to account for time elapsed between the
//! two contributing scans, since a larger gap gives the plume more time to drift.

use chrono::{DateTime, Utc};

use crate::result::Result;
use crate::two_scan::{two_scan_exact, two_scan_fuzzy, ScanFix};

/// Half-life, in minutes, of the altitude-error growth with increasing time
/// separation between the two scans: the error doubles for every 30 minutes elapsed.
const ALTITUDE_ERROR_DOUBLING_MINUTES: f64 = 30.0;

/// Perturbed altitude and wind-direction error estimates for a fuzzy two-scan fix,
/// derived from the four corner combinations of `scan1`/`scan2` centre-angle
/// perturbations, with the altitude error additionally scaled by the time elapsed
/// between the two scans.
pub fn fuzzy_fix_errors(
    scan1: &ScanFix,
    scan2: &ScanFix,
    volcano_lat: f64,
    volcano_lon: f64,
    volcano_altitude_masl: f64,
    base_altitude_masl: f64,
    base_wind_direction_deg: f64,
) -> (Option<f64>, Option<f64>) {
    corner_errors(
        scan1,
        scan2,
        base_altitude_masl,
        base_wind_direction_deg,
        |s1, s2| two_scan_fuzzy(s1, s2, volcano_lat, volcano_lon, volcano_altitude_masl),
    )
}

/// The same corner-perturbation error model, for an exact two-scan fix (which carries
/// no wind-direction output, so only an altitude error is returned).
pub fn exact_fix_altitude_error(scan1: &ScanFix, scan2: &ScanFix, base_altitude_masl: f64) -> Option<f64> {
    corner_errors(scan1, scan2, base_altitude_masl, 0.0, |s1, s2| two_scan_exact(s1, s2)).0
}

fn corner_errors(
    scan1: &ScanFix,
    scan2: &ScanFix,
    base_altitude_masl: f64,
    base_wind_direction_deg: f64,
    solve: impl Fn(&ScanFix, &ScanFix) -> Result<novac_model::data::GeometryResult>,
) -> (Option<f64>, Option<f64>) {
    let mut altitude_deviations = Vec::with_capacity(4);
    let mut direction_deviations = Vec::with_capacity(4);

    for sign1 in [-1.0, 1.0] {
        for sign2 in [-1.0, 1.0] {
            let perturbed1 = ScanFix { centre_angle_deg: scan1.centre_angle_deg + sign1 * scan1.centre_error_deg, ..*scan1 };
            let perturbed2 = ScanFix { centre_angle_deg: scan2.centre_angle_deg + sign2 * scan2.centre_error_deg, ..*scan2 };

            if let Ok(result) = solve(&perturbed1, &perturbed2) {
                if let Some(altitude) = result.altitude_masl() {
                    altitude_deviations.push((altitude - base_altitude_masl).abs());
                }
                if let Some(direction) = result.wind_direction() {
                    direction_deviations.push(circular_delta(direction, base_wind_direction_deg));
                }
            }
        }
    }

    let mean = |values: &[f64]| if values.is_empty() { None } else { Some(values.iter().sum::<f64>() / values.len() as f64) };

    let altitude_error = mean(&altitude_deviations);
    let direction_error = mean(&direction_deviations);

    (altitude_error, direction_error)
}

fn circular_delta(a: f64, b: f64) -> f64 {
    let mut d = (a - b).abs() % 360.0;
    if d > 180.0 {
        d = 360.0 - d;
    }
    d
}

/// Scale an altitude error estimate by the time elapsed between two scans: the error
/// doubles for every [`ALTITUDE_ERROR_DOUBLING_MINUTES`] minutes of separation. The
/// two scans' own start times, not any other clock, seed this calculation.
pub fn scale_altitude_error_for_time_gap(altitude_error: f64, time1: DateTime<Utc>, time2: DateTime<Utc>) -> f64 {
    let minutes = (time2 - time1).num_seconds().unsigned_abs() as f64 / 60.0;
    altitude_error * 2f64.powf(minutes / ALTITUDE_ERROR_DOUBLING_MINUTES)
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn time_gap_scaling_doubles_every_thirty_minutes() {
        let t1 = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2024, 6, 1, 10, 30, 0).unwrap();
        let scaled = scale_altitude_error_for_time_gap(100.0, t1, t2);
        assert!((scaled - 200.0).abs() < 1e-6);
    }

    #[test]
    fn zero_time_gap_leaves_error_unchanged() {
        let t1 = Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap();
        let scaled = scale_altitude_error_for_time_gap(50.0, t1, t1);
        assert!((scaled - 50.0).abs() < 1e-6);
    }
}
