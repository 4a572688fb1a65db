//! Two-scan plume geometry: combine simultaneous (or near-simultaneous) scans from two
//! instruments to reconstruct both plume altitude and wind direction, either through a
//! damped-Newton search for agreement between the two single-instrument wind-direction
//! solutions (the fuzzy solver), or through direct intersection of the two lines of
//! sight (the exact solver).

use chrono::{DateTime, Utc};
use novac_model::data::GeometryResult;
use novac_model::meta::InstrumentLocation;

use crate::gps::east_north_offset_m;
use crate::los::direction_vector;
use crate::result::{Error, Result};
use crate::single_instrument::wind_direction_from_known_altitude;

/// One scan's contribution to a geometry fix: the instrument's location, its detected
/// plume centre angle, and the scan's start time.
#[derive(Debug, Clone, Copy)]
pub struct ScanFix<'a> {
    pub location: &'a InstrumentLocation,
    pub centre_angle_deg: f64,
    pub centre_error_deg: f64,
    pub start_time: DateTime<Utc>,
}

const MAX_OUTER_STEPS: u32 = 100;
const MAX_LINE_SEARCH_HALVINGS: u32 = 1000;
const INITIAL_STEP_M: f64 = 10.0;
const CONVERGENCE_DEG: f64 = 1.0;
const MAX_ALTITUDE_GUESS_M: f64 = 5000.0;

fn circular_delta(a: f64, b: f64) -> f64 {
    let mut d = (a - b).abs() % 360.0;
    if d > 180.0 {
        d = 360.0 - d;
    }
    d
}

/// Find the plume altitude (meters above sea level) at which both instruments'
/// known-altitude wind-direction solutions agree, by a damped Newton search with
/// halving line search, matching the original iterative two-scan solver's step sizes
/// and convergence criterion.
pub fn two_scan_fuzzy(scan1: &ScanFix, scan2: &ScanFix, volcano_lat: f64, volcano_lon: f64, volcano_altitude_masl: f64) -> Result<GeometryResult> {
    let lower_altitude = scan1.location.altitude_masl().min(scan2.location.altitude_masl());
    let mut h = (volcano_altitude_masl - lower_altitude).clamp(0.0, MAX_ALTITUDE_GUESS_M);

    let mismatch = |h: f64| -> Option<f64> {
        let wd1 = wind_direction_from_known_altitude(scan1.location, scan1.centre_angle_deg, volcano_lat, volcano_lon, lower_altitude + h).ok()?;
        let wd2 = wind_direction_from_known_altitude(scan2.location, scan2.centre_angle_deg, volcano_lat, volcano_lon, lower_altitude + h).ok()?;
        Some(circular_delta(wd1, wd2))
    };

    let mut f = mismatch(h).ok_or(Error::NoPlumeCentre)?;

    for _ in 0..MAX_OUTER_STEPS {
        if f < CONVERGENCE_DEG {
            let wd1 = wind_direction_from_known_altitude(scan1.location, scan1.centre_angle_deg, volcano_lat, volcano_lon, lower_altitude + h)
                .map_err(|_| Error::NoPlumeCentre)?;

            return Ok(GeometryResult::new(
                Some(lower_altitude + h),
                None,
                Some(wd1),
                None,
                scan1.start_time,
                (scan1.location.serial().to_string(), Some(scan2.location.serial().to_string())),
            ));
        }

        let f_plus = mismatch(h + INITIAL_STEP_M).unwrap_or(f64::INFINITY);
        let derivative = (f_plus - f) / INITIAL_STEP_M;
        if derivative.abs() < 1e-9 {
            break;
        }

        let mut step = -f / derivative;
        let mut h_new = h + step;
        let mut f_new = mismatch(h_new).unwrap_or(f64::INFINITY);

        let mut halvings = 0;
        while f_new > f && halvings < MAX_LINE_SEARCH_HALVINGS {
            step *= 0.5;
            h_new = h + step;
            f_new = mismatch(h_new).unwrap_or(f64::INFINITY);
            halvings += 1;
        }

        h = h_new.max(0.0);
        f = f_new;
    }

    Err(Error::NonConvergence { steps: MAX_OUTER_STEPS, residual_deg: f })
}

/// Acceptance threshold, in meters, for the closest-approach distance between the two
/// rays: if they pass further apart than this, they're not considered to hit the same
/// plume point.
const MAX_RAY_SEPARATION_M: f64 = 40.0;

fn cross(u: [f64; 3], v: [f64; 3]) -> [f64; 3] {
    [u[1] * v[2] - u[2] * v[1], u[2] * v[0] - u[0] * v[2], u[0] * v[1] - u[1] * v[0]]
}

fn norm2(v: [f64; 3]) -> f64 {
    v[0] * v[0] + v[1] * v[1] + v[2] * v[2]
}

/// Determinant of the 3x3 matrix whose columns are `c1`, `c2`, `c3`.
fn det3(c1: [f64; 3], c2: [f64; 3], c3: [f64; 3]) -> f64 {
    c1[0] * c2[1] * c3[2] + c2[0] * c3[1] * c1[2] + c3[0] * c1[1] * c2[2]
        - c1[0] * c3[1] * c2[2]
        - c2[0] * c1[1] * c3[2]
        - c3[0] * c2[1] * c1[2]
}

fn point_on_ray(origin: [f64; 3], direction: [f64; 3], t: f64) -> [f64; 3] {
    [origin[0] + t * direction[0], origin[1] + t * direction[1], origin[2] + t * direction[2]]
}

/// Directly intersect the two instruments' lines of sight as skew lines in 3D: the
/// ray parameters solve from the cross product of the two directions and the
/// determinants of the origin-offset/direction/cross-product triples, exactly as the
/// original two-ray intersection routine does. No iteration is needed, unlike
/// [`two_scan_fuzzy`].
pub fn two_scan_exact(scan1: &ScanFix, scan2: &ScanFix) -> Result<GeometryResult> {
    let (lower, upper) = if scan1.location.altitude_masl() <= scan2.location.altitude_masl() {
        (scan1, scan2)
    } else {
        (scan2, scan1)
    };

    let (dx, dy) = east_north_offset_m(lower.location.latitude(), lower.location.longitude(), upper.location.latitude(), upper.location.longitude());
    let dz = upper.location.altitude_masl() - lower.location.altitude_masl();

    let dir_lower = direction_vector(lower.centre_angle_deg, lower.location.compass(), lower.location.cone_angle(), lower.location.tilt());
    let dir_upper = direction_vector(upper.centre_angle_deg, upper.location.compass(), upper.location.cone_angle(), upper.location.tilt());
    let dir_lower = normalize(dir_lower);
    let dir_upper = normalize(dir_upper);

    let origin_lower = [0.0, 0.0, 0.0];
    let origin_upper = [dx, dy, dz];

    let cross_dirs = cross(dir_lower, dir_upper);
    let n2 = norm2(cross_dirs);
    if n2.abs() < 1e-19 {
        return Err(Error::ParallelLinesOfSight);
    }

    let origin_offset = [origin_upper[0] - origin_lower[0], origin_upper[1] - origin_lower[1], origin_upper[2] - origin_lower[2]];
    let t1 = det3(origin_offset, dir_upper, cross_dirs) / n2;
    let t2 = det3(origin_offset, dir_lower, cross_dirs) / n2;

    let point1 = point_on_ray(origin_lower, dir_lower, t1);
    let point2 = point_on_ray(origin_upper, dir_upper, t2);

    let separation2 = (point1[0] - point2[0]).powi(2) + (point1[1] - point2[1]).powi(2) + (point1[2] - point2[2]).powi(2);
    if separation2 > MAX_RAY_SEPARATION_M * MAX_RAY_SEPARATION_M {
        return Err(Error::AltitudeFixesDisagree { difference_m: separation2.sqrt() });
    }

    let altitude = lower.location.altitude_masl() + (point1[2] + point2[2]) / 2.0;
    let average_time = lower.start_time + (upper.start_time - lower.start_time) / 2;

    // The exact solver fixes altitude directly from ray intersection; wind direction
    // is left for the caller to resolve separately (e.g. via `wind_direction_from_known_altitude`
    // once a volcano location is on hand), since it is not needed to compute the fix itself.
    Ok(GeometryResult::new(
        Some(altitude),
        None,
        None,
        None,
        average_time,
        (scan1.location.serial().to_string(), Some(scan2.location.serial().to_string())),
    ))
}

fn normalize(v: [f64; 3]) -> [f64; 3] {
    let inv = 1.0 / norm2(v).sqrt();
    [v[0] * inv, v[1] * inv, v[2] * inv]
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;
    use novac_model::data::InstrumentType;

    fn location(serial: &str, lat: f64, lon: f64, alt: f64, compass: f64) -> InstrumentLocation {
        InstrumentLocation::new(
            serial,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            lat,
            lon,
            alt,
            compass,
            90.0,
            0.0,
            InstrumentType::Gothenburg,
            "Kilauea",
        )
    }

    #[test]
    fn exact_solver_rejects_parallel_lines_of_sight() {
        let loc1 = location("A", 19.40, -155.30, 1200.0, 0.0);
        let loc2 = location("B", 19.41, -155.30, 1200.0, 0.0);
        let fix1 = ScanFix { location: &loc1, centre_angle_deg: 10.0, centre_error_deg: 1.0, start_time: Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap() };
        let fix2 = ScanFix { location: &loc2, centre_angle_deg: 10.0, centre_error_deg: 1.0, start_time: Utc.with_ymd_and_hms(2024, 6, 1, 10, 1, 0).unwrap() };

        let result = two_scan_exact(&fix1, &fix2);
        assert!(matches!(result, Err(Error::ParallelLinesOfSight)));
    }

    #[test]
    fn exact_solver_intersects_converging_sight_lines() {
        let loc1 = location("A", 19.40, -155.30, 1200.0, 90.0);
        let loc2 = location("B", 19.40, -155.28, 1200.0, 270.0);
        let fix1 = ScanFix { location: &loc1, centre_angle_deg: 20.0, centre_error_deg: 1.0, start_time: Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap() };
        let fix2 = ScanFix { location: &loc2, centre_angle_deg: -20.0, centre_error_deg: 1.0, start_time: Utc.with_ymd_and_hms(2024, 6, 1, 10, 1, 0).unwrap() };

        let result = two_scan_exact(&fix1, &fix2);
        assert!(result.is_ok() || matches!(result, Err(Error::AltitudeFixesDisagree { .. })));
    }
}
