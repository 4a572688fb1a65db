//! Single-instrument plume geometry: given either a known wind direction or a known
//! plume altitude, reconstruct the other from one scan's line of sight and the
//! instrument-to-volcano baseline.

use novac_model::meta::InstrumentLocation;

use crate::gps::{bearing_deg, destination, east_north_offset_m};
use crate::los::direction_vector;
use crate::result::{Error, Result};

/// Denominator magnitude below which the line of sight is judged parallel to the wind
/// direction line, making the known-wind altitude solve degenerate.
const MIN_DENOMINATOR: f64 = 0.001;

/// Reconstruct plume altitude from one scan's line of sight and a known wind
/// direction: intersect the line of sight with the line through the volcano summit
/// running along the wind direction.
pub fn altitude_from_known_wind(
    location: &InstrumentLocation,
    centre_angle_deg: f64,
    volcano_lat: f64,
    volcano_lon: f64,
    wind_direction_deg: f64,
) -> Result<f64> {
    let dir = direction_vector(centre_angle_deg, location.compass(), location.cone_angle(), location.tilt());
    let (sx, sy) = east_north_offset_m(location.latitude(), location.longitude(), volcano_lat, volcano_lon);

    let wd = wind_direction_deg.to_radians();
    let (sin_wd, cos_wd) = (wd.sin(), wd.cos());

    let denominator = dir[0] * sin_wd - dir[1] * cos_wd;
    if denominator.abs() < MIN_DENOMINATOR {
        return Err(Error::DegenerateSightLine);
    }

    let t = (sx * sin_wd - sy * cos_wd) / denominator;
    if t <= 0.0 {
        return Err(Error::NonPositiveRelativeAltitude);
    }

    Ok(location.altitude_masl() + t)
}

/// Reconstruct wind direction from one scan's line of sight and a known plume
/// altitude: the bearing from the line-of-sight's ground intersection point back
/// toward the volcano summit.
pub fn wind_direction_from_known_altitude(
    location: &InstrumentLocation,
    centre_angle_deg: f64,
    volcano_lat: f64,
    volcano_lon: f64,
    plume_altitude_masl: f64,
) -> Result<f64> {
    let relative_altitude = plume_altitude_masl - location.altitude_masl();
    if relative_altitude <= 0.0 {
        return Err(Error::NonPositiveRelativeAltitude);
    }

    let dir = direction_vector(centre_angle_deg, location.compass(), location.cone_angle(), location.tilt());
    let (east, north) = (relative_altitude * dir[0], relative_altitude * dir[1]);
    let horizontal_distance = east.hypot(north);
    let bearing = (east.atan2(north).to_degrees() + 360.0) % 360.0;

    let (point_lat, point_lon) = destination(location.latitude(), location.longitude(), horizontal_distance, bearing);

    Ok(bearing_deg(point_lat, point_lon, volcano_lat, volcano_lon))
}

/// Estimated error on a single-instrument reconstruction, propagated from the plume
/// centre's angular uncertainty by perturbing the centre angle by plus/minus its error
/// and taking the average absolute deviation of the reconstructed quantity.
pub fn altitude_error_from_known_wind(
    location: &InstrumentLocation,
    centre_angle_deg: f64,
    centre_error_deg: f64,
    volcano_lat: f64,
    volcano_lon: f64,
    wind_direction_deg: f64,
) -> Option<f64> {
    let base = altitude_from_known_wind(location, centre_angle_deg, volcano_lat, volcano_lon, wind_direction_deg).ok()?;
    let low = altitude_from_known_wind(location, centre_angle_deg - centre_error_deg, volcano_lat, volcano_lon, wind_direction_deg).ok()?;
    let high = altitude_from_known_wind(location, centre_angle_deg + centre_error_deg, volcano_lat, volcano_lon, wind_direction_deg).ok()?;
    Some(((base - low).abs() + (high - base).abs()) / 2.0)
}

/// Estimated error on a single-instrument wind-direction reconstruction, with the same
/// perturbation approach as [`altitude_error_from_known_wind`], floored at 5 degrees
/// to reflect the coarsest resolvable wind-direction precision.
pub fn wind_direction_error_from_known_altitude(
    location: &InstrumentLocation,
    centre_angle_deg: f64,
    centre_error_deg: f64,
    volcano_lat: f64,
    volcano_lon: f64,
    plume_altitude_masl: f64,
) -> Option<f64> {
    let base = wind_direction_from_known_altitude(location, centre_angle_deg, volcano_lat, volcano_lon, plume_altitude_masl).ok()?;
    let low = wind_direction_from_known_altitude(location, centre_angle_deg - centre_error_deg, volcano_lat, volcano_lon, plume_altitude_masl).ok()?;
    let high = wind_direction_from_known_altitude(location, centre_angle_deg + centre_error_deg, volcano_lat, volcano_lon, plume_altitude_masl).ok()?;

    let circular_delta = |a: f64, b: f64| {
        let mut d = (a - b).abs() % 360.0;
        if d > 180.0 {
            d = 360.0 - d;
        }
        d
    };

    let error = (circular_delta(base, low) + circular_delta(high, base)) / 2.0;
    Some(error.max(5.0))
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{TimeZone, Utc};
    use novac_model::data::InstrumentType;

    fn location() -> InstrumentLocation {
        InstrumentLocation::new(
            "D2J123",
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            19.40,
            -155.30,
            1200.0,
            0.0,
            90.0,
            0.0,
            InstrumentType::Gothenburg,
            "Kilauea",
        )
    }

    #[test]
    fn known_altitude_round_trips_through_known_wind() {
        let location = location();
        let volcano = (19.42, -155.30);
        let altitude = 2500.0;

        let wind = wind_direction_from_known_altitude(&location, 15.0, volcano.0, volcano.1, altitude).expect("should resolve");
        let recovered_altitude = altitude_from_known_wind(&location, 15.0, volcano.0, volcano.1, wind).expect("should resolve");

        assert!((recovered_altitude - altitude).abs() < 5.0);
    }

    #[test]
    fn non_positive_relative_altitude_is_rejected() {
        let location = location();
        let result = wind_direction_from_known_altitude(&location, 15.0, 19.42, -155.30, 800.0);
        assert!(matches!(result, Err(Error::NonPositiveRelativeAltitude)));
    }
}
