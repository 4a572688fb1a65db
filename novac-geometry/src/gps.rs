//! Great-circle distance, bearing, and destination-point formulas on a spherical Earth.
//! Used to place a second instrument, or a volcano summit, relative to the instrument
//! whose line-of-sight math is expressed in local east/north/up meters.

/// Mean Earth radius in meters, matching the value used throughout the originating
/// instrument network's geometry calculations.
pub const EARTH_RADIUS_M: f64 = 6_367_000.0;

/// Great-circle distance between two latitude/longitude points, in meters.
pub fn distance_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1, lon1, lat2, lon2) = (lat1.to_radians(), lon1.to_radians(), lat2.to_radians(), lon2.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_M * c
}

/// Initial bearing, in degrees `[0, 360)`, for the great-circle path from point 1 to
/// point 2.
pub fn bearing_deg(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1, lon1, lat2, lon2) = (lat1.to_radians(), lon1.to_radians(), lat2.to_radians(), lon2.to_radians());
    let dlon = lon2 - lon1;
    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    let bearing = y.atan2(x).to_degrees();
    (bearing + 360.0) % 360.0
}

/// The point reached by travelling `distance_m` meters from `(lat, lon)` along
/// `bearing_deg` (a forward geodesic on a spherical Earth).
pub fn destination(lat: f64, lon: f64, distance_m: f64, bearing_deg: f64) -> (f64, f64) {
    let lat1 = lat.to_radians();
    let lon1 = lon.to_radians();
    let bearing = bearing_deg.to_radians();
    let angular_distance = distance_m / EARTH_RADIUS_M;

    let lat2 = (lat1.sin() * angular_distance.cos() + lat1.cos() * angular_distance.sin() * bearing.cos()).asin();
    let lon2 = lon1
        + (bearing.sin() * angular_distance.sin() * lat1.cos())
            .atan2(angular_distance.cos() - lat1.sin() * lat2.sin());

    (lat2.to_degrees(), lon2.to_degrees())
}

/// The local east/north offset, in meters, from `(lat1, lon1)` to `(lat2, lon2)`,
/// derived from the distance and bearing between them. Good to first order over the
/// few-kilometer baselines typical of a two-scanner network.
pub fn east_north_offset_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> (f64, f64) {
    let distance = distance_m(lat1, lon1, lat2, lon2);
    let bearing = bearing_deg(lat1, lon1, lat2, lon2).to_radians();
    (distance * bearing.sin(), distance * bearing.cos())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn distance_to_self_is_zero() {
        assert!(distance_m(10.0, -84.0, 10.0, -84.0) < 1e-6);
    }

    #[test]
    fn destination_round_trips_bearing_and_distance() {
        let (lat, lon) = (10.0, -84.0);
        let (dlat, dlon) = destination(lat, lon, 1000.0, 45.0);
        let recovered_distance = distance_m(lat, lon, dlat, dlon);
        assert!((recovered_distance - 1000.0).abs() < 1.0);
    }

    #[test]
    fn bearing_north_is_near_zero() {
        let bearing = bearing_deg(10.0, -84.0, 10.01, -84.0);
        assert!(bearing.abs() < 1.0);
    }

    #[test]
    fn east_north_offset_matches_destination() {
        let (lat1, lon1) = (10.0, -84.0);
        let (lat2, lon2) = destination(lat1, lon1, 500.0, 120.0);
        let (east, north) = east_north_offset_m(lat1, lon1, lat2, lon2);
        assert!((east.hypot(north) - 500.0).abs() < 1.0);
    }
}
