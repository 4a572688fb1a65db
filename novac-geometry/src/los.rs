//! Line-of-sight direction vectors for a scanning instrument: the local cone/tilt
//! geometry folded together with the instrument's compass heading, expressed as an
//! east/north/up vector whose vertical component is normalized to 1 so that the ray
//! parameter directly measures height gained.

/// The horizontal (east, north) and vertical (always 1) components of the line of
/// sight at `scan_angle_deg` for an instrument with the given `compass_deg` heading,
/// `cone_angle_deg` (90 degrees for a flat scanner), and `tilt_deg`.
///
/// Mirrors the conical-scanner projection formula: a flat scanner's near-infinite
/// `tan(cone_angle)` falls out of the division naturally, so no special case is needed.
pub fn direction_vector(scan_angle_deg: f64, compass_deg: f64, cone_angle_deg: f64, tilt_deg: f64) -> [f64; 3] {
    let alpha = scan_angle_deg.to_radians();
    let tilt = tilt_deg.to_radians();
    let cone = cone_angle_deg.to_radians();

    let cos_alpha = alpha.cos();
    let sin_alpha = alpha.sin();
    let cos_tilt = tilt.cos();
    let sin_tilt = tilt.sin();
    let cot_cone = cone.cos() / cone.sin();

    let divisor = cos_alpha * cos_tilt + sin_tilt * cot_cone;
    let local = [(cot_cone * cos_tilt - cos_alpha * sin_tilt) / divisor, sin_alpha / divisor, 1.0];

    rotate_by_compass(local, compass_deg)
}

/// Rotate a local line-of-sight vector about the vertical axis by the instrument's
/// compass heading (degrees clockwise from north), mapping the local x/y plane into
/// geographic east/north.
pub fn rotate_by_compass(v: [f64; 3], compass_deg: f64) -> [f64; 3] {
    let compass = compass_deg.to_radians();
    let east = v[0] * compass.sin() + v[1] * compass.cos();
    let north = v[0] * compass.cos() - v[1] * compass.sin();
    [east, north, v[2]]
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn flat_scanner_centre_angle_points_straight_up() {
        let dir = direction_vector(0.0, 0.0, 90.0, 0.0);
        assert!(dir[0].abs() < 1e-6);
        assert!(dir[1].abs() < 1e-6);
        assert!((dir[2] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn rotation_preserves_vertical_component() {
        let v = [1.0, 0.5, 1.0];
        let rotated = rotate_by_compass(v, 37.0);
        assert!((rotated[2] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn rotation_by_zero_compass_is_a_reflection_of_east_and_north() {
        let v = [1.0, 2.0, 1.0];
        let rotated = rotate_by_compass(v, 0.0);
        assert!((rotated[0] - 2.0).abs() < 1e-9);
        assert!((rotated[1] - 1.0).abs() < 1e-9);
    }
}
