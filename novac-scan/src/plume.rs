//! Plume detection: given a scan's column-vs-angle series, locate the plume (if any),
//! estimate its centre, edges, and completeness, and estimate the measurement offset.

use novac_model::data::PlumeInScanProperty;

/// Minimum number of good points required on either side of center, and required in
/// total, before an offset or completeness estimate is attempted.
const MIN_GOOD_POINTS: usize = 5;
/// Minimum width, in points, of a candidate plume interval.
const MIN_INTERVAL_WIDTH: usize = 5;
/// The detection threshold is this many multiples of the mean column error.
const DETECTION_THRESHOLD_FACTOR: f64 = 5.0;
/// e^-1, the fraction of peak column that defines the plume edges.
const EDGE_FRACTION: f64 = 0.367_879_441;
/// Fraction of peak column used to bound the centre-error estimate.
const CENTRE_ERROR_FRACTION: f64 = 0.9;

/// One aligned measurement: viewing angle(s), fitted column and its error, and whether
/// the point passed fit-quality judgment.
#[derive(Debug, Clone, Copy)]
pub struct ColumnPoint {
    pub angle: f64,
    pub azimuth: Option<f64>,
    pub column: f64,
    pub column_error: f64,
    pub is_good: bool,
}

/// The measurement offset: the average of the lowest 20% of good columns (at least 3),
/// or 0.0 if fewer than [`MIN_GOOD_POINTS`] good points exist.
pub fn estimate_offset(points: &[ColumnPoint]) -> f64 {
    let mut good: Vec<f64> = points.iter().filter(|p| p.is_good).map(|p| p.column).collect();
    if good.len() < MIN_GOOD_POINTS {
        return 0.0;
    }
    good.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let take = ((good.len() as f64 * 0.2).floor() as usize).max(3);
    let take = take.min(good.len());
    good[..take].iter().sum::<f64>() / take as f64
}

/// Locate the plume in `points`, if any, and compute its shape properties.
pub fn detect_plume(points: &[ColumnPoint]) -> PlumeInScanProperty {
    let good_indices: Vec<usize> = points
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_good)
        .map(|(i, _)| i)
        .collect();

    if good_indices.len() < MIN_GOOD_POINTS {
        return PlumeInScanProperty::none();
    }

    let min_good_column = good_indices
        .iter()
        .map(|&i| points[i].column)
        .fold(f64::INFINITY, f64::min);

    let shifted: Vec<f64> = points.iter().map(|p| p.column - min_good_column).collect();

    let mean_error: f64 = good_indices.iter().map(|&i| points[i].column_error).sum::<f64>() / good_indices.len() as f64;
    let threshold = DETECTION_THRESHOLD_FACTOR * mean_error;

    let n = points.len();
    let mut best_score = f64::NEG_INFINITY;
    let mut best_range: Option<(usize, usize)> = None;

    for start in 0..n {
        for end in (start + MIN_INTERVAL_WIDTH)..=n {
            let inside_good: Vec<usize> = good_indices.iter().cloned().filter(|&i| i >= start && i < end).collect();
            let outside_good: Vec<usize> = good_indices.iter().cloned().filter(|&i| i < start || i >= end).collect();

            if inside_good.len() < MIN_INTERVAL_WIDTH || outside_good.len() < MIN_GOOD_POINTS {
                continue;
            }

            let inside_mean: f64 = inside_good.iter().map(|&i| shifted[i]).sum::<f64>() / inside_good.len() as f64;
            let outside_mean: f64 = outside_good.iter().map(|&i| shifted[i]).sum::<f64>() / outside_good.len() as f64;
            let score = inside_mean - outside_mean;

            if score > best_score {
                best_score = score;
                best_range = Some((start, end));
            }
        }
    }

    let Some((start, end)) = best_range else {
        return PlumeInScanProperty::none();
    };
    if best_score <= threshold {
        return PlumeInScanProperty::none();
    }

    let inside_good: Vec<usize> = good_indices.iter().cloned().filter(|&i| i >= start && i < end).collect();

    let peak = inside_good.iter().map(|&i| shifted[i]).fold(f64::MIN, f64::max);

    let weighted_sum: f64 = inside_good.iter().map(|&i| points[i].angle * shifted[i].max(0.0)).sum();
    let weight_total: f64 = inside_good.iter().map(|&i| shifted[i].max(0.0)).sum();
    let centre_angle = if weight_total > 0.0 { weighted_sum / weight_total } else { points[inside_good[len_mid(&inside_good)]].angle };

    let centre_azimuth = points[inside_good[0]].azimuth.map(|_| {
        let weighted: f64 = inside_good
            .iter()
            .filter_map(|&i| points[i].azimuth.map(|a| a * shifted[i].max(0.0)))
            .sum();
        if weight_total > 0.0 { weighted / weight_total } else { 0.0 }
    });

    let edge_level = peak * EDGE_FRACTION;
    let low_edge = inside_good
        .iter()
        .cloned()
        .find(|&i| shifted[i] >= edge_level)
        .map(|i| points[i].angle)
        .unwrap_or(points[start.min(n - 1)].angle);
    let high_edge = inside_good
        .iter()
        .rev()
        .cloned()
        .find(|&i| shifted[i] >= edge_level)
        .map(|i| points[i].angle)
        .unwrap_or(points[(end.saturating_sub(1)).min(n - 1)].angle);

    let centre_level = peak * CENTRE_ERROR_FRACTION;
    let ninety_low = inside_good
        .iter()
        .cloned()
        .find(|&i| shifted[i] >= centre_level)
        .map(|i| points[i].angle)
        .unwrap_or(low_edge);
    let ninety_high = inside_good
        .iter()
        .rev()
        .cloned()
        .find(|&i| shifted[i] >= centre_level)
        .map(|i| points[i].angle)
        .unwrap_or(high_edge);
    let centre_error = (ninety_high - ninety_low).abs() / 2.0;

    let completeness = estimate_completeness(points, &good_indices, peak);

    PlumeInScanProperty::new(
        [centre_angle, centre_azimuth.unwrap_or(0.0)],
        [centre_error, centre_error],
        low_edge,
        high_edge,
        completeness,
        estimate_offset(points),
    )
}

fn len_mid(indices: &[usize]) -> usize {
    indices.len() / 2
}

/// `1 - 0.5 * max(mean(5 leftmost good), mean(5 rightmost good)) / max_column`, clamped
/// to 1.0. Requires at least five good points on each side; otherwise treated as no
/// plume (completeness 0.0) by the caller via [`detect_plume`]'s overall acceptance.
fn estimate_completeness(points: &[ColumnPoint], good_indices: &[usize], peak: f64) -> f64 {
    if good_indices.len() < 2 * MIN_GOOD_POINTS || peak <= 0.0 {
        return 0.0;
    }
    let left_five: f64 = good_indices[..MIN_GOOD_POINTS].iter().map(|&i| points[i].column).sum::<f64>() / MIN_GOOD_POINTS as f64;
    let right_five: f64 = good_indices[good_indices.len() - MIN_GOOD_POINTS..]
        .iter()
        .map(|&i| points[i].column)
        .sum::<f64>()
        / MIN_GOOD_POINTS as f64;

    let max_column = good_indices.iter().map(|&i| points[i].column).fold(f64::MIN, f64::max);
    if max_column <= 0.0 {
        return 0.0;
    }

    (1.0 - 0.5 * left_five.max(right_five) / max_column).min(1.0)
}

#[cfg(test)]
mod test {
    use super::*;

    fn gaussian_scan(peak_angle: f64, width: f64, n: usize) -> Vec<ColumnPoint> {
        (0..n)
            .map(|i| {
                let angle = -60.0 + i as f64 * (120.0 / (n - 1) as f64);
                let x = (angle - peak_angle) / width;
                let column = 500.0 * (-x * x).exp();
                ColumnPoint { angle, azimuth: None, column, column_error: 2.0, is_good: true }
            })
            .collect()
    }

    #[test]
    fn all_bad_points_yield_no_plume() {
        let mut points = gaussian_scan(10.0, 20.0, 45);
        for p in points.iter_mut() {
            p.is_good = false;
        }
        let plume = detect_plume(&points);
        assert!(!plume.is_plume_found());
        assert_eq!(estimate_offset(&points), 0.0);
    }

    #[test]
    fn exactly_five_good_points_is_below_minimum_for_plume() {
        let mut points = gaussian_scan(10.0, 20.0, 45);
        for (i, p) in points.iter_mut().enumerate() {
            p.is_good = i < 5;
        }
        let plume = detect_plume(&points);
        assert!(!plume.is_plume_found());
    }

    #[test]
    fn ideal_gaussian_plume_is_detected_near_peak() {
        let points = gaussian_scan(10.0, 20.0, 45);
        let plume = detect_plume(&points);
        assert!(plume.is_plume_found());
        assert!((plume.centre()[0] - 10.0).abs() < 3.0);
        assert!(plume.low_edge() < plume.centre()[0]);
        assert!(plume.high_edge() > plume.centre()[0]);
    }
}
