//! Sub-pixel resampling of reference cross sections.
//!
//! The DOAS model needs to evaluate each reference at a shifted and squeezed pixel
//! grid on every outer solver iteration. A natural cubic spline through the reference's
//! tabulated values gives a smooth, twice-differentiable interpolant suitable for that,
//! playing the same role the original evaluator's B-spline interpolation does.

/// A natural cubic spline interpolant over evenly spaced samples at integer x
/// coordinates `0..values.len()`.
#[derive(Debug, Clone)]
pub struct CubicSpline {
    values: Vec<f64>,
    second_derivatives: Vec<f64>,
}

impl CubicSpline {
    pub fn new(values: &[f64]) -> Self {
        let n = values.len();
        let second_derivatives = if n < 3 {
            vec![0.0; n]
        } else {
            solve_natural_spline(values)
        };
        Self {
            values: values.to_vec(),
            second_derivatives,
        }
    }

    /// Evaluate the spline at real-valued coordinate `x`, clamping to the first/last
    /// sample outside `[0, len-1]`.
    pub fn eval(&self, x: f64) -> f64 {
        let n = self.values.len();
        if n == 0 {
            return 0.0;
        }
        if n == 1 || x <= 0.0 {
            return self.values[0];
        }
        let last = (n - 1) as f64;
        if x >= last {
            return self.values[n - 1];
        }

        let i = x.floor() as usize;
        let i = i.min(n - 2);
        let t = x - i as f64;
        let t1 = 1.0 - t;

        let y0 = self.values[i];
        let y1 = self.values[i + 1];
        let k0 = self.second_derivatives[i];
        let k1 = self.second_derivatives[i + 1];

        t1 * y0
            + t * y1
            + (t1.powi(3) - t1) * k0 / 6.0
            + (t.powi(3) - t) * k1 / 6.0
    }

    /// Evaluate the spline at a shifted and squeezed pixel index: the value a reference
    /// contributes to output pixel `pixel` once it has been registered with `shift`
    /// (sub-pixel offset) and `squeeze` (stretch factor, 1.0 = no squeeze).
    pub fn eval_shifted(&self, pixel: usize, shift: f64, squeeze: f64) -> f64 {
        let squeeze = if squeeze.abs() < 1e-9 { 1.0 } else { squeeze };
        self.eval(pixel as f64 * squeeze - shift)
    }
}

/// Solve the natural-cubic-spline tridiagonal system for second derivatives at each
/// knot with the Thomas algorithm. The system is tridiagonal by construction (each
/// knot's equation only couples to its immediate neighbors), so this is O(n) against
/// a fit window of a few thousand pixels, where a dense `nalgebra` solve would be
/// O(n^3).
fn solve_natural_spline(values: &[f64]) -> Vec<f64> {
    let n = values.len();

    let mut lower = vec![0.0; n];
    let mut diag = vec![0.0; n];
    let mut upper = vec![0.0; n];
    let mut rhs = vec![0.0; n];

    diag[0] = 1.0;
    diag[n - 1] = 1.0;

    for i in 1..n - 1 {
        lower[i] = 1.0;
        diag[i] = 4.0;
        upper[i] = 1.0;
        rhs[i] = 6.0 * (values[i - 1] - 2.0 * values[i] + values[i + 1]);
    }

    // Forward elimination.
    for i in 1..n {
        let pivot = diag[i - 1];
        if pivot.abs() < 1e-300 {
            return vec![0.0; n];
        }
        let factor = lower[i] / pivot;
        diag[i] -= factor * upper[i - 1];
        rhs[i] -= factor * rhs[i - 1];
    }

    // Back substitution.
    let mut solution = vec![0.0; n];
    solution[n - 1] = rhs[n - 1] / diag[n - 1];
    for i in (0..n - 1).rev() {
        solution[i] = (rhs[i] - upper[i] * solution[i + 1]) / diag[i];
    }

    solution
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn spline_reproduces_samples_at_knots() {
        let values = vec![0.0, 1.0, 4.0, 9.0, 16.0];
        let spline = CubicSpline::new(&values);
        for (i, value) in values.iter().enumerate() {
            assert!((spline.eval(i as f64) - value).abs() < 1e-6);
        }
    }

    #[test]
    fn spline_clamps_outside_domain() {
        let values = vec![1.0, 2.0, 3.0];
        let spline = CubicSpline::new(&values);
        assert_eq!(spline.eval(-5.0), 1.0);
        assert_eq!(spline.eval(50.0), 3.0);
    }

    #[test]
    fn eval_shifted_applies_squeeze_and_shift() {
        let values = vec![0.0, 1.0, 2.0, 3.0, 4.0];
        let spline = CubicSpline::new(&values);
        assert!((spline.eval_shifted(2, 0.0, 1.0) - 2.0).abs() < 1e-6);
        assert!((spline.eval_shifted(2, 1.0, 1.0) - 1.0).abs() < 1e-6);
    }
}
