//! The nonlinear least-squares core: a Levenberg-Marquardt search over each
//! reference's shift and squeeze, with the linear amplitudes (column densities plus the
//! polynomial background) solved exactly at every outer step. This separable structure
//! mirrors the original evaluator's coupling of an external nonlinear optimizer with a
//! linear least-squares inner loop.

use nalgebra::{DMatrix, DVector};

use novac_model::data::{FitWindow, ParameterPolicy, ReferenceResult};

use crate::result::{Error, Result};
use crate::spline::CubicSpline;

/// Tuning knobs for the outer Levenberg-Marquardt search.
#[derive(Debug, Clone, Copy)]
pub struct SolverConfig {
    pub max_steps: u32,
    pub min_chi_square_delta: f64,
    pub initial_damping: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_steps: 1000,
            min_chi_square_delta: 1e-4,
            initial_damping: 1e-2,
        }
    }
}

/// One reference's nonlinear parameter state during the search.
#[derive(Debug, Clone, Copy)]
struct NonlinearParam {
    reference_index: usize,
    is_shift: bool,
    value: f64,
    low: f64,
    high: f64,
}

/// The outcome of a converged (or exhausted) solve.
pub struct SolveOutcome {
    pub reference_results: Vec<ReferenceResult>,
    pub polynomial_coefficients: Vec<f64>,
    pub chi_square: f64,
    pub delta: f64,
    pub step_count: u32,
}

/// Solve a separable DOAS fit of `target` (the preconditioned measurement-minus-sky
/// vector) against `window`'s references, using pre-built spline interpolants for each
/// reference's cross section.
pub fn solve(window: &FitWindow, splines: &[CubicSpline], target: &[f64], config: SolverConfig) -> Result<SolveOutcome> {
    let references = window.references();
    if references.is_empty() {
        return Err(Error::ReferencesNotInitialized);
    }

    let n = target.len();
    let poly_order = window.polynomial_order();
    let poly_terms = poly_order + 1;

    let mut params = initial_params(references);

    let mut damping = config.initial_damping;
    let mut prev_chi_square = f64::MAX;
    let mut last_linear = linear_solve(references, splines, &params, target, n, poly_terms)?;
    let mut step = 0;

    while step < config.max_steps {
        let residual = residual_vector(references, splines, &params, &last_linear, target, n, poly_terms);
        let chi_square = residual.norm_squared() / (n as f64 - (params.len() + poly_terms) as f64).max(1.0);

        if (prev_chi_square - chi_square).abs() < config.min_chi_square_delta {
            let delta = residual.norm() / (n as f64).sqrt();
            let params_variance = nonlinear_covariance_diag(references, splines, &params, target, n, poly_terms);
            return Ok(build_outcome(references, &params, &params_variance, &last_linear, chi_square, delta, step));
        }

        if params.is_empty() {
            // No nonlinear parameters to search: the linear solve is the whole answer.
            let delta = residual.norm() / (n as f64).sqrt();
            return Ok(build_outcome(references, &params, &[], &last_linear, chi_square, delta, step));
        }

        let jacobian = numeric_jacobian(references, splines, &params, target, n, poly_terms);
        let jt_j = &jacobian.transpose() * &jacobian;
        let jt_r = jacobian.transpose() * &residual;

        let mut accepted = false;
        for _ in 0..30 {
            let mut damped = jt_j.clone();
            for i in 0..damped.nrows() {
                damped[(i, i)] += damping * damped[(i, i)].max(1e-6);
            }
            let step_vec = match damped.clone().lu().solve(&jt_r) {
                Some(s) => s,
                None => {
                    damping *= 10.0;
                    continue;
                }
            };

            let mut candidate = params.clone();
            for (p, delta) in candidate.iter_mut().zip(step_vec.iter()) {
                p.value = clamp_param(p.value - delta, p.low, p.high);
            }

            let candidate_linear = linear_solve(references, splines, &candidate, target, n, poly_terms)?;
            let candidate_residual = residual_vector(references, splines, &candidate, &candidate_linear, target, n, poly_terms);
            let candidate_chi_square =
                candidate_residual.norm_squared() / (n as f64 - (candidate.len() + poly_terms) as f64).max(1.0);

            if candidate_chi_square < chi_square {
                params = candidate;
                last_linear = candidate_linear;
                prev_chi_square = chi_square;
                damping = (damping * 0.5).max(1e-8);
                accepted = true;
                break;
            } else {
                damping *= 4.0;
            }
        }

        if !accepted {
            prev_chi_square = chi_square;
        }

        step += 1;
    }

    let residual = residual_vector(references, splines, &params, &last_linear, target, n, poly_terms);
    let chi_square = residual.norm_squared() / (n as f64 - (params.len() + poly_terms) as f64).max(1.0);
    Err(Error::NonConvergence { steps: step, chi_square })
}

fn clamp_param(value: f64, low: f64, high: f64) -> f64 {
    value.max(low).min(high)
}

fn initial_params(references: &[novac_model::data::Reference]) -> Vec<NonlinearParam> {
    let mut params = Vec::new();
    for (i, reference) in references.iter().enumerate() {
        if let ParameterPolicy::Free | ParameterPolicy::Limited { .. } = reference.shift_policy() {
            let (low, high) = bounds(reference.shift_policy());
            params.push(NonlinearParam { reference_index: i, is_shift: true, value: 0.0, low, high });
        }
        if let ParameterPolicy::Free | ParameterPolicy::Limited { .. } = reference.squeeze_policy() {
            let (low, high) = bounds(reference.squeeze_policy());
            params.push(NonlinearParam { reference_index: i, is_shift: false, value: 1.0, low, high });
        }
    }
    params
}

fn bounds(policy: &ParameterPolicy) -> (f64, f64) {
    match policy {
        ParameterPolicy::Limited { low, high } => (*low, *high),
        _ => (f64::NEG_INFINITY, f64::INFINITY),
    }
}

fn resolved_shift_squeeze(
    references: &[novac_model::data::Reference],
    params: &[NonlinearParam],
    index: usize,
) -> (f64, f64) {
    let shift = match references[index].shift_policy() {
        ParameterPolicy::Fixed(v) => *v,
        ParameterPolicy::LinkedTo(name) => {
            let target = references.iter().position(|r| r.name() == name).unwrap_or(index);
            resolved_shift_squeeze(references, params, target).0
        }
        _ => params
            .iter()
            .find(|p| p.reference_index == index && p.is_shift)
            .map(|p| p.value)
            .unwrap_or(0.0),
    };
    let squeeze = match references[index].squeeze_policy() {
        ParameterPolicy::Fixed(v) => *v,
        ParameterPolicy::LinkedTo(name) => {
            let target = references.iter().position(|r| r.name() == name).unwrap_or(index);
            resolved_shift_squeeze(references, params, target).1
        }
        _ => params
            .iter()
            .find(|p| p.reference_index == index && !p.is_shift)
            .map(|p| p.value)
            .unwrap_or(1.0),
    };
    (shift, squeeze)
}

/// Build the design matrix's reference columns (free-column references) plus the
/// polynomial basis, then solve for amplitudes by linear least squares.
struct LinearSolution {
    columns: Vec<f64>,
    polynomial: Vec<f64>,
    /// Unscaled column-amplitude variance, i.e. `(XᵀX)⁻¹`'s diagonal, one entry per
    /// reference (0.0 for a fixed-column reference). Multiply by the fit's σ² to get an
    /// actual variance.
    column_variance: Vec<f64>,
}

fn linear_solve(
    references: &[novac_model::data::Reference],
    splines: &[CubicSpline],
    params: &[NonlinearParam],
    target: &[f64],
    n: usize,
    poly_terms: usize,
) -> Result<LinearSolution> {
    let free_indices: Vec<usize> = references
        .iter()
        .enumerate()
        .filter(|(_, r)| !r.column_policy().is_fixed())
        .map(|(i, _)| i)
        .collect();

    let total_cols = free_indices.len() + poly_terms;
    let mut design = DMatrix::<f64>::zeros(n, total_cols);
    let mut rhs = DVector::<f64>::from_column_slice(target);

    for (col, &ref_index) in free_indices.iter().enumerate() {
        let (shift, squeeze) = resolved_shift_squeeze(references, params, ref_index);
        for row in 0..n {
            design[(row, col)] = splines[ref_index].eval_shifted(row, shift, squeeze);
        }
    }

    // Subtract the contribution of fixed-column references directly from the target.
    for (i, reference) in references.iter().enumerate() {
        if let ParameterPolicy::Fixed(amplitude) = reference.column_policy() {
            let (shift, squeeze) = resolved_shift_squeeze(references, params, i);
            for row in 0..n {
                rhs[row] -= amplitude * splines[i].eval_shifted(row, shift, squeeze);
            }
        }
    }

    for term in 0..poly_terms {
        let col = free_indices.len() + term;
        for row in 0..n {
            let x = row as f64 / n.max(1) as f64;
            design[(row, col)] = x.powi(term as i32);
        }
    }

    let design_t = design.transpose();
    let normal_matrix = &design_t * &design;
    let normal_rhs = &design_t * &rhs;

    let solution = normal_matrix
        .clone()
        .lu()
        .solve(&normal_rhs)
        .ok_or(Error::LinearAlgebraFailure)?;

    let mut columns = vec![0.0; references.len()];
    for (col, &ref_index) in free_indices.iter().enumerate() {
        columns[ref_index] = solution[col];
    }
    for (i, reference) in references.iter().enumerate() {
        if let ParameterPolicy::Fixed(amplitude) = reference.column_policy() {
            columns[i] = *amplitude;
        }
    }

    let polynomial = (0..poly_terms).map(|term| solution[free_indices.len() + term]).collect();

    let normal_inverse = normal_matrix.try_inverse();
    let mut column_variance = vec![0.0; references.len()];
    if let Some(inverse) = &normal_inverse {
        for (col, &ref_index) in free_indices.iter().enumerate() {
            column_variance[ref_index] = inverse[(col, col)].max(0.0);
        }
    }

    Ok(LinearSolution { columns, polynomial, column_variance })
}

fn model_vector(
    references: &[novac_model::data::Reference],
    splines: &[CubicSpline],
    params: &[NonlinearParam],
    linear: &LinearSolution,
    n: usize,
    poly_terms: usize,
) -> DVector<f64> {
    let mut model = DVector::<f64>::zeros(n);
    for (i, reference) in references.iter().enumerate() {
        let (shift, squeeze) = resolved_shift_squeeze(references, params, i);
        let amplitude = linear.columns[i];
        for row in 0..n {
            model[row] += amplitude * splines[i].eval_shifted(row, shift, squeeze);
        }
    }
    for term in 0..poly_terms {
        let coeff = linear.polynomial[term];
        for row in 0..n {
            let x = row as f64 / n.max(1) as f64;
            model[row] += coeff * x.powi(term as i32);
        }
    }
    model
}

fn residual_vector(
    references: &[novac_model::data::Reference],
    splines: &[CubicSpline],
    params: &[NonlinearParam],
    linear: &LinearSolution,
    target: &[f64],
    n: usize,
    poly_terms: usize,
) -> DVector<f64> {
    let model = model_vector(references, splines, params, linear, n, poly_terms);
    let target = DVector::<f64>::from_column_slice(target);
    target - model
}

fn numeric_jacobian(
    references: &[novac_model::data::Reference],
    splines: &[CubicSpline],
    params: &[NonlinearParam],
    target: &[f64],
    n: usize,
    poly_terms: usize,
) -> DMatrix<f64> {
    let mut jacobian = DMatrix::<f64>::zeros(n, params.len());
    let empty_linear = || LinearSolution {
        columns: vec![0.0; references.len()],
        polynomial: vec![0.0; poly_terms],
        column_variance: vec![0.0; references.len()],
    };
    let base_linear = linear_solve(references, splines, params, target, n, poly_terms).unwrap_or_else(|_| empty_linear());
    let base_residual = residual_vector(references, splines, params, &base_linear, target, n, poly_terms);

    for (col, param) in params.iter().enumerate() {
        let h = if param.is_shift { 1e-3 } else { 1e-4 };
        let mut perturbed = params.to_vec();
        perturbed[col].value = clamp_param(perturbed[col].value + h, perturbed[col].low, perturbed[col].high);

        let perturbed_linear =
            linear_solve(references, splines, &perturbed, target, n, poly_terms).unwrap_or_else(|_| empty_linear());
        let perturbed_residual = residual_vector(references, splines, &perturbed, &perturbed_linear, target, n, poly_terms);

        for row in 0..n {
            jacobian[(row, col)] = (perturbed_residual[row] - base_residual[row]) / h;
        }
    }

    jacobian
}

/// The nonlinear parameters' unscaled covariance diagonal, `(JᵀJ)⁻¹`, evaluated at
/// `params`. Same order as `params`; multiply by σ² for an actual variance.
fn nonlinear_covariance_diag(
    references: &[novac_model::data::Reference],
    splines: &[CubicSpline],
    params: &[NonlinearParam],
    target: &[f64],
    n: usize,
    poly_terms: usize,
) -> Vec<f64> {
    if params.is_empty() {
        return Vec::new();
    }
    let jacobian = numeric_jacobian(references, splines, params, target, n, poly_terms);
    let jt_j = jacobian.transpose() * &jacobian;
    match jt_j.try_inverse() {
        Some(inverse) => (0..params.len()).map(|i| inverse[(i, i)].max(0.0)).collect(),
        None => vec![0.0; params.len()],
    }
}

/// Standard error of a shift/squeeze parameter, propagated through `LinkedTo` chains by
/// attributing the linked-to reference's own error (its value is shared, so is its
/// uncertainty).
fn resolved_param_error(
    references: &[novac_model::data::Reference],
    params: &[NonlinearParam],
    params_variance: &[f64],
    sigma_squared: f64,
    index: usize,
    is_shift: bool,
) -> f64 {
    let policy = if is_shift { references[index].shift_policy() } else { references[index].squeeze_policy() };
    match policy {
        ParameterPolicy::Fixed(_) => 0.0,
        ParameterPolicy::LinkedTo(name) => {
            let target = references.iter().position(|r| r.name() == name).unwrap_or(index);
            resolved_param_error(references, params, params_variance, sigma_squared, target, is_shift)
        }
        _ => params
            .iter()
            .position(|p| p.reference_index == index && p.is_shift == is_shift)
            .map(|pos| (sigma_squared * params_variance[pos]).max(0.0).sqrt())
            .unwrap_or(0.0),
    }
}

fn build_outcome(
    references: &[novac_model::data::Reference],
    params: &[NonlinearParam],
    params_variance: &[f64],
    linear: &LinearSolution,
    chi_square: f64,
    delta: f64,
    step: u32,
) -> SolveOutcome {
    let sigma_squared = chi_square.max(0.0);
    let mut reference_results = Vec::with_capacity(references.len());
    for (i, _) in references.iter().enumerate() {
        let (shift, squeeze) = resolved_shift_squeeze(references, params, i);
        let column_error = (sigma_squared * linear.column_variance[i]).max(0.0).sqrt();
        let shift_error = resolved_param_error(references, params, params_variance, sigma_squared, i, true);
        let squeeze_error = resolved_param_error(references, params, params_variance, sigma_squared, i, false);
        reference_results.push(ReferenceResult {
            column: linear.columns[i],
            column_error,
            shift,
            shift_error,
            squeeze,
            squeeze_error,
        });
    }

    SolveOutcome {
        reference_results,
        polynomial_coefficients: linear.polynomial.clone(),
        chi_square,
        delta,
        step_count: step,
    }
}
