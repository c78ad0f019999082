//! Newton-Raphson estimators for the 2PL model.
//!
//! Three independent 1-D solvers, each root-finding on the derivative of
//! the log-likelihood of the observed dichotomous responses. Every loop
//! carries a hard iteration cap; bounded iteration is the only
//! termination guarantee. Divergence is prevented by clamping the
//! parameter to its bounds and the step to `MAX_STEP`, never by erroring.

use calibra_core::constants::{MAX_DISCRIMINATION, MAX_THETA, MIN_DISCRIMINATION, MIN_THETA};

use super::model::probability;

/// Largest single Newton step. Near-saturated probabilities make the
/// second derivative vanish; an unbounded step would overshoot by orders
/// of magnitude before the clamp catches it.
const MAX_STEP: f64 = 1.0;

/// Second-derivative magnitude below which the surface is flat and the
/// solve stops where it is.
const FLAT_CURVATURE: f64 = 1e-10;

/// Estimate a respondent's ability given fixed item parameters.
///
/// `responses[i]` is the dichotomous response to the item with
/// discrimination `a[i]` and difficulty `b[i]`. The result is clamped to
/// `[MIN_THETA, MAX_THETA]`; all-correct and all-incorrect vectors pin to
/// the respective bound instead of diverging.
pub fn estimate_theta(
    responses: &[bool],
    a: &[f64],
    b: &[f64],
    max_iterations: u32,
    tolerance: f64,
) -> f64 {
    debug_assert_eq!(responses.len(), a.len());
    debug_assert_eq!(responses.len(), b.len());
    if responses.is_empty() {
        return 0.0;
    }

    let mut theta = 0.0;
    for _ in 0..max_iterations {
        let mut d1 = 0.0;
        let mut d2 = 0.0;
        for i in 0..responses.len() {
            let p = probability(theta, a[i], b[i]);
            let u = if responses[i] { 1.0 } else { 0.0 };
            d1 += a[i] * (u - p);
            d2 -= a[i] * a[i] * p * (1.0 - p);
        }

        if d2.abs() < FLAT_CURVATURE {
            // Saturated: push toward the bound the gradient points at.
            if d1 > 0.0 {
                theta = MAX_THETA;
            } else if d1 < 0.0 {
                theta = MIN_THETA;
            }
            break;
        }

        let step = (d1 / d2).clamp(-MAX_STEP, MAX_STEP);
        if !step.is_finite() {
            break;
        }
        theta = (theta - step).clamp(MIN_THETA, MAX_THETA);
        if step.abs() < tolerance {
            break;
        }
    }

    theta.clamp(MIN_THETA, MAX_THETA)
}

/// Estimate an item's difficulty given fixed discrimination and fixed
/// respondent abilities. Clamped to the theta scale.
pub fn estimate_b(
    responses: &[bool],
    a: f64,
    thetas: &[f64],
    initial_b: f64,
    max_iterations: u32,
    tolerance: f64,
) -> f64 {
    debug_assert_eq!(responses.len(), thetas.len());
    if responses.is_empty() {
        return initial_b.clamp(MIN_THETA, MAX_THETA);
    }

    let mut b = initial_b.clamp(MIN_THETA, MAX_THETA);
    for _ in 0..max_iterations {
        let mut d1 = 0.0;
        let mut d2 = 0.0;
        for (j, &theta) in thetas.iter().enumerate() {
            let p = probability(theta, a, b);
            let u = if responses[j] { 1.0 } else { 0.0 };
            d1 -= a * (u - p);
            d2 -= a * a * p * (1.0 - p);
        }

        if d2.abs() < FLAT_CURVATURE {
            break;
        }
        let step = (d1 / d2).clamp(-MAX_STEP, MAX_STEP);
        if !step.is_finite() {
            break;
        }
        b = (b - step).clamp(MIN_THETA, MAX_THETA);
        if step.abs() < tolerance {
            break;
        }
    }

    b
}

/// Estimate an item's discrimination given fixed difficulty and fixed
/// respondent abilities.
///
/// Clamped to `[MIN_DISCRIMINATION, MAX_DISCRIMINATION]`. When responses
/// carry no discriminative signal the gradient is near zero and the
/// estimate settles near `initial_a` instead of running away.
pub fn estimate_a(
    responses: &[bool],
    initial_a: f64,
    b: f64,
    thetas: &[f64],
    max_iterations: u32,
    tolerance: f64,
) -> f64 {
    debug_assert_eq!(responses.len(), thetas.len());
    if responses.is_empty() {
        return initial_a.clamp(MIN_DISCRIMINATION, MAX_DISCRIMINATION);
    }

    let mut a = initial_a.clamp(MIN_DISCRIMINATION, MAX_DISCRIMINATION);
    for _ in 0..max_iterations {
        let mut d1 = 0.0;
        let mut d2 = 0.0;
        for (j, &theta) in thetas.iter().enumerate() {
            let p = probability(theta, a, b);
            let u = if responses[j] { 1.0 } else { 0.0 };
            let distance = theta - b;
            d1 += distance * (u - p);
            d2 -= distance * distance * p * (1.0 - p);
        }

        if d2.abs() < FLAT_CURVATURE {
            break;
        }
        let step = (d1 / d2).clamp(-MAX_STEP, MAX_STEP);
        if !step.is_finite() {
            break;
        }
        a = (a - step).clamp(MIN_DISCRIMINATION, MAX_DISCRIMINATION);
        if step.abs() < tolerance {
            break;
        }
    }

    a
}
