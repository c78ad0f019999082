//! 2PL probability model.

use calibra_core::constants::MAX_EXPONENT;

/// Probability of a correct response under the two-parameter logistic
/// model: `P(theta) = 1 / (1 + exp(-a * (theta - b)))`.
///
/// The exponent argument is clamped to `±MAX_EXPONENT` so extreme inputs
/// saturate to 0/1 asymptotically instead of producing NaN/Inf. Returns
/// exactly 0.5 when `theta == b`.
pub fn probability(theta: f64, a: f64, b: f64) -> f64 {
    let exponent = (-a * (theta - b)).clamp(-MAX_EXPONENT, MAX_EXPONENT);
    1.0 / (1.0 + exponent.exp())
}
