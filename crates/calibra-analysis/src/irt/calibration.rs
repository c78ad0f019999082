//! Joint calibration: alternate ability and item-parameter estimation.

use rustc_hash::FxHashMap;
use statrs::statistics::Statistics;
use tracing::debug;

use calibra_core::config::CalibrationConfig;
use calibra_core::constants::{MAX_THETA, MIN_THETA};
use calibra_core::types::ItemId;

use super::newton::{estimate_a, estimate_b, estimate_theta};
use crate::matrix::ResponseMatrix;

/// Calibrated 2PL parameters for one item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemParameters {
    pub discrimination: f64,
    pub difficulty: f64,
}

/// Output of one calibration run over a response matrix.
#[derive(Debug, Clone)]
pub struct CalibrationResult {
    pub items: FxHashMap<ItemId, ItemParameters>,
    /// Ability estimates aligned with the matrix rows.
    pub thetas: Vec<f64>,
    pub cycles_used: u32,
}

impl CalibrationResult {
    pub fn empty() -> Self {
        Self {
            items: FxHashMap::default(),
            thetas: Vec::new(),
            cycles_used: 0,
        }
    }
}

/// Alternating maximum-likelihood calibration.
///
/// Each cycle estimates every respondent's theta holding item parameters
/// fixed, re-anchors the latent scale (mean 0, sd 1 — the 2PL scale is
/// otherwise unidentified), then re-estimates every item's difficulty and
/// discrimination holding thetas fixed. Stops after `em_cycles` or once
/// the largest parameter change drops below `em_tolerance`.
///
/// An empty matrix yields an empty result; the caller treats that as
/// insufficient data.
pub fn calibrate(matrix: &ResponseMatrix, config: &CalibrationConfig) -> CalibrationResult {
    if matrix.is_empty() {
        return CalibrationResult::empty();
    }

    let max_iterations = config.effective_max_iterations();
    let tolerance = config.effective_convergence_tolerance();
    let em_cycles = config.effective_em_cycles();
    let em_tolerance = config.effective_em_tolerance();

    let item_count = matrix.item_count();
    let mut a = vec![1.0; item_count];
    // Start difficulties at the log-odds of failure: with abilities near
    // zero and unit discrimination, p ~= 1 / (1 + exp(b)).
    let mut b: Vec<f64> = (0..item_count)
        .map(|col| {
            let p = matrix.proportion_correct(col).clamp(0.01, 0.99);
            ((1.0 - p) / p).ln().clamp(MIN_THETA, MAX_THETA)
        })
        .collect();
    let mut thetas = vec![0.0; matrix.respondent_count()];

    let mut cycles_used = 0;
    for cycle in 0..em_cycles {
        cycles_used = cycle + 1;

        for (row_idx, row) in matrix.rows.iter().enumerate() {
            thetas[row_idx] = estimate_theta(row, &a, &b, max_iterations, tolerance);
        }
        anchor_scale(&mut thetas);

        let mut max_delta: f64 = 0.0;
        for col in 0..item_count {
            let responses = matrix.column(col);
            let new_b = estimate_b(&responses, a[col], &thetas, b[col], max_iterations, tolerance);
            let new_a = estimate_a(&responses, a[col], new_b, &thetas, max_iterations, tolerance);
            max_delta = max_delta
                .max((new_b - b[col]).abs())
                .max((new_a - a[col]).abs());
            b[col] = new_b;
            a[col] = new_a;
        }

        if max_delta < em_tolerance {
            debug!(cycle = cycles_used, max_delta, "calibration converged");
            break;
        }
    }

    let items = matrix
        .question_ids
        .iter()
        .enumerate()
        .map(|(col, id)| {
            (
                id.clone(),
                ItemParameters {
                    discrimination: a[col],
                    difficulty: b[col],
                },
            )
        })
        .collect();

    CalibrationResult {
        items,
        thetas,
        cycles_used,
    }
}

/// Re-anchor ability estimates to mean 0, sd 1. With fewer than two
/// distinct values only centering applies.
fn anchor_scale(thetas: &mut [f64]) {
    if thetas.len() < 2 {
        return;
    }
    let mean = thetas.iter().mean();
    let sd = thetas.iter().std_dev();
    if !mean.is_finite() {
        return;
    }
    if sd.is_finite() && sd > 1e-6 {
        for theta in thetas.iter_mut() {
            *theta = ((*theta - mean) / sd).clamp(MIN_THETA, MAX_THETA);
        }
    } else {
        for theta in thetas.iter_mut() {
            *theta = (*theta - mean).clamp(MIN_THETA, MAX_THETA);
        }
    }
}
