//! Cronbach's Alpha and leave-one-out sensitivity.

use statrs::statistics::Statistics;

use calibra_core::constants::{
    ALPHA_IMPROVEMENT_REMOVE, ALPHA_IMPROVEMENT_REVISE, MIN_SAMPLE_SIZE,
};

/// Cronbach's Alpha for a set of items:
/// `alpha = (k / (k-1)) * (1 - sum(var_i) / var_total)`
/// over per-item sample variances and the variance of per-respondent
/// totals.
///
/// `item_scores` is `[item][respondent]` with aligned columns. Returns
/// `None` with fewer than 2 items, fewer than 50 respondents, or zero
/// total variance — all insufficient data, not errors. Alpha can be
/// negative for incoherent scales; only the upper bound is clamped.
pub fn cronbach_alpha(item_scores: &[Vec<f64>]) -> Option<f64> {
    let k = item_scores.len();
    if k < 2 {
        return None;
    }
    let n = item_scores[0].len();
    if (n as u32) < MIN_SAMPLE_SIZE || item_scores.iter().any(|column| column.len() != n) {
        return None;
    }

    let totals: Vec<f64> = (0..n)
        .map(|respondent| item_scores.iter().map(|column| column[respondent]).sum())
        .collect();
    let var_total = totals.iter().variance();
    if !var_total.is_finite() || var_total <= 0.0 {
        return None;
    }

    let sum_item_variances: f64 = item_scores.iter().map(|column| column.iter().variance()).sum();
    if !sum_item_variances.is_finite() {
        return None;
    }

    let alpha = (k as f64 / (k as f64 - 1.0)) * (1.0 - sum_item_variances / var_total);
    if alpha.is_finite() {
        Some(alpha.min(1.0))
    } else {
        None
    }
}

/// Alpha recomputed with each item removed in turn. Entry `i` is the
/// alpha over the remaining `k-1` items, `None` when too few remain.
pub fn alpha_if_deleted(item_scores: &[Vec<f64>]) -> Vec<Option<f64>> {
    (0..item_scores.len())
        .map(|deleted| {
            let remaining: Vec<Vec<f64>> = item_scores
                .iter()
                .enumerate()
                .filter(|(idx, _)| *idx != deleted)
                .map(|(_, column)| column.clone())
                .collect();
            cronbach_alpha(&remaining)
        })
        .collect()
}

/// Recommendation tier for an item whose removal would change alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionImpact {
    /// Removal improves alpha by at least 0.05.
    StronglyConsiderRemoving,
    /// Removal improves alpha by at least 0.02.
    ConsiderRevising,
    /// Removal changes alpha by less than 0.02 either way.
    MinorImpact,
}

impl DeletionImpact {
    /// Classify the improvement `alpha_if_deleted - alpha`.
    pub fn from_improvement(improvement: f64) -> Self {
        if improvement >= ALPHA_IMPROVEMENT_REMOVE {
            Self::StronglyConsiderRemoving
        } else if improvement >= ALPHA_IMPROVEMENT_REVISE {
            Self::ConsiderRevising
        } else {
            Self::MinorImpact
        }
    }

    /// True when the item is a candidate for removal.
    pub fn is_removal_candidate(improvement: f64) -> bool {
        improvement >= ALPHA_IMPROVEMENT_REVISE
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            Self::StronglyConsiderRemoving => "strongly consider removing",
            Self::ConsiderRevising => "consider revising",
            Self::MinorImpact => "minor impact",
        }
    }
}
