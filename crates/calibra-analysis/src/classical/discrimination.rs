//! Point-biserial discrimination index.
//!
//! Correlation between an item's score and the respondent's total on the
//! rest of the scale. The item is excluded from the total; including it
//! inflates the correlation with itself.

use rustc_hash::FxHashMap;
use statrs::statistics::Statistics;

use calibra_core::constants::MIN_SAMPLE_SIZE;
use calibra_core::types::{ItemId, Response, SessionId};

/// Pearson correlation between paired item scores and rest-scores.
/// `None` below the 50-response gate or when either side has zero
/// variance. The result is clamped to `[-1, 1]`.
pub fn point_biserial(item_scores: &[f64], rest_scores: &[f64]) -> Option<f64> {
    debug_assert_eq!(item_scores.len(), rest_scores.len());
    let n = item_scores.len();
    if (n as u32) < MIN_SAMPLE_SIZE {
        return None;
    }

    let item_mean = item_scores.iter().mean();
    let rest_mean = rest_scores.iter().mean();
    if !item_mean.is_finite() || !rest_mean.is_finite() {
        return None;
    }

    let mut covariance = 0.0;
    let mut item_ss = 0.0;
    let mut rest_ss = 0.0;
    for i in 0..n {
        let di = item_scores[i] - item_mean;
        let dr = rest_scores[i] - rest_mean;
        covariance += di * dr;
        item_ss += di * di;
        rest_ss += dr * dr;
    }

    let denominator = (item_ss * rest_ss).sqrt();
    if denominator <= 0.0 || !denominator.is_finite() {
        return None; // Constant scores carry no discrimination signal
    }

    let r = covariance / denominator;
    if r.is_finite() {
        Some(r.clamp(-1.0, 1.0))
    } else {
        None
    }
}

/// Assemble the paired vectors for one item from raw competency responses
/// and compute its point-biserial. Only respondents who answered the item
/// contribute; each rest-score sums that respondent's scores on the other
/// items they answered.
pub fn item_discrimination(item_id: &ItemId, responses: &[Response]) -> Option<f64> {
    let mut item_by_session: FxHashMap<&SessionId, f64> = FxHashMap::default();
    let mut rest_by_session: FxHashMap<&SessionId, f64> = FxHashMap::default();

    for response in responses {
        if &response.item_id == item_id {
            item_by_session.insert(&response.session_id, response.score);
        } else {
            *rest_by_session.entry(&response.session_id).or_insert(0.0) += response.score;
        }
    }

    let mut sessions: Vec<&&SessionId> = item_by_session.keys().collect();
    sessions.sort();

    let mut item_scores = Vec::with_capacity(sessions.len());
    let mut rest_scores = Vec::with_capacity(sessions.len());
    for session in sessions {
        item_scores.push(item_by_session[*session]);
        rest_scores.push(rest_by_session.get(*session).copied().unwrap_or(0.0));
    }

    point_biserial(&item_scores, &rest_scores)
}
