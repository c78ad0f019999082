//! Difficulty index (classical p-value).

use statrs::statistics::Statistics;

use calibra_core::constants::MIN_SAMPLE_SIZE;

/// Mean of the raw normalized scores for one item. Higher = easier,
/// despite the name. `None` below the 50-response gate.
pub fn difficulty_index(scores: &[f64]) -> Option<f64> {
    if (scores.len() as u32) < MIN_SAMPLE_SIZE {
        return None;
    }
    let mean = scores.iter().mean();
    if mean.is_finite() {
        Some(mean.clamp(0.0, 1.0))
    } else {
        None
    }
}
