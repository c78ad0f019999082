//! Raw response data. Transient: this engine never persists responses,
//! it only reads them through a `ResponseSource`.

use serde::{Deserialize, Serialize};

use crate::constants::DICHOTOMIZATION_THRESHOLD;
use crate::types::{ItemId, SessionId};

/// A single raw response: one respondent session, one item, one normalized
/// score in `[0, 1]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub session_id: SessionId,
    pub item_id: ItemId,
    /// Normalized score in `[0, 1]`. Out-of-range input is clamped at
    /// construction.
    pub score: f64,
}

impl Response {
    pub fn new(session_id: SessionId, item_id: ItemId, score: f64) -> Self {
        let score = if score.is_finite() {
            score.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            session_id,
            item_id,
            score,
        }
    }

    /// Dichotomize at the 0.5 threshold. IRT consumes the boolean; the
    /// classical statistics use the raw score directly.
    pub fn is_correct(&self) -> bool {
        self.score >= DICHOTOMIZATION_THRESHOLD
    }
}
