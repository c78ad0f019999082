//! Response matrix construction: dichotomization, coverage filtering,
//! and extreme-item removal.
//!
//! A zero-item or zero-respondent matrix is a valid "insufficient data"
//! value, never an error; callers check `is_empty()`.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use calibra_core::config::CalibrationConfig;
use calibra_core::types::{ItemId, Response, SessionId};

/// Dense dichotomous response matrix for one calibration run.
/// Rows are respondents, columns follow `question_ids`. Owned exclusively
/// by the run that built it and discarded afterwards.
#[derive(Debug, Clone)]
pub struct ResponseMatrix {
    pub question_ids: Vec<ItemId>,
    /// `rows[respondent][item]`, aligned with `question_ids`.
    pub rows: Vec<Vec<bool>>,
}

impl ResponseMatrix {
    pub fn empty() -> Self {
        Self {
            question_ids: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn respondent_count(&self) -> usize {
        self.rows.len()
    }

    pub fn item_count(&self) -> usize {
        self.question_ids.len()
    }

    /// True when there is nothing to calibrate.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.question_ids.is_empty()
    }

    /// Marginal proportion-correct for one column.
    pub fn proportion_correct(&self, col: usize) -> f64 {
        if self.rows.is_empty() {
            return 0.0;
        }
        let correct = self.rows.iter().filter(|row| row[col]).count();
        correct as f64 / self.rows.len() as f64
    }

    /// One item's responses across all respondents.
    pub fn column(&self, col: usize) -> Vec<bool> {
        self.rows.iter().map(|row| row[col]).collect()
    }
}

/// Builds a `ResponseMatrix` from raw competency responses.
pub struct MatrixBuilder {
    extreme_low: f64,
    extreme_high: f64,
}

impl MatrixBuilder {
    pub fn new(config: &CalibrationConfig) -> Self {
        Self {
            extreme_low: config.effective_extreme_low(),
            extreme_high: config.effective_extreme_high(),
        }
    }

    /// Assemble the matrix:
    /// 1. dichotomize each score at 0.5;
    /// 2. group by respondent session; respondents missing any in-scope
    ///    item are excluded entirely (the matrix is dense);
    /// 3. drop items whose marginal proportion-correct is outside the
    ///    extreme band (they cannot be calibrated reliably).
    ///
    /// Column order is sorted by item id so runs are reproducible.
    pub fn build(&self, responses: &[Response]) -> ResponseMatrix {
        if responses.is_empty() {
            return ResponseMatrix::empty();
        }

        let mut item_ids: Vec<ItemId> = responses
            .iter()
            .map(|r| r.item_id.clone())
            .collect::<FxHashSet<_>>()
            .into_iter()
            .collect();
        item_ids.sort();

        // Latest response wins when a session answered an item twice.
        let mut by_session: FxHashMap<SessionId, FxHashMap<ItemId, bool>> =
            FxHashMap::default();
        for response in responses {
            by_session
                .entry(response.session_id.clone())
                .or_default()
                .insert(response.item_id.clone(), response.is_correct());
        }

        let mut sessions: Vec<&SessionId> = by_session
            .iter()
            .filter(|(_, answers)| item_ids.iter().all(|id| answers.contains_key(id)))
            .map(|(session, _)| session)
            .collect();
        sessions.sort();

        let excluded = by_session.len() - sessions.len();
        if excluded > 0 {
            debug!(excluded, "excluded respondents with partial coverage");
        }

        if sessions.is_empty() {
            return ResponseMatrix::empty();
        }

        let rows: Vec<Vec<bool>> = sessions
            .iter()
            .map(|session| {
                let answers = &by_session[*session];
                item_ids.iter().map(|id| answers[id]).collect()
            })
            .collect();

        self.filter_extreme(ResponseMatrix {
            question_ids: item_ids,
            rows,
        })
    }

    /// Drop columns whose proportion-correct falls outside the band.
    fn filter_extreme(&self, matrix: ResponseMatrix) -> ResponseMatrix {
        let keep: Vec<usize> = (0..matrix.item_count())
            .filter(|&col| {
                let p = matrix.proportion_correct(col);
                p >= self.extreme_low && p <= self.extreme_high
            })
            .collect();

        if keep.len() == matrix.item_count() {
            return matrix;
        }
        debug!(
            dropped = matrix.item_count() - keep.len(),
            "dropped extreme items"
        );
        if keep.is_empty() {
            return ResponseMatrix::empty();
        }

        let question_ids = keep
            .iter()
            .map(|&col| matrix.question_ids[col].clone())
            .collect();
        let rows = matrix
            .rows
            .iter()
            .map(|row| keep.iter().map(|&col| row[col]).collect())
            .collect();

        ResponseMatrix { question_ids, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calibra_core::types::{ItemId, SessionId};

    fn response(session: &str, item: &str, score: f64) -> Response {
        Response::new(SessionId::from(session), ItemId::from(item), score)
    }

    fn builder() -> MatrixBuilder {
        MatrixBuilder::new(&CalibrationConfig::default())
    }

    #[test]
    fn test_empty_input_yields_empty_matrix() {
        let matrix = builder().build(&[]);
        assert!(matrix.is_empty());
        assert_eq!(matrix.respondent_count(), 0);
    }

    #[test]
    fn test_builds_dense_matrix() {
        let responses = vec![
            response("s1", "q1", 1.0),
            response("s1", "q2", 0.0),
            response("s2", "q1", 0.0),
            response("s2", "q2", 1.0),
        ];
        let matrix = builder().build(&responses);
        assert_eq!(matrix.respondent_count(), 2);
        assert_eq!(matrix.item_count(), 2);
        assert_eq!(matrix.question_ids, vec![ItemId::from("q1"), ItemId::from("q2")]);
        // Sessions are sorted, so row 0 is s1.
        assert_eq!(matrix.rows[0], vec![true, false]);
        assert_eq!(matrix.rows[1], vec![false, true]);
    }

    #[test]
    fn test_partial_coverage_respondent_excluded() {
        let responses = vec![
            response("s1", "q1", 1.0),
            response("s1", "q2", 0.0),
            response("s2", "q1", 1.0), // s2 never answered q2
        ];
        let matrix = builder().build(&responses);
        assert_eq!(matrix.respondent_count(), 1);
    }

    #[test]
    fn test_all_correct_item_filtered_as_extreme() {
        // 20 respondents all correct on q1, mixed on q2.
        let mut responses = Vec::new();
        for i in 0..20 {
            let session = format!("s{i}");
            responses.push(response(&session, "q1", 1.0));
            responses.push(response(&session, "q2", if i % 2 == 0 { 1.0 } else { 0.0 }));
        }
        let matrix = builder().build(&responses);
        assert_eq!(matrix.item_count(), 1);
        assert_eq!(matrix.question_ids, vec![ItemId::from("q2")]);
    }

    #[test]
    fn test_sole_extreme_item_yields_empty_matrix() {
        let responses: Vec<Response> = (0..20)
            .map(|i| response(&format!("s{i}"), "q1", 1.0))
            .collect();
        let matrix = builder().build(&responses);
        assert!(matrix.is_empty());
        assert_eq!(matrix.item_count(), 0);
    }

    #[test]
    fn test_duplicate_response_last_wins() {
        let responses = vec![
            response("s1", "q1", 0.0),
            response("s1", "q1", 1.0),
            response("s2", "q1", 0.0),
        ];
        let matrix = builder().build(&responses);
        assert_eq!(matrix.respondent_count(), 2);
        assert_eq!(matrix.proportion_correct(0), 0.5);
    }
}
