//! Audit run metadata — the append-only record of batch recalculations.

use serde::{Deserialize, Serialize};

/// One completed (or failed) audit run, as persisted in the run log.
///
/// The persisted log is the only state the stateless audit job reads
/// between runs: `completed_at` of the last successful run gates which
/// items are due, and `calibrated` gates when the next full IRT pass runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRunRecord {
    /// Unix seconds when the run started.
    pub started_at: i64,
    /// Unix seconds when the run finished, `None` if it aborted.
    pub completed_at: Option<i64>,
    pub items_recalculated: u32,
    pub items_failed: u32,
    pub items_skipped: u32,
    pub competencies_recalculated: u32,
    pub traits_recalculated: u32,
    pub status_changes: u32,
    /// True when this run included a full IRT calibration pass.
    pub calibrated: bool,
    /// `completed` or `failed`.
    pub status: String,
    pub error: Option<String>,
}
