//! Audit run summary.

use serde::Serialize;

/// Counts reported by one audit run. A run reports final counts; per-item
/// failures are recorded here, never silently dropped.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditSummary {
    pub items_recalculated: u32,
    pub items_failed: u32,
    /// Items with no new data or still under the response gate.
    pub items_skipped: u32,
    pub competencies_recalculated: u32,
    pub traits_recalculated: u32,
    pub status_changes: u32,
    /// True when this run included a full IRT calibration pass.
    pub calibrated: bool,
    pub duration_ms: u64,
}

impl AuditSummary {
    pub(crate) fn absorb(&mut self, other: &AuditSummary) {
        self.items_recalculated += other.items_recalculated;
        self.items_failed += other.items_failed;
        self.items_skipped += other.items_skipped;
        self.competencies_recalculated += other.competencies_recalculated;
        self.traits_recalculated += other.traits_recalculated;
        self.status_changes += other.status_changes;
    }
}
