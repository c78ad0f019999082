//! Sink for computed statistics, status changes, and run metadata.

use crate::errors::StorageError;
use crate::types::{
    AuditRunRecord, BigFiveReliability, CompetencyReliability, ItemStatistics, ItemId,
    StatusChange,
};

/// Persistence seam for everything this engine computes.
///
/// Item records carry a version counter for optimistic concurrency:
/// `load_item` returns the current version, `save_item` writes only when
/// the stored version still matches, returning
/// `StorageError::VersionConflict` otherwise. Callers recover by
/// re-reading and retrying with fresh data.
pub trait StatisticsStore: Send + Sync {
    /// Load an item record with its current version counter.
    fn load_item(&self, item_id: &ItemId)
        -> Result<Option<(ItemStatistics, i64)>, StorageError>;

    /// Every persisted item record (read path for review and reporting).
    fn all_items(&self) -> Result<Vec<ItemStatistics>, StorageError>;

    /// Insert a brand-new record at version 0. Fails if the item already
    /// has a record.
    fn insert_item(&self, stats: &ItemStatistics) -> Result<(), StorageError>;

    /// Compare-and-swap write. The optional status change is appended to
    /// the history log in the same transaction as the record update.
    fn save_item(
        &self,
        stats: &ItemStatistics,
        expected_version: i64,
        change: Option<&StatusChange>,
    ) -> Result<(), StorageError>;

    /// Ordered status audit trail for one item, oldest first.
    fn status_history(&self, item_id: &ItemId) -> Result<Vec<StatusChange>, StorageError>;

    fn save_competency_reliability(
        &self,
        reliability: &CompetencyReliability,
    ) -> Result<(), StorageError>;

    fn save_trait_reliability(
        &self,
        reliability: &BigFiveReliability,
    ) -> Result<(), StorageError>;

    /// Completion time of the most recent successful audit run.
    fn last_audit_completed_at(&self) -> Result<Option<i64>, StorageError>;

    /// Completion time of the most recent successful run that included a
    /// full IRT calibration pass.
    fn last_calibration_at(&self) -> Result<Option<i64>, StorageError>;

    /// Append an audit run record to the run log.
    fn record_audit_run(&self, run: &AuditRunRecord) -> Result<(), StorageError>;
}
