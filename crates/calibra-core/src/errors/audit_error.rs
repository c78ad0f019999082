//! Audit job errors.
//! Aggregates subsystem errors via `From` conversions; per-item failures
//! inside a batch are caught and counted, never propagated.

use super::error_code::{self, CalibraErrorCode};
use super::{StatusError, StorageError};
use crate::types::{CompetencyId, ItemId};

/// Errors that can occur during recalculation.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// Recalculation requested for an item with no response data at all.
    #[error("No response data for item {item_id}")]
    ItemNotFound { item_id: ItemId },

    /// Recalculation requested for an unknown competency.
    #[error("No response data for competency {competency_id}")]
    CompetencyNotFound { competency_id: CompetencyId },

    /// The response data source failed to produce data.
    #[error("Response source error: {message}")]
    DataSource { message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Status error: {0}")]
    Status(#[from] StatusError),
}

impl CalibraErrorCode for AuditError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ItemNotFound { .. } | Self::CompetencyNotFound { .. } => error_code::NOT_FOUND,
            Self::DataSource { .. } => error_code::DATA_SOURCE_ERROR,
            Self::Storage(e) => e.error_code(),
            Self::Status(e) => e.error_code(),
        }
    }
}
