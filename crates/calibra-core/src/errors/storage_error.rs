//! Storage errors.

use super::error_code::{self, CalibraErrorCode};

/// Errors that can occur in the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("SQLite error: {message}")]
    SqliteError { message: String },

    #[error("Migration v{version} failed: {message}")]
    MigrationFailed { version: u32, message: String },

    /// Optimistic-lock failure: the record's version changed between read
    /// and write. Callers recover by re-reading and retrying.
    #[error("Version conflict writing {entity}")]
    VersionConflict { entity: String },
}

impl CalibraErrorCode for StorageError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::VersionConflict { .. } => error_code::VERSION_CONFLICT,
            _ => error_code::STORAGE_ERROR,
        }
    }
}
