//! Query modules, one per table group. Rows come out as raw structs
//! (strings and JSON text); domain conversion lives in `store`.

pub mod audit_runs;
pub mod item_statistics;
pub mod reliability;
pub mod status_history;

use calibra_core::errors::StorageError;

pub(crate) fn sqlite_error(e: rusqlite::Error) -> StorageError {
    StorageError::SqliteError {
        message: e.to_string(),
    }
}
