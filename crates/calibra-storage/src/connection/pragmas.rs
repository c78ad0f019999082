//! Connection pragmas applied to every new connection.

use calibra_core::errors::StorageError;
use rusqlite::Connection;

/// WAL for concurrent reads during the audit write pass, NORMAL sync
/// (WAL makes it durable enough), busy timeout so racing writers wait
/// instead of failing.
pub fn apply_pragmas(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = 5000;
         PRAGMA cache_size = -8000;",
    )
    .map_err(|e| StorageError::SqliteError {
        message: e.to_string(),
    })
}
