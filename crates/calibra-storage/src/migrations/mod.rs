//! Versioned schema migrations. Idempotent: every statement is
//! `IF NOT EXISTS`, and applied versions are recorded in
//! `schema_migrations`.

pub mod v001_item_statistics;
pub mod v002_status_history;
pub mod v003_reliability;
pub mod v004_audit_runs;

use calibra_core::errors::StorageError;
use rusqlite::Connection;
use tracing::debug;

const MIGRATIONS: &[(u32, &str)] = &[
    (1, v001_item_statistics::MIGRATION_SQL),
    (2, v002_status_history::MIGRATION_SQL),
    (3, v003_reliability::MIGRATION_SQL),
    (4, v004_audit_runs::MIGRATION_SQL),
];

/// Apply all pending migrations in order.
pub fn run_migrations(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL DEFAULT (unixepoch())
        ) STRICT;",
    )
    .map_err(|e| StorageError::SqliteError {
        message: e.to_string(),
    })?;

    for &(version, sql) in MIGRATIONS {
        let applied: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM schema_migrations WHERE version = ?1)",
                [version],
                |row| row.get(0),
            )
            .map_err(|e| StorageError::SqliteError {
                message: e.to_string(),
            })?;
        if applied {
            continue;
        }

        conn.execute_batch(sql)
            .map_err(|e| StorageError::MigrationFailed {
                version,
                message: e.to_string(),
            })?;
        conn.execute(
            "INSERT INTO schema_migrations (version) VALUES (?1)",
            [version],
        )
        .map_err(|e| StorageError::MigrationFailed {
            version,
            message: e.to_string(),
        })?;
        debug!(version, "applied migration");
    }

    Ok(())
}
