//! Queries for the audit_runs table — append-only log of audit jobs.

use calibra_core::errors::StorageError;
use rusqlite::{params, Connection};

use super::sqlite_error;

/// One audit run row.
#[derive(Debug, Clone)]
pub struct AuditRunRow {
    pub id: i64,
    pub started_at: i64,
    pub completed_at: Option<i64>,
    pub items_recalculated: Option<i64>,
    pub items_failed: Option<i64>,
    pub items_skipped: Option<i64>,
    pub competencies_recalculated: Option<i64>,
    pub traits_recalculated: Option<i64>,
    pub status_changes: Option<i64>,
    pub calibrated: bool,
    pub status: String,
    pub error: Option<String>,
}

/// Append a completed run record. Returns the row id.
#[allow(clippy::too_many_arguments)]
pub fn insert(
    conn: &Connection,
    started_at: i64,
    completed_at: Option<i64>,
    items_recalculated: i64,
    items_failed: i64,
    items_skipped: i64,
    competencies_recalculated: i64,
    traits_recalculated: i64,
    status_changes: i64,
    calibrated: bool,
    status: &str,
    error: Option<&str>,
) -> Result<i64, StorageError> {
    conn.execute(
        "INSERT INTO audit_runs (
             started_at, completed_at, items_recalculated, items_failed,
             items_skipped, competencies_recalculated, traits_recalculated,
             status_changes, calibrated, status, error
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            started_at,
            completed_at,
            items_recalculated,
            items_failed,
            items_skipped,
            competencies_recalculated,
            traits_recalculated,
            status_changes,
            calibrated as i64,
            status,
            error,
        ],
    )
    .map_err(sqlite_error)?;
    Ok(conn.last_insert_rowid())
}

/// Completion time of the most recent successful run.
pub fn last_completed_at(conn: &Connection) -> Result<Option<i64>, StorageError> {
    conn.query_row(
        "SELECT MAX(completed_at) FROM audit_runs WHERE status = 'completed'",
        [],
        |row| row.get(0),
    )
    .map_err(sqlite_error)
}

/// Completion time of the most recent successful run that included a
/// full IRT calibration pass.
pub fn last_calibration_at(conn: &Connection) -> Result<Option<i64>, StorageError> {
    conn.query_row(
        "SELECT MAX(completed_at) FROM audit_runs
         WHERE status = 'completed' AND calibrated = 1",
        [],
        |row| row.get(0),
    )
    .map_err(sqlite_error)
}

/// Recent runs, newest first.
pub fn recent(conn: &Connection, limit: usize) -> Result<Vec<AuditRunRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, started_at, completed_at, items_recalculated, items_failed,
                    items_skipped, competencies_recalculated, traits_recalculated,
                    status_changes, calibrated, status, error
             FROM audit_runs ORDER BY started_at DESC LIMIT ?1",
        )
        .map_err(sqlite_error)?;
    let rows = stmt
        .query_map(params![limit as i64], |row| {
            Ok(AuditRunRow {
                id: row.get(0)?,
                started_at: row.get(1)?,
                completed_at: row.get(2)?,
                items_recalculated: row.get(3)?,
                items_failed: row.get(4)?,
                items_skipped: row.get(5)?,
                competencies_recalculated: row.get(6)?,
                traits_recalculated: row.get(7)?,
                status_changes: row.get(8)?,
                calibrated: row.get::<_, i64>(9)? != 0,
                status: row.get(10)?,
                error: row.get(11)?,
            })
        })
        .map_err(sqlite_error)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_error)
}
