//! Queries for the status_history table — append-only, no update path.

use calibra_core::errors::StorageError;
use rusqlite::{params, Connection};

use super::sqlite_error;

/// One status transition row.
#[derive(Debug, Clone)]
pub struct StatusChangeRow {
    pub item_id: String,
    pub from_status: String,
    pub to_status: String,
    pub changed_at: i64,
    pub reason: String,
}

/// Append one transition to the trail.
pub fn append(conn: &Connection, row: &StatusChangeRow) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO status_history (item_id, from_status, to_status, changed_at, reason)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            row.item_id,
            row.from_status,
            row.to_status,
            row.changed_at,
            row.reason,
        ],
    )
    .map_err(sqlite_error)?;
    Ok(())
}

/// Full trail for one item, oldest first.
pub fn history_for_item(
    conn: &Connection,
    item_id: &str,
) -> Result<Vec<StatusChangeRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT item_id, from_status, to_status, changed_at, reason
             FROM status_history WHERE item_id = ?1 ORDER BY changed_at, id",
        )
        .map_err(sqlite_error)?;
    let rows = stmt
        .query_map(params![item_id], |row| {
            Ok(StatusChangeRow {
                item_id: row.get(0)?,
                from_status: row.get(1)?,
                to_status: row.get(2)?,
                changed_at: row.get(3)?,
                reason: row.get(4)?,
            })
        })
        .map_err(sqlite_error)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_error)
}
