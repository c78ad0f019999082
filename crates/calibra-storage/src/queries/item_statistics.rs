//! Item statistics queries with optimistic-concurrency writes.

use calibra_core::errors::StorageError;
use rusqlite::{params, Connection};

use super::sqlite_error;

/// Raw item statistics row. Enum columns stay strings here; the store
/// layer converts to domain types.
#[derive(Debug, Clone)]
pub struct ItemStatisticsRow {
    pub item_id: String,
    pub competency_id: String,
    pub response_count: i64,
    pub difficulty_index: Option<f64>,
    pub discrimination_index: Option<f64>,
    pub previous_discrimination_index: Option<f64>,
    /// JSON map option_id -> selection rate.
    pub distractor_efficiency: Option<String>,
    pub validity_status: String,
    pub difficulty_flag: String,
    pub discrimination_flag: String,
    pub irt_discrimination: Option<f64>,
    pub irt_difficulty: Option<f64>,
    pub irt_guessing: Option<f64>,
    pub last_calculated_at: Option<i64>,
    pub version: i64,
}

const COLUMNS: &str = "item_id, competency_id, response_count, difficulty_index, \
     discrimination_index, previous_discrimination_index, distractor_efficiency, \
     validity_status, difficulty_flag, discrimination_flag, \
     irt_discrimination, irt_difficulty, irt_guessing, last_calculated_at, version";

fn map_row(row: &rusqlite::Row) -> rusqlite::Result<ItemStatisticsRow> {
    Ok(ItemStatisticsRow {
        item_id: row.get(0)?,
        competency_id: row.get(1)?,
        response_count: row.get(2)?,
        difficulty_index: row.get(3)?,
        discrimination_index: row.get(4)?,
        previous_discrimination_index: row.get(5)?,
        distractor_efficiency: row.get(6)?,
        validity_status: row.get(7)?,
        difficulty_flag: row.get(8)?,
        discrimination_flag: row.get(9)?,
        irt_discrimination: row.get(10)?,
        irt_difficulty: row.get(11)?,
        irt_guessing: row.get(12)?,
        last_calculated_at: row.get(13)?,
        version: row.get(14)?,
    })
}

/// Load one item row with its current version.
pub fn load(conn: &Connection, item_id: &str) -> Result<Option<ItemStatisticsRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {COLUMNS} FROM item_statistics WHERE item_id = ?1"
        ))
        .map_err(sqlite_error)?;
    let mut rows = stmt.query(params![item_id]).map_err(sqlite_error)?;
    match rows.next().map_err(sqlite_error)? {
        Some(row) => Ok(Some(map_row(row).map_err(sqlite_error)?)),
        None => Ok(None),
    }
}

/// Load every item row, ordered by item id.
pub fn load_all(conn: &Connection) -> Result<Vec<ItemStatisticsRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {COLUMNS} FROM item_statistics ORDER BY item_id"
        ))
        .map_err(sqlite_error)?;
    let rows = stmt.query_map([], map_row).map_err(sqlite_error)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(sqlite_error)
}

/// Insert a brand-new row at version 0. Fails on a duplicate item id.
pub fn insert_new(conn: &Connection, row: &ItemStatisticsRow, now: i64) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO item_statistics (
             item_id, competency_id, response_count, difficulty_index,
             discrimination_index, previous_discrimination_index, distractor_efficiency,
             validity_status, difficulty_flag, discrimination_flag,
             irt_discrimination, irt_difficulty, irt_guessing, last_calculated_at,
             version, updated_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, 0, ?15)",
        params![
            row.item_id,
            row.competency_id,
            row.response_count,
            row.difficulty_index,
            row.discrimination_index,
            row.previous_discrimination_index,
            row.distractor_efficiency,
            row.validity_status,
            row.difficulty_flag,
            row.discrimination_flag,
            row.irt_discrimination,
            row.irt_difficulty,
            row.irt_guessing,
            row.last_calculated_at,
            now,
        ],
    )
    .map_err(sqlite_error)?;
    Ok(())
}

/// Compare-and-swap update: writes only when the stored version still
/// matches `expected_version`, bumping it by one. Returns false when the
/// version moved (the caller re-reads and retries).
pub fn update_cas(
    conn: &Connection,
    row: &ItemStatisticsRow,
    expected_version: i64,
    now: i64,
) -> Result<bool, StorageError> {
    let updated = conn
        .execute(
            "UPDATE item_statistics SET
                 competency_id = ?2, response_count = ?3, difficulty_index = ?4,
                 discrimination_index = ?5, previous_discrimination_index = ?6,
                 distractor_efficiency = ?7, validity_status = ?8,
                 difficulty_flag = ?9, discrimination_flag = ?10,
                 irt_discrimination = ?11, irt_difficulty = ?12, irt_guessing = ?13,
                 last_calculated_at = ?14, version = version + 1, updated_at = ?15
             WHERE item_id = ?1 AND version = ?16",
            params![
                row.item_id,
                row.competency_id,
                row.response_count,
                row.difficulty_index,
                row.discrimination_index,
                row.previous_discrimination_index,
                row.distractor_efficiency,
                row.validity_status,
                row.difficulty_flag,
                row.discrimination_flag,
                row.irt_discrimination,
                row.irt_difficulty,
                row.irt_guessing,
                row.last_calculated_at,
                now,
                expected_version,
            ],
        )
        .map_err(sqlite_error)?;
    Ok(updated == 1)
}
