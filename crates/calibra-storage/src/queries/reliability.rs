//! Reliability snapshot queries.

use calibra_core::errors::StorageError;
use rusqlite::{params, Connection};

use super::sqlite_error;

/// Raw competency reliability row.
#[derive(Debug, Clone)]
pub struct CompetencyReliabilityRow {
    pub competency_id: String,
    pub cronbach_alpha: Option<f64>,
    pub sample_size: i64,
    pub item_count: i64,
    pub reliability_status: String,
    /// JSON map item_id -> alpha.
    pub alpha_if_deleted: Option<String>,
    pub last_calculated_at: i64,
}

/// Raw trait reliability row.
#[derive(Debug, Clone)]
pub struct TraitReliabilityRow {
    pub trait_name: String,
    pub cronbach_alpha: Option<f64>,
    pub sample_size: i64,
    pub total_items: i64,
    pub reliability_status: String,
    pub alpha_if_deleted: Option<String>,
    /// JSON array of competency ids.
    pub contributing_competencies: Option<String>,
    pub last_calculated_at: i64,
}

/// Insert or update a competency reliability snapshot.
pub fn upsert_competency(
    conn: &Connection,
    row: &CompetencyReliabilityRow,
) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO competency_reliability (
             competency_id, cronbach_alpha, sample_size, item_count,
             reliability_status, alpha_if_deleted, last_calculated_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(competency_id) DO UPDATE SET
           cronbach_alpha = excluded.cronbach_alpha,
           sample_size = excluded.sample_size,
           item_count = excluded.item_count,
           reliability_status = excluded.reliability_status,
           alpha_if_deleted = excluded.alpha_if_deleted,
           last_calculated_at = excluded.last_calculated_at",
        params![
            row.competency_id,
            row.cronbach_alpha,
            row.sample_size,
            row.item_count,
            row.reliability_status,
            row.alpha_if_deleted,
            row.last_calculated_at,
        ],
    )
    .map_err(sqlite_error)?;
    Ok(())
}

/// Load one competency reliability snapshot.
pub fn load_competency(
    conn: &Connection,
    competency_id: &str,
) -> Result<Option<CompetencyReliabilityRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT competency_id, cronbach_alpha, sample_size, item_count,
                    reliability_status, alpha_if_deleted, last_calculated_at
             FROM competency_reliability WHERE competency_id = ?1",
        )
        .map_err(sqlite_error)?;
    let mut rows = stmt.query(params![competency_id]).map_err(sqlite_error)?;
    match rows.next().map_err(sqlite_error)? {
        Some(row) => Ok(Some(CompetencyReliabilityRow {
            competency_id: row.get(0).map_err(sqlite_error)?,
            cronbach_alpha: row.get(1).map_err(sqlite_error)?,
            sample_size: row.get(2).map_err(sqlite_error)?,
            item_count: row.get(3).map_err(sqlite_error)?,
            reliability_status: row.get(4).map_err(sqlite_error)?,
            alpha_if_deleted: row.get(5).map_err(sqlite_error)?,
            last_calculated_at: row.get(6).map_err(sqlite_error)?,
        })),
        None => Ok(None),
    }
}

/// Insert or update a trait reliability snapshot.
pub fn upsert_trait(conn: &Connection, row: &TraitReliabilityRow) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO trait_reliability (
             trait_name, cronbach_alpha, sample_size, total_items,
             reliability_status, alpha_if_deleted, contributing_competencies,
             last_calculated_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(trait_name) DO UPDATE SET
           cronbach_alpha = excluded.cronbach_alpha,
           sample_size = excluded.sample_size,
           total_items = excluded.total_items,
           reliability_status = excluded.reliability_status,
           alpha_if_deleted = excluded.alpha_if_deleted,
           contributing_competencies = excluded.contributing_competencies,
           last_calculated_at = excluded.last_calculated_at",
        params![
            row.trait_name,
            row.cronbach_alpha,
            row.sample_size,
            row.total_items,
            row.reliability_status,
            row.alpha_if_deleted,
            row.contributing_competencies,
            row.last_calculated_at,
        ],
    )
    .map_err(sqlite_error)?;
    Ok(())
}

/// Load one trait reliability snapshot.
pub fn load_trait(
    conn: &Connection,
    trait_name: &str,
) -> Result<Option<TraitReliabilityRow>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT trait_name, cronbach_alpha, sample_size, total_items,
                    reliability_status, alpha_if_deleted, contributing_competencies,
                    last_calculated_at
             FROM trait_reliability WHERE trait_name = ?1",
        )
        .map_err(sqlite_error)?;
    let mut rows = stmt.query(params![trait_name]).map_err(sqlite_error)?;
    match rows.next().map_err(sqlite_error)? {
        Some(row) => Ok(Some(TraitReliabilityRow {
            trait_name: row.get(0).map_err(sqlite_error)?,
            cronbach_alpha: row.get(1).map_err(sqlite_error)?,
            sample_size: row.get(2).map_err(sqlite_error)?,
            total_items: row.get(3).map_err(sqlite_error)?,
            reliability_status: row.get(4).map_err(sqlite_error)?,
            alpha_if_deleted: row.get(5).map_err(sqlite_error)?,
            contributing_competencies: row.get(6).map_err(sqlite_error)?,
            last_calculated_at: row.get(7).map_err(sqlite_error)?,
        })),
        None => Ok(None),
    }
}
