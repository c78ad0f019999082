//! `StatisticsStore` implementation over SQLite.
//!
//! Domain <-> row conversion happens here; the query modules stay on raw
//! strings. Status changes are appended in the same immediate transaction
//! as the record update, so the trail can never diverge from the status
//! column.

use rustc_hash::FxHashMap;

use calibra_core::errors::StorageError;
use calibra_core::traits::StatisticsStore;
use calibra_core::types::{
    AuditRunRecord, BigFiveReliability, CompetencyId, CompetencyReliability, DifficultyFlag,
    DiscriminationFlag, ItemId, ItemStatistics, OptionId, StatusChange, ValidityStatus,
};

use crate::connection::writer::with_immediate_transaction;
use crate::connection::DatabaseManager;
use crate::queries::{audit_runs, item_statistics, reliability, status_history};

/// SQLite-backed statistics store.
pub struct SqliteStatisticsStore {
    db: DatabaseManager,
}

impl SqliteStatisticsStore {
    pub fn new(db: DatabaseManager) -> Self {
        Self { db }
    }

    pub fn open(path: &std::path::Path) -> Result<Self, StorageError> {
        Ok(Self::new(DatabaseManager::open(path)?))
    }

    pub fn open_in_memory() -> Result<Self, StorageError> {
        Ok(Self::new(DatabaseManager::open_in_memory()?))
    }

    pub fn database(&self) -> &DatabaseManager {
        &self.db
    }

    /// Load a competency reliability snapshot.
    pub fn competency_reliability(
        &self,
        competency_id: &CompetencyId,
    ) -> Result<Option<CompetencyReliability>, StorageError> {
        self.db.with_reader(|conn| {
            reliability::load_competency(conn, competency_id.as_str())?
                .map(competency_reliability_from_row)
                .transpose()
        })
    }

    /// Load a trait reliability snapshot.
    pub fn trait_reliability(
        &self,
        trait_name: calibra_core::types::BigFiveTrait,
    ) -> Result<Option<BigFiveReliability>, StorageError> {
        self.db.with_reader(|conn| {
            reliability::load_trait(conn, trait_name.name())?
                .map(trait_reliability_from_row)
                .transpose()
        })
    }

    /// Recent audit runs, newest first.
    pub fn recent_audit_runs(
        &self,
        limit: usize,
    ) -> Result<Vec<audit_runs::AuditRunRow>, StorageError> {
        self.db.with_reader(|conn| audit_runs::recent(conn, limit))
    }
}

impl StatisticsStore for SqliteStatisticsStore {
    fn load_item(
        &self,
        item_id: &ItemId,
    ) -> Result<Option<(ItemStatistics, i64)>, StorageError> {
        self.db.with_reader(|conn| {
            match item_statistics::load(conn, item_id.as_str())? {
                Some(row) => {
                    let version = row.version;
                    Ok(Some((item_from_row(row)?, version)))
                }
                None => Ok(None),
            }
        })
    }

    fn all_items(&self) -> Result<Vec<ItemStatistics>, StorageError> {
        self.db.with_reader(|conn| {
            item_statistics::load_all(conn)?
                .into_iter()
                .map(item_from_row)
                .collect()
        })
    }

    fn insert_item(&self, stats: &ItemStatistics) -> Result<(), StorageError> {
        let row = item_to_row(stats, 0)?;
        self.db
            .with_writer(|conn| item_statistics::insert_new(conn, &row, now_fallback(stats)))
    }

    fn save_item(
        &self,
        stats: &ItemStatistics,
        expected_version: i64,
        change: Option<&StatusChange>,
    ) -> Result<(), StorageError> {
        let row = item_to_row(stats, expected_version)?;
        self.db.with_writer(|conn| {
            with_immediate_transaction(conn, |tx| {
                let updated =
                    item_statistics::update_cas(tx, &row, expected_version, now_fallback(stats))?;
                if !updated {
                    return Err(StorageError::VersionConflict {
                        entity: stats.item_id.to_string(),
                    });
                }
                if let Some(change) = change {
                    status_history::append(
                        tx,
                        &status_history::StatusChangeRow {
                            item_id: stats.item_id.to_string(),
                            from_status: change.from.name().to_string(),
                            to_status: change.to.name().to_string(),
                            changed_at: change.changed_at,
                            reason: change.reason.clone(),
                        },
                    )?;
                }
                Ok(())
            })
        })
    }

    fn status_history(&self, item_id: &ItemId) -> Result<Vec<StatusChange>, StorageError> {
        self.db.with_reader(|conn| {
            status_history::history_for_item(conn, item_id.as_str())?
                .into_iter()
                .map(|row| {
                    Ok(StatusChange {
                        from: parse_status(&row.from_status)?,
                        to: parse_status(&row.to_status)?,
                        changed_at: row.changed_at,
                        reason: row.reason,
                    })
                })
                .collect()
        })
    }

    fn save_competency_reliability(
        &self,
        rel: &CompetencyReliability,
    ) -> Result<(), StorageError> {
        let row = reliability::CompetencyReliabilityRow {
            competency_id: rel.competency_id.to_string(),
            cronbach_alpha: rel.cronbach_alpha,
            sample_size: rel.sample_size as i64,
            item_count: rel.item_count as i64,
            reliability_status: rel.reliability_status.name().to_string(),
            alpha_if_deleted: to_json(&rel.alpha_if_deleted)?,
            last_calculated_at: rel.last_calculated_at,
        };
        self.db
            .with_writer(|conn| reliability::upsert_competency(conn, &row))
    }

    fn save_trait_reliability(&self, rel: &BigFiveReliability) -> Result<(), StorageError> {
        let row = reliability::TraitReliabilityRow {
            trait_name: rel.trait_name.name().to_string(),
            cronbach_alpha: rel.cronbach_alpha,
            sample_size: rel.sample_size as i64,
            total_items: rel.total_items as i64,
            reliability_status: rel.reliability_status.name().to_string(),
            alpha_if_deleted: to_json(&rel.alpha_if_deleted)?,
            contributing_competencies: to_json(&rel.contributing_competencies)?,
            last_calculated_at: rel.last_calculated_at,
        };
        self.db
            .with_writer(|conn| reliability::upsert_trait(conn, &row))
    }

    fn last_audit_completed_at(&self) -> Result<Option<i64>, StorageError> {
        self.db.with_reader(audit_runs::last_completed_at)
    }

    fn last_calibration_at(&self) -> Result<Option<i64>, StorageError> {
        self.db.with_reader(audit_runs::last_calibration_at)
    }

    fn record_audit_run(&self, run: &AuditRunRecord) -> Result<(), StorageError> {
        self.db.with_writer(|conn| {
            audit_runs::insert(
                conn,
                run.started_at,
                run.completed_at,
                run.items_recalculated as i64,
                run.items_failed as i64,
                run.items_skipped as i64,
                run.competencies_recalculated as i64,
                run.traits_recalculated as i64,
                run.status_changes as i64,
                run.calibrated,
                &run.status,
                run.error.as_deref(),
            )
            .map(|_| ())
        })?;
        // Audit runs are the natural WAL checkpoint boundary.
        self.db.checkpoint()
    }
}

fn now_fallback(stats: &ItemStatistics) -> i64 {
    stats.last_calculated_at.unwrap_or(0)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Option<String>, StorageError> {
    serde_json::to_string(value)
        .map(Some)
        .map_err(|e| StorageError::SqliteError {
            message: format!("json encode: {e}"),
        })
}

fn parse_status(name: &str) -> Result<ValidityStatus, StorageError> {
    ValidityStatus::from_name(name).ok_or_else(|| StorageError::SqliteError {
        message: format!("unknown validity status: {name}"),
    })
}

fn item_from_row(row: item_statistics::ItemStatisticsRow) -> Result<ItemStatistics, StorageError> {
    let distractor_efficiency: FxHashMap<OptionId, f64> = match &row.distractor_efficiency {
        Some(json) => {
            serde_json::from_str(json).map_err(|e| StorageError::SqliteError {
                message: format!("json decode distractor_efficiency: {e}"),
            })?
        }
        None => FxHashMap::default(),
    };

    Ok(ItemStatistics {
        item_id: ItemId::new(row.item_id),
        competency_id: CompetencyId::new(row.competency_id),
        response_count: row.response_count as u32,
        difficulty_index: row.difficulty_index,
        discrimination_index: row.discrimination_index,
        previous_discrimination_index: row.previous_discrimination_index,
        distractor_efficiency,
        validity_status: parse_status(&row.validity_status)?,
        difficulty_flag: DifficultyFlag::from_name(&row.difficulty_flag).ok_or_else(|| {
            StorageError::SqliteError {
                message: format!("unknown difficulty flag: {}", row.difficulty_flag),
            }
        })?,
        discrimination_flag: DiscriminationFlag::from_name(&row.discrimination_flag)
            .ok_or_else(|| StorageError::SqliteError {
                message: format!("unknown discrimination flag: {}", row.discrimination_flag),
            })?,
        irt_discrimination: row.irt_discrimination,
        irt_difficulty: row.irt_difficulty,
        irt_guessing: row.irt_guessing,
        last_calculated_at: row.last_calculated_at,
    })
}

fn item_to_row(
    stats: &ItemStatistics,
    version: i64,
) -> Result<item_statistics::ItemStatisticsRow, StorageError> {
    Ok(item_statistics::ItemStatisticsRow {
        item_id: stats.item_id.to_string(),
        competency_id: stats.competency_id.to_string(),
        response_count: stats.response_count as i64,
        difficulty_index: stats.difficulty_index,
        discrimination_index: stats.discrimination_index,
        previous_discrimination_index: stats.previous_discrimination_index,
        distractor_efficiency: to_json(&stats.distractor_efficiency)?,
        validity_status: stats.validity_status.name().to_string(),
        difficulty_flag: stats.difficulty_flag.name().to_string(),
        discrimination_flag: stats.discrimination_flag.name().to_string(),
        irt_discrimination: stats.irt_discrimination,
        irt_difficulty: stats.irt_difficulty,
        irt_guessing: stats.irt_guessing,
        last_calculated_at: stats.last_calculated_at,
        version,
    })
}

fn competency_reliability_from_row(
    row: reliability::CompetencyReliabilityRow,
) -> Result<CompetencyReliability, StorageError> {
    use calibra_core::types::ReliabilityStatus;
    let alpha_if_deleted: FxHashMap<ItemId, f64> = match &row.alpha_if_deleted {
        Some(json) => serde_json::from_str(json).map_err(|e| StorageError::SqliteError {
            message: format!("json decode alpha_if_deleted: {e}"),
        })?,
        None => FxHashMap::default(),
    };
    Ok(CompetencyReliability {
        competency_id: CompetencyId::new(row.competency_id),
        cronbach_alpha: row.cronbach_alpha,
        sample_size: row.sample_size as u32,
        item_count: row.item_count as u32,
        reliability_status: ReliabilityStatus::from_name(&row.reliability_status)
            .ok_or_else(|| StorageError::SqliteError {
                message: format!("unknown reliability status: {}", row.reliability_status),
            })?,
        alpha_if_deleted,
        last_calculated_at: row.last_calculated_at,
    })
}

fn trait_reliability_from_row(
    row: reliability::TraitReliabilityRow,
) -> Result<BigFiveReliability, StorageError> {
    use calibra_core::types::{BigFiveTrait, ReliabilityStatus};
    let alpha_if_deleted: FxHashMap<ItemId, f64> = match &row.alpha_if_deleted {
        Some(json) => serde_json::from_str(json).map_err(|e| StorageError::SqliteError {
            message: format!("json decode alpha_if_deleted: {e}"),
        })?,
        None => FxHashMap::default(),
    };
    let contributing_competencies: Vec<CompetencyId> = match &row.contributing_competencies {
        Some(json) => serde_json::from_str(json).map_err(|e| StorageError::SqliteError {
            message: format!("json decode contributing_competencies: {e}"),
        })?,
        None => Vec::new(),
    };
    Ok(BigFiveReliability {
        trait_name: BigFiveTrait::from_name(&row.trait_name).ok_or_else(|| {
            StorageError::SqliteError {
                message: format!("unknown trait: {}", row.trait_name),
            }
        })?,
        cronbach_alpha: row.cronbach_alpha,
        sample_size: row.sample_size as u32,
        total_items: row.total_items as u32,
        reliability_status: ReliabilityStatus::from_name(&row.reliability_status)
            .ok_or_else(|| StorageError::SqliteError {
                message: format!("unknown reliability status: {}", row.reliability_status),
            })?,
        alpha_if_deleted,
        contributing_competencies,
        last_calculated_at: row.last_calculated_at,
    })
}
