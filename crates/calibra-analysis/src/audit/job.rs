//! The audit job: a stateless batch pass over all items, competencies,
//! and traits.
//!
//! `run_audit` takes "now" explicitly and persists nothing but what goes
//! through the store; the run log's timestamps are the only state carried
//! between runs. A single item's failure is caught and counted, never
//! propagated. Item records are written with compare-and-swap retries so
//! a manual recalculation racing the scheduled job cannot lose updates.

use std::time::Instant;

use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use calibra_core::config::CalibraConfig;
use calibra_core::errors::{AuditError, StorageError};
use calibra_core::traits::{ItemCatalog, ResponseSource, StatisticsStore};
use calibra_core::types::{
    AuditRunRecord, BigFiveTrait, CompetencyId, DifficultyFlag, DiscriminationFlag,
    ItemId, ItemStatistics, Response, SessionId, StatusChange, ValidityStatus,
};

use super::summary::AuditSummary;
use crate::classical::{difficulty_index, distractors, item_discrimination};
use crate::irt::{calibrate, CalibrationResult};
use crate::matrix::MatrixBuilder;
use crate::reliability::{competency_reliability, trait_reliability};
use crate::validity::{apply_automatic, apply_manual};

/// Borrowed collaborators for one audit run.
pub struct AuditContext<'a> {
    pub source: &'a dyn ResponseSource,
    pub catalog: &'a dyn ItemCatalog,
    pub store: &'a dyn StatisticsStore,
    pub config: &'a CalibraConfig,
}

/// What happened to one item during recalculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    Recalculated { status_changed: bool },
    /// No new data, or still under the response gate.
    Skipped,
}

/// Run a full audit pass: every item, every competency, every trait.
/// Returns the summary and appends it to the persisted run log.
pub fn run_audit(now: i64, ctx: &AuditContext<'_>) -> Result<AuditSummary, AuditError> {
    let started = Instant::now();

    let calibration_due = match ctx.store.last_calibration_at()? {
        None => true,
        Some(last) => now - last >= ctx.config.audit.effective_irt_interval_secs(),
    };
    info!(calibration_due, "audit run started");

    let mut summary = AuditSummary {
        calibrated: calibration_due,
        ..AuditSummary::default()
    };

    // Competency responses are fetched once and reused for the trait pass.
    let mut responses_cache: FxHashMap<CompetencyId, Vec<Response>> = FxHashMap::default();

    for competency_id in ctx.catalog.all_competencies() {
        let items = ctx.catalog.competency_items(&competency_id);
        if items.is_empty() {
            continue;
        }

        let responses = match ctx.source.competency_responses(&competency_id) {
            Ok(responses) => responses,
            Err(error) => {
                warn!(
                    competency = %competency_id,
                    %error,
                    "failed to fetch competency responses; skipping"
                );
                summary.items_failed += items.len() as u32;
                continue;
            }
        };

        let competency_summary = process_competency(
            &competency_id,
            &items,
            &responses,
            calibration_due,
            now,
            ctx,
        );
        summary.absorb(&competency_summary);
        responses_cache.insert(competency_id, responses);
    }

    // Trait-level reliability over the union of mapped competencies.
    // Every trait is reported; missing ones come out as insufficient data.
    for trait_name in BigFiveTrait::ALL {
        let competencies = ctx.catalog.trait_competencies(trait_name);
        let mut item_ids: Vec<ItemId> = Vec::new();
        let mut responses: Vec<Response> = Vec::new();
        for competency_id in &competencies {
            item_ids.extend(ctx.catalog.competency_items(competency_id));
            if let Some(cached) = responses_cache.get(competency_id) {
                responses.extend(cached.iter().cloned());
            }
        }
        let reliability =
            trait_reliability(trait_name, competencies, &item_ids, &responses, now);
        match ctx.store.save_trait_reliability(&reliability) {
            Ok(()) => summary.traits_recalculated += 1,
            Err(error) => warn!(trait_name = %trait_name, %error, "failed to save trait reliability"),
        }
    }

    summary.duration_ms = started.elapsed().as_millis() as u64;
    info!(
        items = summary.items_recalculated,
        failed = summary.items_failed,
        skipped = summary.items_skipped,
        status_changes = summary.status_changes,
        duration_ms = summary.duration_ms,
        "audit run finished"
    );

    ctx.store.record_audit_run(&AuditRunRecord {
        started_at: now,
        completed_at: Some(now),
        items_recalculated: summary.items_recalculated,
        items_failed: summary.items_failed,
        items_skipped: summary.items_skipped,
        competencies_recalculated: summary.competencies_recalculated,
        traits_recalculated: summary.traits_recalculated,
        status_changes: summary.status_changes,
        calibrated: calibration_due,
        status: "completed".to_string(),
        error: None,
    })?;

    Ok(summary)
}

/// Recalculate every item of one competency, then its reliability.
fn process_competency(
    competency_id: &CompetencyId,
    items: &[ItemId],
    responses: &[Response],
    calibration_due: bool,
    now: i64,
    ctx: &AuditContext<'_>,
) -> AuditSummary {
    let mut summary = AuditSummary::default();

    let calibration = if calibration_due {
        let matrix = MatrixBuilder::new(&ctx.config.calibration).build(responses);
        if matrix.is_empty() {
            debug!(competency = %competency_id, "matrix empty; no calibration");
            None
        } else {
            Some(calibrate(&matrix, &ctx.config.calibration))
        }
    } else {
        None
    };

    let outcomes: Vec<Result<ItemOutcome, AuditError>> = if ctx.config.audit.effective_parallel()
    {
        items
            .par_iter()
            .map(|item_id| {
                process_item(item_id, responses, calibration.as_ref(), false, now, ctx)
            })
            .collect()
    } else {
        items
            .iter()
            .map(|item_id| {
                process_item(item_id, responses, calibration.as_ref(), false, now, ctx)
            })
            .collect()
    };

    for (item_id, outcome) in items.iter().zip(outcomes) {
        match outcome {
            Ok(ItemOutcome::Recalculated { status_changed }) => {
                summary.items_recalculated += 1;
                if status_changed {
                    summary.status_changes += 1;
                }
            }
            Ok(ItemOutcome::Skipped) => summary.items_skipped += 1,
            Err(AuditError::ItemNotFound { .. }) => summary.items_skipped += 1,
            Err(error) => {
                warn!(item = %item_id, %error, "item recalculation failed");
                summary.items_failed += 1;
            }
        }
    }

    let reliability = competency_reliability(competency_id.clone(), items, responses, now);
    match ctx.store.save_competency_reliability(&reliability) {
        Ok(()) => summary.competencies_recalculated += 1,
        Err(error) => {
            warn!(competency = %competency_id, %error, "failed to save competency reliability");
        }
    }

    summary
}

/// Manually triggered single-item recalculation. Always recomputes, even
/// when no new responses arrived. Returns `ItemNotFound` when the item
/// has no data at all.
pub fn recalculate_item(
    item_id: &ItemId,
    now: i64,
    ctx: &AuditContext<'_>,
) -> Result<ItemOutcome, AuditError> {
    let competency_id =
        ctx.catalog
            .item_competency(item_id)
            .ok_or_else(|| AuditError::ItemNotFound {
                item_id: item_id.clone(),
            })?;
    if ctx.source.item_responses(item_id)?.is_empty() {
        return Err(AuditError::ItemNotFound {
            item_id: item_id.clone(),
        });
    }
    let responses = ctx.source.competency_responses(&competency_id)?;
    process_item(item_id, &responses, None, true, now, ctx)
}

/// Manual status override: bypasses the automatic policy but not the
/// transition table, and still appends to the audit trail. The write goes
/// through the same compare-and-swap loop as recalculation.
pub fn override_status(
    item_id: &ItemId,
    to: ValidityStatus,
    reason: &str,
    now: i64,
    ctx: &AuditContext<'_>,
) -> Result<StatusChange, AuditError> {
    let max_attempts = ctx.config.audit.effective_max_write_retries().max(1);
    for _attempt in 0..max_attempts {
        let (mut stats, version) =
            ctx.store
                .load_item(item_id)?
                .ok_or_else(|| AuditError::ItemNotFound {
                    item_id: item_id.clone(),
                })?;
        let change = apply_manual(&mut stats, to, reason, now)?;
        match ctx.store.save_item(&stats, version, Some(&change)) {
            Ok(()) => return Ok(change),
            Err(StorageError::VersionConflict { .. }) => {
                debug!(item = %item_id, "version conflict; retrying override");
                continue;
            }
            Err(error) => return Err(error.into()),
        }
    }
    Err(AuditError::Storage(StorageError::VersionConflict {
        entity: item_id.to_string(),
    }))
}

/// Recalculate one item from its competency's raw responses.
///
/// Runs the compare-and-swap write loop: on a version conflict the record
/// is re-read and the computation reapplied to fresh data, up to the
/// configured retry cap.
fn process_item(
    item_id: &ItemId,
    competency_responses: &[Response],
    calibration: Option<&CalibrationResult>,
    force: bool,
    now: i64,
    ctx: &AuditContext<'_>,
) -> Result<ItemOutcome, AuditError> {
    // Latest response per session, raw scores.
    let mut by_session: FxHashMap<&SessionId, f64> = FxHashMap::default();
    for response in competency_responses {
        if &response.item_id == item_id {
            by_session.insert(&response.session_id, response.score);
        }
    }
    if by_session.is_empty() {
        return Err(AuditError::ItemNotFound {
            item_id: item_id.clone(),
        });
    }
    let scores: Vec<f64> = by_session.values().copied().collect();
    let response_count = scores.len() as u32;

    let min_sample_size = ctx.config.audit.effective_min_sample_size();
    let activation = ctx.config.thresholds.effective_activation_discrimination();
    let irt_update = calibration.and_then(|result| result.items.get(item_id));

    let max_attempts = ctx.config.audit.effective_max_write_retries().max(1);
    for _attempt in 0..max_attempts {
        let (mut stats, version) = match ctx.store.load_item(item_id)? {
            Some(loaded) => loaded,
            None => {
                // First responses ever seen: create the probation record.
                let fresh =
                    ItemStatistics::probation(item_id.clone(), competency_of(item_id, ctx));
                if let Err(error) = ctx.store.insert_item(&fresh) {
                    // Lost an insert race; re-read the winner's record.
                    debug!(item = %item_id, %error, "concurrent insert; retrying");
                    continue;
                }
                (fresh, 0)
            }
        };

        let has_new_data = response_count != stats.response_count;
        if !force && !has_new_data && irt_update.is_none() && stats.last_calculated_at.is_some()
        {
            return Ok(ItemOutcome::Skipped);
        }

        stats.response_count = response_count;

        let mut status_change = None;
        if response_count >= min_sample_size {
            // Snapshot before overwriting, for degradation detection.
            stats.previous_discrimination_index = stats.discrimination_index;

            stats.difficulty_index = difficulty_index(&scores);
            stats.discrimination_index = item_discrimination(item_id, competency_responses);
            stats.difficulty_flag = stats
                .difficulty_index
                .map(DifficultyFlag::from_index)
                .unwrap_or_default();
            stats.discrimination_flag = stats
                .discrimination_index
                .map(DiscriminationFlag::from_index)
                .unwrap_or_default();

            if let (Ok(Some(selections)), Some(options)) = (
                ctx.source.item_selections(item_id),
                ctx.catalog.item_options(item_id),
            ) {
                stats.distractor_efficiency =
                    distractors::analyze(&selections, &options).rates;
            }

            if let Some(params) = irt_update {
                stats.irt_discrimination = Some(params.discrimination);
                stats.irt_difficulty = Some(params.difficulty);
            }

            stats.last_calculated_at = Some(now);
            status_change = apply_automatic(&mut stats, activation, now);
        }

        match ctx.store.save_item(&stats, version, status_change.as_ref()) {
            Ok(()) => {
                let outcome = if response_count >= min_sample_size {
                    ItemOutcome::Recalculated {
                        status_changed: status_change.is_some(),
                    }
                } else {
                    ItemOutcome::Skipped
                };
                return Ok(outcome);
            }
            Err(StorageError::VersionConflict { .. }) => {
                debug!(item = %item_id, "version conflict; retrying with fresh data");
                continue;
            }
            Err(error) => return Err(error.into()),
        }
    }

    Err(AuditError::Storage(StorageError::VersionConflict {
        entity: item_id.to_string(),
    }))
}

fn competency_of(item_id: &ItemId, ctx: &AuditContext<'_>) -> CompetencyId {
    ctx.catalog
        .item_competency(item_id)
        .unwrap_or_else(|| CompetencyId::new(""))
}
