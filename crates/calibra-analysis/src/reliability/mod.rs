//! Internal-consistency reliability: Cronbach's Alpha with leave-one-out
//! sensitivity, per competency and aggregated per Big Five trait.

pub mod alpha;
pub mod trait_level;

use rustc_hash::FxHashMap;

use calibra_core::types::{
    CompetencyId, CompetencyReliability, ItemId, ReliabilityStatus, Response,
};

pub use alpha::{alpha_if_deleted, cronbach_alpha, DeletionImpact};
pub use trait_level::trait_reliability;

/// Per-item score columns over the respondents with full coverage of the
/// given items. Returns `(item_ids, columns)` with columns aligned to the
/// returned ids; items nobody answered are dropped.
pub(crate) fn score_columns(
    item_ids: &[ItemId],
    responses: &[Response],
) -> (Vec<ItemId>, Vec<Vec<f64>>) {
    use calibra_core::types::SessionId;

    let mut by_session: FxHashMap<&SessionId, FxHashMap<&ItemId, f64>> = FxHashMap::default();
    for response in responses {
        by_session
            .entry(&response.session_id)
            .or_default()
            .insert(&response.item_id, response.score);
    }

    let mut present: Vec<ItemId> = item_ids
        .iter()
        .filter(|id| by_session.values().any(|answers| answers.contains_key(id)))
        .cloned()
        .collect();
    present.sort();
    present.dedup();

    if present.is_empty() {
        return (present, Vec::new());
    }

    let mut sessions: Vec<&&SessionId> = by_session
        .iter()
        .filter(|(_, answers)| present.iter().all(|id| answers.contains_key(id)))
        .map(|(session, _)| session)
        .collect();
    sessions.sort();

    let columns = present
        .iter()
        .map(|id| {
            sessions
                .iter()
                .map(|session| by_session[**session][id])
                .collect()
        })
        .collect();

    (present, columns)
}

/// Assemble the reliability record for one competency scale.
///
/// `item_ids` comes from the catalog; respondents with partial coverage
/// are excluded, matching the response-matrix convention. The status is
/// derived purely from the alpha value.
pub fn competency_reliability(
    competency_id: CompetencyId,
    item_ids: &[ItemId],
    responses: &[Response],
    now: i64,
) -> CompetencyReliability {
    let (present, columns) = score_columns(item_ids, responses);
    let sample_size = columns.first().map_or(0, Vec::len) as u32;
    let alpha = cronbach_alpha(&columns);

    let mut deleted = FxHashMap::default();
    if alpha.is_some() {
        for (idx, value) in alpha_if_deleted(&columns).into_iter().enumerate() {
            if let Some(value) = value {
                deleted.insert(present[idx].clone(), value);
            }
        }
    }

    CompetencyReliability {
        competency_id,
        cronbach_alpha: alpha,
        sample_size,
        item_count: present.len() as u32,
        reliability_status: ReliabilityStatus::from_alpha(alpha),
        alpha_if_deleted: deleted,
        last_calculated_at: now,
    }
}

/// Removal candidates for a computed reliability record: items whose
/// deletion improves alpha by at least the revision threshold, with the
/// impact tier attached. Sorted by improvement, largest first.
pub fn deletion_recommendations(
    reliability: &CompetencyReliability,
) -> Vec<(ItemId, f64, DeletionImpact)> {
    let Some(alpha) = reliability.cronbach_alpha else {
        return Vec::new();
    };
    let mut candidates: Vec<(ItemId, f64, DeletionImpact)> = reliability
        .alpha_if_deleted
        .iter()
        .filter_map(|(item, &deleted)| {
            let improvement = deleted - alpha;
            if DeletionImpact::is_removal_candidate(improvement) {
                Some((
                    item.clone(),
                    improvement,
                    DeletionImpact::from_improvement(improvement),
                ))
            } else {
                None
            }
        })
        .collect();
    candidates.sort_by(|left, right| {
        right
            .1
            .partial_cmp(&left.1)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    candidates
}
