//! Big-Five-level reliability: aggregates the union of items across every
//! competency mapped to a trait.

use rustc_hash::FxHashMap;

use calibra_core::types::{
    BigFiveReliability, BigFiveTrait, CompetencyId, ItemId, ReliabilityStatus, Response,
};

use super::{alpha_if_deleted, cronbach_alpha, score_columns};

/// Assemble the reliability record for one Big Five trait.
///
/// `item_ids` is the union of items across `contributing_competencies`,
/// and `responses` the union of their response sets. A trait with no
/// current data reports insufficient data rather than being omitted.
pub fn trait_reliability(
    trait_name: BigFiveTrait,
    contributing_competencies: Vec<CompetencyId>,
    item_ids: &[ItemId],
    responses: &[Response],
    now: i64,
) -> BigFiveReliability {
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

    BigFiveReliability {
        trait_name,
        cronbach_alpha: alpha,
        sample_size,
        total_items: present.len() as u32,
        reliability_status: ReliabilityStatus::from_alpha(alpha),
        alpha_if_deleted: deleted,
        contributing_competencies,
        last_calculated_at: now,
    }
}
