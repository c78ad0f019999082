//! Validity status machine.
//!
//! Automatic transitions are applied by the audit job from metric flags;
//! manual overrides come from an admin and bypass the automatic policy
//! but never the transition table. Every applied transition appends an
//! immutable `StatusChange`; automatic reasons are prefixed `auto:` and
//! manual reasons `manual:` so the audit trail distinguishes them.

use tracing::info;

use calibra_core::errors::StatusError;
use calibra_core::types::{
    DifficultyFlag, DiscriminationFlag, ItemStatistics, StatusChange, ValidityStatus,
};

/// Legal edges of the lifecycle, manual reactivation included.
/// The reactivation precondition (non-negative discrimination) is
/// enforced separately in `apply_manual`.
pub fn can_transition(from: ValidityStatus, to: ValidityStatus) -> bool {
    use ValidityStatus::*;
    matches!(
        (from, to),
        (Probation, Active)
            | (Probation, FlaggedForReview)
            | (Probation, Retired)
            | (Active, FlaggedForReview)
            | (Active, Retired)
            | (FlaggedForReview, Active)
            | (FlaggedForReview, Retired)
            | (Retired, Active)
    )
}

/// The automatic policy. Returns the transition the current metrics call
/// for, or `None` when the item should stay where it is.
///
/// Below 50 responses nothing ever fires, regardless of metric values.
/// Severity wins: retirement (negative discrimination) over flagging over
/// activation. Flagged items are only promoted back manually.
pub fn evaluate_automatic(
    stats: &ItemStatistics,
    activation_discrimination: f64,
) -> Option<(ValidityStatus, String)> {
    if !stats.has_sufficient_data() {
        return None;
    }
    let current = stats.validity_status;
    if current == ValidityStatus::Retired {
        return None;
    }

    if stats.discrimination_flag == DiscriminationFlag::Negative {
        let rpb = stats.discrimination_index.unwrap_or(f64::NAN);
        return Some((
            ValidityStatus::Retired,
            format!("auto: negative discrimination (rpb = {rpb:.3})"),
        ));
    }

    let discrimination_bad = matches!(
        stats.discrimination_flag,
        DiscriminationFlag::Critical | DiscriminationFlag::Warning
    );
    let difficulty_bad = stats.difficulty_flag != DifficultyFlag::None;
    if (discrimination_bad || difficulty_bad) && current != ValidityStatus::FlaggedForReview {
        let mut reasons = Vec::new();
        if discrimination_bad {
            reasons.push(format!(
                "discrimination {}",
                stats.discrimination_flag.name()
            ));
        }
        if difficulty_bad {
            reasons.push(format!("difficulty {}", stats.difficulty_flag.name()));
        }
        return Some((
            ValidityStatus::FlaggedForReview,
            format!("auto: {}", reasons.join(", ")),
        ));
    }

    if current == ValidityStatus::Probation && !discrimination_bad && !difficulty_bad {
        if let Some(rpb) = stats.discrimination_index {
            if rpb >= activation_discrimination {
                return Some((
                    ValidityStatus::Active,
                    format!(
                        "auto: activation criteria met ({} responses, rpb = {rpb:.3})",
                        stats.response_count
                    ),
                ));
            }
        }
    }

    None
}

/// Apply the automatic policy, mutating the record and returning the
/// audit entry when a transition fired.
pub fn apply_automatic(
    stats: &mut ItemStatistics,
    activation_discrimination: f64,
    now: i64,
) -> Option<StatusChange> {
    let (to, reason) = evaluate_automatic(stats, activation_discrimination)?;
    if !can_transition(stats.validity_status, to) {
        return None;
    }
    let change = StatusChange {
        from: stats.validity_status,
        to,
        changed_at: now,
        reason,
    };
    info!(
        item = %stats.item_id,
        from = %change.from,
        to = %change.to,
        "automatic status transition"
    );
    stats.validity_status = to;
    Some(change)
}

/// Apply a manual admin override.
///
/// Requires a non-empty reason. Reactivating a retired item is rejected
/// unless the current discrimination is known and non-negative; every
/// other illegal edge is an invalid transition. On success the record is
/// mutated and the audit entry returned.
pub fn apply_manual(
    stats: &mut ItemStatistics,
    to: ValidityStatus,
    reason: &str,
    now: i64,
) -> Result<StatusChange, StatusError> {
    if reason.trim().is_empty() {
        return Err(StatusError::MissingReason);
    }
    let from = stats.validity_status;
    if from == to || !can_transition(from, to) {
        return Err(StatusError::InvalidTransition { from, to });
    }
    if from == ValidityStatus::Retired && to == ValidityStatus::Active {
        match stats.discrimination_index {
            Some(rpb) if rpb >= 0.0 => {}
            other => {
                return Err(StatusError::ReactivationBlocked {
                    discrimination: other,
                });
            }
        }
    }

    let change = StatusChange {
        from,
        to,
        changed_at: now,
        reason: format!("manual: {}", reason.trim()),
    };
    info!(item = %stats.item_id, from = %from, to = %to, "manual status override");
    stats.validity_status = to;
    Ok(change)
}
