//! Read-only source of raw response data.

use rustc_hash::FxHashMap;

use crate::errors::AuditError;
use crate::types::{CompetencyId, ItemId, OptionId, Response, SessionId};

/// Source of raw response data, owned by a collaborator (the test-session
/// subsystem). The engine only ever reads through this seam.
///
/// Implementations return fully materialized vectors; the per-item and
/// per-competency result sets are bounded by respondent counts, not by
/// total system size.
pub trait ResponseSource: Send + Sync {
    /// All (respondent session, normalized score) pairs recorded for one
    /// item. One entry per session; sources deduplicate retakes.
    fn item_responses(&self, item_id: &ItemId) -> Result<Vec<(SessionId, f64)>, AuditError>;

    /// All (respondent, item, score) triples for one competency.
    fn competency_responses(
        &self,
        competency_id: &CompetencyId,
    ) -> Result<Vec<Response>, AuditError>;

    /// Selection counts per option for a choice-type item, including the
    /// correct option. `None` for items without enumerated options.
    fn item_selections(
        &self,
        item_id: &ItemId,
    ) -> Result<Option<FxHashMap<OptionId, u32>>, AuditError>;
}
