//! Item/question catalog metadata.

use crate::types::{BigFiveTrait, CompetencyId, ItemId, OptionId};

/// Option metadata for a choice-type item.
#[derive(Debug, Clone)]
pub struct ItemOptions {
    pub correct: OptionId,
    pub distractors: Vec<OptionId>,
}

/// Catalog of items, competencies, and the trait mapping. Owned by a
/// collaborator; the engine uses it only to attribute statistics.
pub trait ItemCatalog: Send + Sync {
    /// Every competency known to the catalog.
    fn all_competencies(&self) -> Vec<CompetencyId>;

    /// Items belonging to one competency scale.
    fn competency_items(&self, competency_id: &CompetencyId) -> Vec<ItemId>;

    /// The competency an item belongs to, if the item is known.
    fn item_competency(&self, item_id: &ItemId) -> Option<CompetencyId>;

    /// Option identifiers for a choice-type item. `None` for items
    /// without enumerated options (no distractor analysis for those).
    fn item_options(&self, item_id: &ItemId) -> Option<ItemOptions>;

    /// Competencies mapped to a Big Five trait. May be empty; trait
    /// reliability then reports insufficient data rather than omitting
    /// the trait.
    fn trait_competencies(&self, trait_name: BigFiveTrait) -> Vec<CompetencyId>;
}
