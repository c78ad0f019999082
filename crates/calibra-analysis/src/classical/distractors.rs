//! Distractor efficiency for choice-type items.

use rustc_hash::FxHashMap;

use calibra_core::traits::ItemOptions;
use calibra_core::types::OptionId;

/// Distractor analysis for one choice-type item.
#[derive(Debug, Clone)]
pub struct DistractorReport {
    /// Selection rate per non-correct option.
    pub rates: FxHashMap<OptionId, f64>,
    /// Options nobody selected. Surfaced as a recommendation, not a flag.
    pub non_functioning: Vec<OptionId>,
}

impl DistractorReport {
    /// Human-readable recommendation, `None` when every distractor works.
    pub fn recommendation(&self) -> Option<String> {
        if self.non_functioning.is_empty() {
            return None;
        }
        let names: Vec<&str> = self
            .non_functioning
            .iter()
            .map(|option| option.as_str())
            .collect();
        Some(format!(
            "Non-functioning distractors ({}): consider replacing them with more plausible alternatives",
            names.join(", ")
        ))
    }
}

/// Selection rate for each non-correct option, as a fraction of all
/// recorded selections (correct ones included in the denominator).
pub fn selection_rates(
    selections: &FxHashMap<OptionId, u32>,
    options: &ItemOptions,
) -> FxHashMap<OptionId, f64> {
    let total: u32 = selections.values().sum();
    let mut rates = FxHashMap::default();
    for option in &options.distractors {
        let count = selections.get(option).copied().unwrap_or(0);
        let rate = if total > 0 {
            count as f64 / total as f64
        } else {
            0.0
        };
        rates.insert(option.clone(), rate);
    }
    rates
}

/// Distractors with a selection rate of exactly zero, sorted for
/// deterministic output.
pub fn non_functioning(rates: &FxHashMap<OptionId, f64>) -> Vec<OptionId> {
    let mut dead: Vec<OptionId> = rates
        .iter()
        .filter(|(_, &rate)| rate == 0.0)
        .map(|(option, _)| option.clone())
        .collect();
    dead.sort();
    dead
}

/// Full distractor report for one item.
pub fn analyze(
    selections: &FxHashMap<OptionId, u32>,
    options: &ItemOptions,
) -> DistractorReport {
    let rates = selection_rates(selections, options);
    let dead = non_functioning(&rates);
    DistractorReport {
        rates,
        non_functioning: dead,
    }
}
