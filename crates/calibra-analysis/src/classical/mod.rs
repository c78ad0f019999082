//! Classical test-theory item statistics: difficulty index, point-biserial
//! discrimination, and distractor efficiency. Independent of IRT; both
//! feed the same validity-status decision.

pub mod difficulty;
pub mod discrimination;
pub mod distractors;

pub use difficulty::difficulty_index;
pub use discrimination::{item_discrimination, point_biserial};
pub use distractors::{analyze, non_functioning, selection_rates, DistractorReport};
