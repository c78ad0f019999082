//! Review queue: items whose flags call for human attention, ordered by
//! severity.

use serde::Serialize;

use calibra_core::types::{
    DifficultyFlag, DiscriminationFlag, ItemId, ItemStatistics, ValidityStatus,
};

/// One entry in the review queue.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewItem {
    pub item_id: ItemId,
    pub validity_status: ValidityStatus,
    pub difficulty_flag: DifficultyFlag,
    pub discrimination_flag: DiscriminationFlag,
    pub discrimination_index: Option<f64>,
    pub severity: u32,
}

/// Severity score from the flag combination. Negative discrimination
/// outranks critical, critical outranks warning; difficulty extremes add
/// a smaller increment on top.
pub fn severity_score(
    difficulty_flag: DifficultyFlag,
    discrimination_flag: DiscriminationFlag,
) -> u32 {
    let discrimination = match discrimination_flag {
        DiscriminationFlag::Negative => 100,
        DiscriminationFlag::Critical => 60,
        DiscriminationFlag::Warning => 30,
        DiscriminationFlag::None => 0,
    };
    let difficulty = match difficulty_flag {
        DifficultyFlag::TooHard | DifficultyFlag::TooEasy => 10,
        DifficultyFlag::None => 0,
    };
    discrimination + difficulty
}

/// Items requiring review: anything carrying a flag or already sitting in
/// the flagged state. Sorted by severity descending, then by item id for
/// a stable order.
pub fn items_requiring_review(items: &[ItemStatistics]) -> Vec<ReviewItem> {
    let mut review: Vec<ReviewItem> = items
        .iter()
        .filter_map(|stats| {
            let severity = severity_score(stats.difficulty_flag, stats.discrimination_flag);
            if severity == 0 && stats.validity_status != ValidityStatus::FlaggedForReview {
                return None;
            }
            Some(ReviewItem {
                item_id: stats.item_id.clone(),
                validity_status: stats.validity_status,
                difficulty_flag: stats.difficulty_flag,
                discrimination_flag: stats.discrimination_flag,
                discrimination_index: stats.discrimination_index,
                severity,
            })
        })
        .collect();
    review.sort_by(|left, right| {
        right
            .severity
            .cmp(&left.severity)
            .then_with(|| left.item_id.cmp(&right.item_id))
    });
    review
}

#[cfg(test)]
mod tests {
    use super::*;
    use calibra_core::types::CompetencyId;

    fn stats(
        id: &str,
        difficulty_flag: DifficultyFlag,
        discrimination_flag: DiscriminationFlag,
    ) -> ItemStatistics {
        let mut stats = ItemStatistics::probation(ItemId::from(id), CompetencyId::from("c1"));
        stats.difficulty_flag = difficulty_flag;
        stats.discrimination_flag = discrimination_flag;
        stats
    }

    #[test]
    fn test_severity_ordering() {
        assert!(
            severity_score(DifficultyFlag::None, DiscriminationFlag::Negative)
                > severity_score(DifficultyFlag::TooHard, DiscriminationFlag::Critical)
        );
        assert!(
            severity_score(DifficultyFlag::None, DiscriminationFlag::Critical)
                > severity_score(DifficultyFlag::TooEasy, DiscriminationFlag::Warning)
        );
        assert_eq!(severity_score(DifficultyFlag::None, DiscriminationFlag::None), 0);
    }

    #[test]
    fn test_clean_items_excluded() {
        let items = vec![
            stats("q1", DifficultyFlag::None, DiscriminationFlag::None),
            stats("q2", DifficultyFlag::TooHard, DiscriminationFlag::None),
        ];
        let review = items_requiring_review(&items);
        assert_eq!(review.len(), 1);
        assert_eq!(review[0].item_id, ItemId::from("q2"));
    }

    #[test]
    fn test_sorted_by_severity_then_id() {
        let items = vec![
            stats("q1", DifficultyFlag::TooHard, DiscriminationFlag::Warning),
            stats("q2", DifficultyFlag::None, DiscriminationFlag::Negative),
            stats("q3", DifficultyFlag::None, DiscriminationFlag::Warning),
            stats("q0", DifficultyFlag::None, DiscriminationFlag::Warning),
        ];
        let review = items_requiring_review(&items);
        let order: Vec<&str> = review.iter().map(|r| r.item_id.as_str()).collect();
        assert_eq!(order, vec!["q2", "q1", "q0", "q3"]);
    }

    #[test]
    fn test_flagged_status_included_without_flags() {
        let mut flagged = stats("q1", DifficultyFlag::None, DiscriminationFlag::None);
        flagged.validity_status = ValidityStatus::FlaggedForReview;
        let review = items_requiring_review(&[flagged]);
        assert_eq!(review.len(), 1);
        assert_eq!(review[0].severity, 0);
    }
}
