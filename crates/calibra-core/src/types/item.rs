//! Per-item statistics record and the validity lifecycle vocabulary.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::constants::{
    DISCRIMINATION_CRITICAL_BELOW, DISCRIMINATION_WARNING_BELOW, MIN_SAMPLE_SIZE,
    TOO_EASY_ABOVE, TOO_HARD_BELOW,
};
use crate::types::{CompetencyId, ItemId, OptionId};

/// Validity lifecycle state of an item.
///
/// probation -> {active, flagged_for_review, retired}
/// active -> {flagged_for_review, retired}
/// flagged_for_review -> {active, retired}
/// retired is terminal except for manual reactivation, which requires a
/// non-negative current discrimination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidityStatus {
    /// Collecting responses; no metrics yet. Initial state for every item.
    Probation,
    /// Metrics meet the quality bar; the item counts toward scoring.
    Active,
    /// One or more metrics breached a threshold; awaiting human review.
    FlaggedForReview,
    /// Withdrawn from delivery. The record persists for history.
    Retired,
}

impl ValidityStatus {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Probation => "probation",
            Self::Active => "active",
            Self::FlaggedForReview => "flagged_for_review",
            Self::Retired => "retired",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "probation" => Some(Self::Probation),
            "active" => Some(Self::Active),
            "flagged_for_review" => Some(Self::FlaggedForReview),
            "retired" => Some(Self::Retired),
            _ => None,
        }
    }
}

impl fmt::Display for ValidityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classical difficulty flag derived from the difficulty index (p-value).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyFlag {
    #[default]
    None,
    /// Difficulty index below 0.2 — almost nobody gets it right.
    TooHard,
    /// Difficulty index above 0.9 — almost everybody gets it right.
    TooEasy,
}

impl DifficultyFlag {
    /// Classify a difficulty index into a flag.
    pub fn from_index(index: f64) -> Self {
        if index < TOO_HARD_BELOW {
            Self::TooHard
        } else if index > TOO_EASY_ABOVE {
            Self::TooEasy
        } else {
            Self::None
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::TooHard => "too_hard",
            Self::TooEasy => "too_easy",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "none" => Some(Self::None),
            "too_hard" => Some(Self::TooHard),
            "too_easy" => Some(Self::TooEasy),
            _ => None,
        }
    }
}

impl fmt::Display for DifficultyFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Discrimination flag derived from the point-biserial correlation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscriminationFlag {
    #[default]
    None,
    /// Point-biserial in `[0.1, 0.25)` — weak separation.
    Warning,
    /// Point-biserial in `[0, 0.1)` — effectively no separation.
    Critical,
    /// Point-biserial below zero — the item penalizes skilled respondents.
    Negative,
}

impl DiscriminationFlag {
    /// Classify a point-biserial correlation into a flag.
    pub fn from_index(rpb: f64) -> Self {
        if rpb < 0.0 {
            Self::Negative
        } else if rpb < DISCRIMINATION_CRITICAL_BELOW {
            Self::Critical
        } else if rpb < DISCRIMINATION_WARNING_BELOW {
            Self::Warning
        } else {
            Self::None
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Warning => "warning",
            Self::Critical => "critical",
            Self::Negative => "negative",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "none" => Some(Self::None),
            "warning" => Some(Self::Warning),
            "critical" => Some(Self::Critical),
            "negative" => Some(Self::Negative),
            _ => None,
        }
    }
}

impl fmt::Display for DiscriminationFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One immutable entry in an item's status audit trail.
///
/// History is an append-only log keyed by item id, written in the same
/// transaction as the status column. It is never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChange {
    pub from: ValidityStatus,
    pub to: ValidityStatus,
    /// Unix seconds, supplied by the caller.
    pub changed_at: i64,
    /// `auto: ...` for transitions applied by recalculation,
    /// `manual: ...` for admin overrides.
    pub reason: String,
}

/// The per-item statistics record, one per assessment item.
///
/// `None` metrics mean insufficient data, never a computation error.
/// Metrics stay `None` until the item has at least 50 responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemStatistics {
    pub item_id: ItemId,
    pub competency_id: CompetencyId,
    pub response_count: u32,
    /// Mean normalized score (classical p-value). Higher = easier.
    pub difficulty_index: Option<f64>,
    /// Point-biserial correlation against the rest-score.
    pub discrimination_index: Option<f64>,
    /// Snapshot taken immediately before each recalculation, for trend
    /// and degradation detection.
    pub previous_discrimination_index: Option<f64>,
    /// Selection rate per non-correct option. Empty for non-choice items.
    pub distractor_efficiency: FxHashMap<OptionId, f64>,
    pub validity_status: ValidityStatus,
    pub difficulty_flag: DifficultyFlag,
    pub discrimination_flag: DiscriminationFlag,
    /// 2PL discrimination (a).
    pub irt_discrimination: Option<f64>,
    /// 2PL difficulty (b).
    pub irt_difficulty: Option<f64>,
    /// Guessing parameter (c). Stored for forward compatibility; never
    /// estimated by this engine.
    pub irt_guessing: Option<f64>,
    /// Unix seconds of the last recalculation. `None` until the first.
    pub last_calculated_at: Option<i64>,
}

impl ItemStatistics {
    /// Fresh record for an item that just received its first responses:
    /// probation, all metrics null.
    pub fn probation(item_id: ItemId, competency_id: CompetencyId) -> Self {
        Self {
            item_id,
            competency_id,
            response_count: 0,
            difficulty_index: None,
            discrimination_index: None,
            previous_discrimination_index: None,
            distractor_efficiency: FxHashMap::default(),
            validity_status: ValidityStatus::Probation,
            difficulty_flag: DifficultyFlag::None,
            discrimination_flag: DiscriminationFlag::None,
            irt_discrimination: None,
            irt_difficulty: None,
            irt_guessing: None,
            last_calculated_at: None,
        }
    }

    /// True once the 50-response gate is met.
    pub fn has_sufficient_data(&self) -> bool {
        self.response_count >= MIN_SAMPLE_SIZE
    }

    /// Change in discrimination since the previous recalculation, when
    /// both snapshots exist. Negative values indicate degradation.
    pub fn discrimination_trend(&self) -> Option<f64> {
        match (self.discrimination_index, self.previous_discrimination_index) {
            (Some(current), Some(previous)) => Some(current - previous),
            _ => None,
        }
    }
}
