//! Reliability records: per-competency and per-Big-Five-trait internal
//! consistency, derived from Cronbach's Alpha.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::constants::{ALPHA_ACCEPTABLE, ALPHA_RELIABLE};
use crate::types::{CompetencyId, ItemId};

/// Reliability classification. Derivable purely from the alpha value via
/// fixed thresholds; `from_alpha` is the only constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReliabilityStatus {
    /// alpha >= 0.7
    Reliable,
    /// alpha in [0.6, 0.7)
    Acceptable,
    /// alpha < 0.6
    Unreliable,
    /// Fewer than 2 items or fewer than 50 respondents.
    InsufficientData,
}

impl ReliabilityStatus {
    /// Classify an alpha value. `None` always maps to insufficient data.
    pub fn from_alpha(alpha: Option<f64>) -> Self {
        match alpha {
            Some(a) if a >= ALPHA_RELIABLE => Self::Reliable,
            Some(a) if a >= ALPHA_ACCEPTABLE => Self::Acceptable,
            Some(_) => Self::Unreliable,
            None => Self::InsufficientData,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Reliable => "reliable",
            Self::Acceptable => "acceptable",
            Self::Unreliable => "unreliable",
            Self::InsufficientData => "insufficient_data",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "reliable" => Some(Self::Reliable),
            "acceptable" => Some(Self::Acceptable),
            "unreliable" => Some(Self::Unreliable),
            "insufficient_data" => Some(Self::InsufficientData),
            _ => None,
        }
    }
}

impl fmt::Display for ReliabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One of the five personality dimensions items aggregate into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BigFiveTrait {
    Openness,
    Conscientiousness,
    Extraversion,
    Agreeableness,
    Neuroticism,
}

impl BigFiveTrait {
    /// All five traits. Reliability reports always cover every entry,
    /// using insufficient-data status for traits absent from current data.
    pub const ALL: [Self; 5] = [
        Self::Openness,
        Self::Conscientiousness,
        Self::Extraversion,
        Self::Agreeableness,
        Self::Neuroticism,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Openness => "openness",
            Self::Conscientiousness => "conscientiousness",
            Self::Extraversion => "extraversion",
            Self::Agreeableness => "agreeableness",
            Self::Neuroticism => "neuroticism",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "openness" => Some(Self::Openness),
            "conscientiousness" => Some(Self::Conscientiousness),
            "extraversion" => Some(Self::Extraversion),
            "agreeableness" => Some(Self::Agreeableness),
            "neuroticism" => Some(Self::Neuroticism),
            _ => None,
        }
    }
}

impl fmt::Display for BigFiveTrait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Internal-consistency reliability for one competency scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetencyReliability {
    pub competency_id: CompetencyId,
    pub cronbach_alpha: Option<f64>,
    /// Respondents with full coverage of the scale.
    pub sample_size: u32,
    pub item_count: u32,
    pub reliability_status: ReliabilityStatus,
    /// Leave-one-out alpha per item.
    pub alpha_if_deleted: FxHashMap<ItemId, f64>,
    pub last_calculated_at: i64,
}

/// Internal-consistency reliability for one Big Five trait, aggregating
/// the union of items across every competency mapped to that trait.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BigFiveReliability {
    pub trait_name: BigFiveTrait,
    pub cronbach_alpha: Option<f64>,
    pub sample_size: u32,
    pub total_items: u32,
    pub reliability_status: ReliabilityStatus,
    pub alpha_if_deleted: FxHashMap<ItemId, f64>,
    pub contributing_competencies: Vec<CompetencyId>,
    pub last_calculated_at: i64,
}
