//! Audit job configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the batch audit job.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AuditConfig {
    /// Minimum responses before an item is recalculated. Default: 50.
    /// Lowering this below 50 does not lift the metric gate; it only
    /// controls how early the job bothers looking at an item.
    pub min_sample_size: Option<u32>,
    /// Retries on an optimistic-lock conflict before the item is counted
    /// as failed. Default: 3.
    pub max_write_retries: Option<u32>,
    /// Fan the per-item pass out across a thread pool. Default: false
    /// (a single serialized pass).
    pub parallel: Option<bool>,
    /// Seconds between full IRT calibration passes. Default: 604800 (7 days).
    pub irt_interval_secs: Option<i64>,
}

impl AuditConfig {
    pub fn effective_min_sample_size(&self) -> u32 {
        self.min_sample_size
            .unwrap_or(crate::constants::MIN_SAMPLE_SIZE)
    }

    pub fn effective_max_write_retries(&self) -> u32 {
        self.max_write_retries.unwrap_or(3)
    }

    pub fn effective_parallel(&self) -> bool {
        self.parallel.unwrap_or(false)
    }

    pub fn effective_irt_interval_secs(&self) -> i64 {
        self.irt_interval_secs.unwrap_or(604_800)
    }
}
