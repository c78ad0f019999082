//! Status policy thresholds.
//!
//! Only the activation bar is tunable. The flag bands, the alpha bands,
//! and the 50-response gate are contracts and live in `constants`.

use serde::{Deserialize, Serialize};

/// Thresholds for the automatic validity status policy.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ThresholdsConfig {
    /// Point-biserial required for probation -> active. Default: 0.3.
    pub activation_discrimination: Option<f64>,
}

impl ThresholdsConfig {
    pub fn effective_activation_discrimination(&self) -> f64 {
        self.activation_discrimination
            .unwrap_or(crate::constants::ACTIVATION_DISCRIMINATION)
    }
}
