//! IRT calibration configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the 2PL calibration loop. These are tunables, not
/// contracts: the iteration caps guarantee termination, the tolerances
/// trade precision for speed.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Newton-Raphson iteration cap per solve. Default: 50.
    pub max_iterations: Option<u32>,
    /// Newton-Raphson convergence tolerance. Default: 1e-4.
    pub convergence_tolerance: Option<f64>,
    /// Alternating (theta / item-parameter) cycle cap. Default: 10.
    pub em_cycles: Option<u32>,
    /// Max parameter change below which the alternating loop stops.
    /// Default: 1e-3.
    pub em_tolerance: Option<f64>,
    /// Items with proportion-correct below this are dropped as extreme.
    /// Default: 0.05.
    pub extreme_low: Option<f64>,
    /// Items with proportion-correct above this are dropped as extreme.
    /// Default: 0.95.
    pub extreme_high: Option<f64>,
}

impl CalibrationConfig {
    pub fn effective_max_iterations(&self) -> u32 {
        self.max_iterations.unwrap_or(50)
    }

    pub fn effective_convergence_tolerance(&self) -> f64 {
        self.convergence_tolerance.unwrap_or(1e-4)
    }

    pub fn effective_em_cycles(&self) -> u32 {
        self.em_cycles.unwrap_or(10)
    }

    pub fn effective_em_tolerance(&self) -> f64 {
        self.em_tolerance.unwrap_or(1e-3)
    }

    pub fn effective_extreme_low(&self) -> f64 {
        self.extreme_low
            .unwrap_or(crate::constants::EXTREME_PROPORTION_LOW)
    }

    pub fn effective_extreme_high(&self) -> f64 {
        self.extreme_high
            .unwrap_or(crate::constants::EXTREME_PROPORTION_HIGH)
    }
}
