//! Configuration system for Calibra.
//! TOML-based, 3-layer resolution: env > project > defaults.

pub mod audit_config;
pub mod calibra_config;
pub mod calibration_config;
pub mod thresholds_config;

pub use audit_config::AuditConfig;
pub use calibra_config::CalibraConfig;
pub use calibration_config::CalibrationConfig;
pub use thresholds_config::ThresholdsConfig;
