//! Top-level Calibra configuration with 3-layer resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{AuditConfig, CalibrationConfig, ThresholdsConfig};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`CALIBRA_*`)
/// 2. Project config (`calibra.toml` in the project root)
/// 3. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CalibraConfig {
    pub calibration: CalibrationConfig,
    pub thresholds: ThresholdsConfig,
    pub audit: AuditConfig,
}

impl CalibraConfig {
    /// Load configuration with 3-layer resolution.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let project_config_path = root.join("calibra.toml");
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
            tracing::debug!(path = %project_config_path.display(), "merged project config");
        }

        Self::apply_env_overrides(&mut config);
        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate the configuration values.
    pub fn validate(config: &CalibraConfig) -> Result<(), ConfigError> {
        if let Some(tol) = config.calibration.convergence_tolerance {
            if !(tol > 0.0) {
                return Err(ConfigError::ValidationFailed {
                    field: "calibration.convergence_tolerance".to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        if let Some(low) = config.calibration.extreme_low {
            if !(0.0..0.5).contains(&low) {
                return Err(ConfigError::ValidationFailed {
                    field: "calibration.extreme_low".to_string(),
                    message: "must be in [0.0, 0.5)".to_string(),
                });
            }
        }
        if let Some(high) = config.calibration.extreme_high {
            if !(0.5..=1.0).contains(&high) {
                return Err(ConfigError::ValidationFailed {
                    field: "calibration.extreme_high".to_string(),
                    message: "must be in (0.5, 1.0]".to_string(),
                });
            }
        }
        if let Some(cycles) = config.calibration.em_cycles {
            if cycles == 0 {
                return Err(ConfigError::ValidationFailed {
                    field: "calibration.em_cycles".to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        if let Some(activation) = config.thresholds.activation_discrimination {
            if !(0.0..=1.0).contains(&activation) {
                return Err(ConfigError::ValidationFailed {
                    field: "thresholds.activation_discrimination".to_string(),
                    message: "must be between 0.0 and 1.0".to_string(),
                });
            }
        }
        if let Some(interval) = config.audit.irt_interval_secs {
            if interval < 0 {
                return Err(ConfigError::ValidationFailed {
                    field: "audit.irt_interval_secs".to_string(),
                    message: "must not be negative".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored (forward-compatible).
    fn merge_toml_file(config: &mut CalibraConfig, path: &Path) -> Result<(), ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
                path: path.display().to_string(),
            })?;

        let file_config: CalibraConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`, where `other` values override `base`
    /// values only when `other` has a `Some` value.
    fn merge(base: &mut CalibraConfig, other: &CalibraConfig) {
        // Calibration
        if other.calibration.max_iterations.is_some() {
            base.calibration.max_iterations = other.calibration.max_iterations;
        }
        if other.calibration.convergence_tolerance.is_some() {
            base.calibration.convergence_tolerance = other.calibration.convergence_tolerance;
        }
        if other.calibration.em_cycles.is_some() {
            base.calibration.em_cycles = other.calibration.em_cycles;
        }
        if other.calibration.em_tolerance.is_some() {
            base.calibration.em_tolerance = other.calibration.em_tolerance;
        }
        if other.calibration.extreme_low.is_some() {
            base.calibration.extreme_low = other.calibration.extreme_low;
        }
        if other.calibration.extreme_high.is_some() {
            base.calibration.extreme_high = other.calibration.extreme_high;
        }

        // Thresholds
        if other.thresholds.activation_discrimination.is_some() {
            base.thresholds.activation_discrimination =
                other.thresholds.activation_discrimination;
        }

        // Audit
        if other.audit.min_sample_size.is_some() {
            base.audit.min_sample_size = other.audit.min_sample_size;
        }
        if other.audit.max_write_retries.is_some() {
            base.audit.max_write_retries = other.audit.max_write_retries;
        }
        if other.audit.parallel.is_some() {
            base.audit.parallel = other.audit.parallel;
        }
        if other.audit.irt_interval_secs.is_some() {
            base.audit.irt_interval_secs = other.audit.irt_interval_secs;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `CALIBRA_CALIBRATION_EM_CYCLES`, `CALIBRA_AUDIT_PARALLEL`, etc.
    fn apply_env_overrides(config: &mut CalibraConfig) {
        if let Ok(val) = std::env::var("CALIBRA_CALIBRATION_MAX_ITERATIONS") {
            if let Ok(v) = val.parse::<u32>() {
                config.calibration.max_iterations = Some(v);
            }
        }
        if let Ok(val) = std::env::var("CALIBRA_CALIBRATION_EM_CYCLES") {
            if let Ok(v) = val.parse::<u32>() {
                config.calibration.em_cycles = Some(v);
            }
        }
        if let Ok(val) = std::env::var("CALIBRA_THRESHOLDS_ACTIVATION_DISCRIMINATION") {
            if let Ok(v) = val.parse::<f64>() {
                config.thresholds.activation_discrimination = Some(v);
            }
        }
        if let Ok(val) = std::env::var("CALIBRA_AUDIT_PARALLEL") {
            if let Ok(v) = val.parse::<bool>() {
                config.audit.parallel = Some(v);
            }
        }
        if let Ok(val) = std::env::var("CALIBRA_AUDIT_MAX_WRITE_RETRIES") {
            if let Ok(v) = val.parse::<u32>() {
                config.audit.max_write_retries = Some(v);
            }
        }
        if let Ok(val) = std::env::var("CALIBRA_AUDIT_IRT_INTERVAL_SECS") {
            if let Ok(v) = val.parse::<i64>() {
                config.audit.irt_interval_secs = Some(v);
            }
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CalibraConfig::default();
        assert_eq!(config.calibration.effective_max_iterations(), 50);
        assert_eq!(config.calibration.effective_em_cycles(), 10);
        assert_eq!(config.audit.effective_min_sample_size(), 50);
        assert!(!config.audit.effective_parallel());
    }

    #[test]
    fn test_from_toml_overrides() {
        let config = CalibraConfig::from_toml(
            r#"
            [calibration]
            em_cycles = 20
            em_tolerance = 0.01

            [audit]
            parallel = true
            "#,
        )
        .unwrap();
        assert_eq!(config.calibration.effective_em_cycles(), 20);
        assert!((config.calibration.effective_em_tolerance() - 0.01).abs() < 1e-12);
        assert!(config.audit.effective_parallel());
        // Untouched values keep their defaults.
        assert_eq!(config.calibration.effective_max_iterations(), 50);
    }

    #[test]
    fn test_validation_rejects_bad_extreme_band() {
        let err = CalibraConfig::from_toml(
            r#"
            [calibration]
            extreme_low = 0.7
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationFailed { .. }));
    }

    #[test]
    fn test_validation_rejects_zero_cycles() {
        let err = CalibraConfig::from_toml(
            r#"
            [calibration]
            em_cycles = 0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ValidationFailed { .. }));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let config = CalibraConfig::from_toml(
            r#"
            [future_section]
            anything = 1
            "#,
        )
        .unwrap();
        assert_eq!(config.audit.effective_max_write_retries(), 3);
    }

    #[test]
    fn test_load_without_project_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CalibraConfig::load(dir.path()).unwrap();
        assert_eq!(config.calibration.effective_em_cycles(), 10);
    }
}
