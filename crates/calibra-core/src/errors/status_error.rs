//! Validity status machine errors.

use super::error_code::{self, CalibraErrorCode};
use crate::types::ValidityStatus;

/// Errors from manual status overrides. Automatic transitions never
/// produce these; the audit job only applies edges it knows are legal.
#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: ValidityStatus,
        to: ValidityStatus,
    },

    #[error(
        "Cannot reactivate retired item: current discrimination is {}",
        .discrimination.map_or_else(|| "unknown".to_string(), |d| format!("{d:.3}"))
    )]
    ReactivationBlocked { discrimination: Option<f64> },

    #[error("A manual status override requires a non-empty reason")]
    MissingReason,
}

impl CalibraErrorCode for StatusError {
    fn error_code(&self) -> &'static str {
        error_code::INVALID_TRANSITION
    }
}
