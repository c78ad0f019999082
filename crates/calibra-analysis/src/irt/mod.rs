//! 2PL Item Response Theory: probability model, Newton-Raphson
//! estimators, and the alternating calibration loop.

pub mod calibration;
pub mod model;
pub mod newton;

pub use calibration::{calibrate, CalibrationResult, ItemParameters};
pub use model::probability;
