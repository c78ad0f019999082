//! Shared constants. Contract thresholds live here; tunables live in config.

/// Minimum responses before any metric may be computed and before an item
/// may leave probation. Below this, metrics stay `None` and reliability is
/// reported as insufficient data.
pub const MIN_SAMPLE_SIZE: u32 = 50;

/// Normalized score at or above which a response counts as correct.
pub const DICHOTOMIZATION_THRESHOLD: f64 = 0.5;

/// Lower bound for ability and difficulty estimates.
pub const MIN_THETA: f64 = -4.0;
/// Upper bound for ability and difficulty estimates.
pub const MAX_THETA: f64 = 4.0;

/// Lower bound for the 2PL discrimination parameter.
pub const MIN_DISCRIMINATION: f64 = 0.1;
/// Upper bound for the 2PL discrimination parameter.
pub const MAX_DISCRIMINATION: f64 = 4.0;

/// Clamp for the 2PL exponent argument. `exp(709)` is the last finite f64
/// region; 700 keeps the logistic saturated but finite for any input.
pub const MAX_EXPONENT: f64 = 700.0;

/// Items with proportion-correct below this are dropped as extreme.
pub const EXTREME_PROPORTION_LOW: f64 = 0.05;
/// Items with proportion-correct above this are dropped as extreme.
pub const EXTREME_PROPORTION_HIGH: f64 = 0.95;

/// Difficulty index below this flags the item as too hard.
pub const TOO_HARD_BELOW: f64 = 0.2;
/// Difficulty index above this flags the item as too easy.
pub const TOO_EASY_ABOVE: f64 = 0.9;

/// Point-biserial below this (and >= 0) is a critical discrimination flag.
pub const DISCRIMINATION_CRITICAL_BELOW: f64 = 0.1;
/// Point-biserial below this (and >= critical) is a warning flag.
pub const DISCRIMINATION_WARNING_BELOW: f64 = 0.25;

/// Point-biserial required for automatic probation -> active promotion.
pub const ACTIVATION_DISCRIMINATION: f64 = 0.3;

/// Cronbach's Alpha at or above this is reliable.
pub const ALPHA_RELIABLE: f64 = 0.7;
/// Cronbach's Alpha at or above this (and below reliable) is acceptable.
pub const ALPHA_ACCEPTABLE: f64 = 0.6;

/// Alpha-if-deleted improvement that marks an item "strongly consider removing".
pub const ALPHA_IMPROVEMENT_REMOVE: f64 = 0.05;
/// Alpha-if-deleted improvement that marks an item a removal candidate.
pub const ALPHA_IMPROVEMENT_REVISE: f64 = 0.02;
