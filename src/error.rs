//! Gauge errors

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while configuring or hosting a gauge.
///
/// Values and angles never produce errors: out-of-range values saturate and
/// any angle is normalized. Only configurations that make the value to angle
/// mapping undefined are rejected.
#[derive(Error, Debug)]
pub enum GaugeError {
    #[error("min_value must be less than max_value (got min {min}, max {max})")]
    InvalidRange { min: f64, max: f64 },

    #[error("min_value and max_value must be finite")]
    NonFiniteRange,

    #[error("steps must be at least 1 (got {0})")]
    InvalidSteps(u32),

    #[error("start_angle and end_angle must be finite")]
    NonFiniteAngle,

    #[error("start_angle and end_angle must differ")]
    EmptySweep,

    #[error("Unknown color: {0:?}")]
    UnknownColor(String),

    #[error("No font file found for family {0:?}")]
    FontNotFound(String),

    #[error("Font file could not be parsed: {}", .0.display())]
    FontLoad(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("Window error: {0}")]
    Window(String),
}
