//! Errors raised while building beta schedules

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("Unsupported schedule kind: {0}")]
    UnsupportedScheduleKind(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid alpha_bar at step {step}: produced {value}")]
    InvalidAlphaBar { step: usize, value: f64 },
}

pub type Result<T> = std::result::Result<T, ScheduleError>;
