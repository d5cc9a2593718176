//! Named beta schedule presets

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::betas::{BetaSequence, cosine_betas, linear_betas};
use crate::error::{Result, ScheduleError};

/// Preset beta schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleName {
    /// Linearly increasing betas, rescaled to the step count (DDPM)
    Linear,
    /// Betas discretized from the squared-cosine alpha-bar curve (improved DDPM)
    #[default]
    Cosine,
}

impl ScheduleName {
    pub const ALL: [ScheduleName; 2] = [ScheduleName::Linear, ScheduleName::Cosine];

    pub fn as_str(self) -> &'static str {
        match self {
            ScheduleName::Linear => "linear",
            ScheduleName::Cosine => "cosine",
        }
    }

    /// Build this preset's schedule for `num_steps` steps
    pub fn betas(self, num_steps: usize) -> Result<BetaSequence> {
        match self {
            ScheduleName::Linear => linear_betas(num_steps),
            ScheduleName::Cosine => cosine_betas(num_steps),
        }
    }
}

impl fmt::Display for ScheduleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScheduleName {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "linear" => Ok(ScheduleName::Linear),
            "cosine" => Ok(ScheduleName::Cosine),
            _ => Err(ScheduleError::UnsupportedScheduleKind(s.to_string())),
        }
    }
}

/// Look up a preset by its exact name and build its schedule
///
/// Unknown names fail with [`ScheduleError::UnsupportedScheduleKind`].
pub fn reflect_beta_schedule_by_name(
    schedule_name: &str,
    num_steps: usize,
) -> Result<BetaSequence> {
    schedule_name.parse::<ScheduleName>()?.betas(num_steps)
}
