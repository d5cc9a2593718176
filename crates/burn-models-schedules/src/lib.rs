//! Beta (noise variance) schedules for diffusion models
//!
//! Discretizes a continuous alpha-bar curve into per-step betas, provides the
//! `linear` and `cosine` presets, and precomputes the cumulative retention
//! values samplers consume.

pub mod betas;
pub mod error;
pub mod preset;
pub mod scheduler;

pub use betas::{
    BetaSequence, COSINE_OFFSET, DEFAULT_MAX_BETA, LINEAR_BETA_END, LINEAR_BETA_START,
    beta_for_alpha_bar_trunc_cosine, betas_for_alpha_bar, cosine_alpha_bar, cosine_betas,
    linear_betas,
};
pub use error::{Result, ScheduleError};
pub use preset::{ScheduleName, reflect_beta_schedule_by_name};
pub use scheduler::{NoiseSchedule, ScheduleConfig};
