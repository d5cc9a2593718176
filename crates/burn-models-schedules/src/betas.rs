//! Beta schedules discretized from a continuous alpha-bar curve
//!
//! An alpha-bar function maps diffusion progress `t ∈ [0, 1]` to the
//! cumulative signal retention ᾱ(t), the running product of (1 - βₛ).
//! Two adjacent evaluations give the noise variance injected by one step:
//!
//! ᾱ(t₂) = ᾱ(t₁) · (1 - β)  ⇒  β = 1 - ᾱ(t₂) / ᾱ(t₁)

use std::f64::consts::FRAC_PI_2;
use std::ops::Deref;

use tracing::debug;

use crate::error::{Result, ScheduleError};

/// Default ceiling for a single beta
///
/// Values close to 1 produce singularities in the 1 / (1 - β) terms used by samplers.
pub const DEFAULT_MAX_BETA: f64 = 0.999;

/// Offset that keeps the cosine curve away from a zero derivative at t = 0
pub const COSINE_OFFSET: f64 = 0.008;

/// Linear schedule endpoints at the 1000-step reference
pub const LINEAR_BETA_START: f64 = 0.0001;
pub const LINEAR_BETA_END: f64 = 0.02;

/// Step count the linear endpoints are calibrated for
const REFERENCE_STEPS: f64 = 1000.0;

/// Ordered per-step noise variances, index = diffusion step
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BetaSequence(Vec<f64>);

impl BetaSequence {
    /// Per-step retention: αₜ = 1 - βₜ
    pub fn alphas(&self) -> Vec<f64> {
        self.0.iter().map(|b| 1.0 - b).collect()
    }

    /// Cumulative product of alphas: ᾱₜ
    pub fn alphas_cumprod(&self) -> Vec<f64> {
        let mut alphas_cumprod = Vec::with_capacity(self.0.len());
        let mut cumprod = 1.0f64;
        for alpha in self.alphas() {
            cumprod *= alpha;
            alphas_cumprod.push(cumprod);
        }
        alphas_cumprod
    }
}

impl Deref for BetaSequence {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

impl From<Vec<f64>> for BetaSequence {
    fn from(betas: Vec<f64>) -> Self {
        Self(betas)
    }
}

impl From<BetaSequence> for Vec<f64> {
    fn from(betas: BetaSequence) -> Self {
        betas.0
    }
}

/// Squared-cosine alpha-bar curve: ᾱ(t) = cos²((t + s) / (1 + s) · π/2)
pub fn cosine_alpha_bar(t: f64) -> f64 {
    ((t + COSINE_OFFSET) / (1.0 + COSINE_OFFSET) * FRAC_PI_2)
        .cos()
        .powi(2)
}

/// Create a beta schedule that discretizes `alpha_bar` over `num_steps` steps
///
/// Step `i` covers the progress interval `[i / n, (i + 1) / n]` and yields
/// `min(1 - ᾱ(t₂) / ᾱ(t₁), max_beta)`.
///
/// `alpha_bar` is expected to be strictly positive and non-increasing on
/// `[0, 1]`. A non-positive ᾱ(t₁) or a non-finite beta is reported as
/// [`ScheduleError::InvalidAlphaBar`] rather than silently clamped.
pub fn betas_for_alpha_bar<F>(
    num_steps: usize,
    alpha_bar: F,
    max_beta: f64,
) -> Result<BetaSequence>
where
    F: Fn(f64) -> f64,
{
    check_args(num_steps, max_beta)?;

    let betas = (0..num_steps)
        .map(|i| ratio_beta(&alpha_bar, i, num_steps, i, max_beta))
        .collect::<Result<Vec<_>>>()?;

    debug!(num_steps, max_beta, "discretized alpha_bar into beta schedule");
    Ok(BetaSequence(betas))
}

/// Truncated variant of [`betas_for_alpha_bar`] used with the cosine curve
///
/// The first beta is the jump from full retention to ᾱ(0), `1 - ᾱ(0)`.
/// The remaining `num_steps - 1` betas are the first `num_steps - 1` ratio
/// terms of the plain schedule, so the result is shifted one step earlier.
pub fn beta_for_alpha_bar_trunc_cosine<F>(
    num_steps: usize,
    alpha_bar: F,
    max_beta: f64,
) -> Result<BetaSequence>
where
    F: Fn(f64) -> f64,
{
    check_args(num_steps, max_beta)?;

    let mut betas = Vec::with_capacity(num_steps);
    betas.push(clamp_beta(1.0 - alpha_bar(0.0), 0, max_beta)?);
    for i in 0..num_steps - 1 {
        betas.push(ratio_beta(&alpha_bar, i, num_steps, i + 1, max_beta)?);
    }

    debug!(num_steps, max_beta, "discretized alpha_bar into truncated beta schedule");
    Ok(BetaSequence(betas))
}

/// Linear schedule rescaled to `num_steps`
///
/// Endpoints are multiplied by `1000 / num_steps` so the total noise matches
/// the 1000-step reference. Values are not clamped to [`DEFAULT_MAX_BETA`].
pub fn linear_betas(num_steps: usize) -> Result<BetaSequence> {
    check_args(num_steps, DEFAULT_MAX_BETA)?;

    let scale = REFERENCE_STEPS / num_steps as f64;
    let betas = linspace(scale * LINEAR_BETA_START, scale * LINEAR_BETA_END, num_steps);

    debug!(num_steps, scale, "built linear beta schedule");
    Ok(BetaSequence(betas))
}

/// Cosine schedule: [`betas_for_alpha_bar`] over [`cosine_alpha_bar`]
pub fn cosine_betas(num_steps: usize) -> Result<BetaSequence> {
    betas_for_alpha_bar(num_steps, cosine_alpha_bar, DEFAULT_MAX_BETA)
}

fn check_args(num_steps: usize, max_beta: f64) -> Result<()> {
    if num_steps == 0 {
        return Err(ScheduleError::InvalidArgument(
            "num_steps must be positive".to_string(),
        ));
    }
    if !max_beta.is_finite() || max_beta <= 0.0 {
        return Err(ScheduleError::InvalidArgument(format!(
            "max_beta must be positive and finite, got {max_beta}"
        )));
    }
    Ok(())
}

/// Beta for progress interval `i`, reported at output position `slot`
fn ratio_beta<F>(
    alpha_bar: &F,
    i: usize,
    num_steps: usize,
    slot: usize,
    max_beta: f64,
) -> Result<f64>
where
    F: Fn(f64) -> f64,
{
    let t1 = i as f64 / num_steps as f64;
    let t2 = (i + 1) as f64 / num_steps as f64;

    let start = alpha_bar(t1);
    if start.is_nan() || start <= 0.0 {
        return Err(ScheduleError::InvalidAlphaBar {
            step: slot,
            value: start,
        });
    }
    clamp_beta(1.0 - alpha_bar(t2) / start, slot, max_beta)
}

// f64::min drops NaN, so finiteness is checked first
fn clamp_beta(beta: f64, slot: usize, max_beta: f64) -> Result<f64> {
    if !beta.is_finite() {
        return Err(ScheduleError::InvalidAlphaBar {
            step: slot,
            value: beta,
        });
    }
    Ok(beta.min(max_beta))
}

/// `n` evenly spaced values, both endpoints included
fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![start];
    }

    let step = (end - start) / (n - 1) as f64;
    (0..n)
        .map(|i| {
            if i == n - 1 {
                end
            } else {
                start + i as f64 * step
            }
        })
        .collect()
}
