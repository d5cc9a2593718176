//! Noise schedules for diffusion models
//!
//! Builds a configured beta schedule and uploads it for the samplers.

use burn::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::betas::{
    BetaSequence, DEFAULT_MAX_BETA, beta_for_alpha_bar_trunc_cosine, betas_for_alpha_bar,
    cosine_alpha_bar, linear_betas,
};
use crate::error::{Result, ScheduleError};
use crate::preset::ScheduleName;

// ============================================================================
// Schedule Configuration
// ============================================================================

/// Noise schedule configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Preset schedule
    pub name: ScheduleName,
    /// Number of training timesteps
    pub num_steps: usize,
    /// Ceiling for a single beta (cosine only)
    pub max_beta: f64,
    /// Use the truncated, front-loaded cosine variant
    pub truncated: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            name: ScheduleName::Cosine,
            num_steps: 1000,
            max_beta: DEFAULT_MAX_BETA,
            truncated: false,
        }
    }
}

impl ScheduleConfig {
    /// Build the configured beta schedule
    ///
    /// The linear preset is never clamped, so it only accepts the default
    /// `max_beta` and no truncation.
    pub fn betas(&self) -> Result<BetaSequence> {
        match self.name {
            ScheduleName::Cosine if self.truncated => {
                beta_for_alpha_bar_trunc_cosine(self.num_steps, cosine_alpha_bar, self.max_beta)
            }
            ScheduleName::Cosine => {
                betas_for_alpha_bar(self.num_steps, cosine_alpha_bar, self.max_beta)
            }
            ScheduleName::Linear if self.truncated => Err(ScheduleError::InvalidArgument(
                "the truncated variant only applies to the cosine schedule".to_string(),
            )),
            ScheduleName::Linear if self.max_beta != DEFAULT_MAX_BETA => {
                Err(ScheduleError::InvalidArgument(format!(
                    "max_beta only applies to the cosine schedule, got {} for linear",
                    self.max_beta
                )))
            }
            ScheduleName::Linear => linear_betas(self.num_steps),
        }
    }
}

/// Beta schedule uploaded to a backend device
pub struct NoiseSchedule<B: Backend> {
    /// Per-step noise variances: βₜ
    pub betas: Tensor<B, 1>,
    /// Number of training steps
    pub num_train_steps: usize,
}

impl<B: Backend> NoiseSchedule<B> {
    /// Upload precomputed betas
    pub fn from_betas(betas: &BetaSequence, device: &B::Device) -> Self {
        let num_steps = betas.len();
        let values: Vec<f32> = betas.iter().map(|&b| b as f32).collect();
        let data = TensorData::new(values, [num_steps]);

        debug!(num_steps, "uploaded beta schedule");
        Self {
            betas: Tensor::from_data(data, device),
            num_train_steps: num_steps,
        }
    }

    /// Build and upload a preset schedule
    pub fn from_name(name: ScheduleName, num_steps: usize, device: &B::Device) -> Result<Self> {
        Ok(Self::from_betas(&name.betas(num_steps)?, device))
    }

    /// Build and upload the configured schedule
    pub fn from_config(config: &ScheduleConfig, device: &B::Device) -> Result<Self> {
        Ok(Self::from_betas(&config.betas()?, device))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_ndarray::NdArray;

    type TestBackend = NdArray<f32>;

    fn host_values(schedule: NoiseSchedule<TestBackend>) -> Vec<f32> {
        schedule.betas.into_data().to_vec::<f32>().unwrap()
    }

    #[test]
    fn test_config_default() {
        let config = ScheduleConfig::default();
        assert_eq!(config.name, ScheduleName::Cosine);
        assert_eq!(config.num_steps, 1000);
        assert_eq!(config.max_beta, DEFAULT_MAX_BETA);
        assert!(!config.truncated);
        assert_eq!(config.betas().unwrap(), ScheduleName::Cosine.betas(1000).unwrap());
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: ScheduleConfig =
            serde_json::from_str(r#"{ "name": "linear", "num_steps": 500 }"#).unwrap();
        assert_eq!(config.name, ScheduleName::Linear);
        assert_eq!(config.num_steps, 500);
        assert_eq!(config.max_beta, DEFAULT_MAX_BETA);
        assert_eq!(config.betas().unwrap().len(), 500);
    }

    #[test]
    fn test_config_truncated_cosine() {
        let config = ScheduleConfig {
            num_steps: 100,
            truncated: true,
            ..Default::default()
        };
        let betas = config.betas().unwrap();
        assert_eq!(betas.len(), 100);
        assert!((betas[0] - (1.0 - cosine_alpha_bar(0.0))).abs() < 1e-12);
    }

    #[test]
    fn test_config_cosine_custom_max_beta() {
        let config = ScheduleConfig {
            num_steps: 10,
            max_beta: 0.5,
            ..Default::default()
        };
        let betas = config.betas().unwrap();
        assert_eq!(*betas.last().unwrap(), 0.5);
    }

    #[test]
    fn test_config_truncated_linear_rejected() {
        let config = ScheduleConfig {
            name: ScheduleName::Linear,
            truncated: true,
            ..Default::default()
        };
        assert!(matches!(config.betas(), Err(ScheduleError::InvalidArgument(_))));
    }

    #[test]
    fn test_config_linear_max_beta_rejected() {
        let config = ScheduleConfig {
            name: ScheduleName::Linear,
            max_beta: 0.5,
            ..Default::default()
        };
        assert!(matches!(config.betas(), Err(ScheduleError::InvalidArgument(_))));
    }

    #[test]
    fn test_schedule_from_betas() {
        let device = Default::default();
        let betas = BetaSequence::from(vec![0.1, 0.2, 0.5]);
        let schedule = NoiseSchedule::<TestBackend>::from_betas(&betas, &device);

        assert_eq!(schedule.num_train_steps, 3);
        let values = host_values(schedule);
        for (actual, expected) in values.iter().zip([0.1f32, 0.2, 0.5]) {
            assert!((actual - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_schedule_from_name_matches_host_betas() {
        let device = Default::default();
        let schedule =
            NoiseSchedule::<TestBackend>::from_name(ScheduleName::Cosine, 100, &device).unwrap();
        assert_eq!(schedule.num_train_steps, 100);

        let expected = ScheduleName::Cosine.betas(100).unwrap();
        for (actual, expected) in host_values(schedule).iter().zip(expected.iter()) {
            assert!((*actual as f64 - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_from_config_propagates_errors() {
        let device = Default::default();
        let config = ScheduleConfig {
            num_steps: 0,
            ..Default::default()
        };
        assert!(NoiseSchedule::<TestBackend>::from_config(&config, &device).is_err());
    }
}
