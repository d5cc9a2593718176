//! burn-models-schedules CLI
//!
//! Prints diffusion beta schedules for inspection.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use burn_models_schedules::{BetaSequence, ScheduleConfig, ScheduleName};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "burn-models-schedules")]
#[command(about = "Compute beta schedules for diffusion models")]
#[command(version)]
struct Cli {
    /// Preset schedule (overrides the config file)
    #[arg(short, long, value_enum)]
    schedule: Option<ScheduleKind>,

    /// Number of diffusion steps (overrides the config file)
    #[arg(short = 'n', long)]
    steps: Option<usize>,

    /// Maximum beta for cosine schedules (overrides the config file, rejected for linear)
    #[arg(long)]
    max_beta: Option<f64>,

    /// Use the truncated cosine variant
    #[arg(long)]
    truncated: bool,

    /// JSON schedule configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ScheduleKind {
    /// Linearly increasing betas
    Linear,
    /// Squared-cosine alpha-bar curve
    Cosine,
}

impl ScheduleKind {
    fn to_schedule_name(self) -> ScheduleName {
        match self {
            ScheduleKind::Linear => ScheduleName::Linear,
            ScheduleKind::Cosine => ScheduleName::Cosine,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// One `step<TAB>beta<TAB>alpha_cumprod` line per step
    Text,
    /// A single JSON object
    Json,
}

#[derive(Serialize)]
struct ScheduleReport<'a> {
    schedule: ScheduleName,
    num_steps: usize,
    truncated: bool,
    betas: &'a [f64],
    alphas_cumprod: &'a [f64],
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    info!(
        schedule = %config.name,
        num_steps = config.num_steps,
        truncated = config.truncated,
        "computing beta schedule"
    );

    let betas = config
        .betas()
        .with_context(|| format!("Failed to build {} schedule", config.name))?;

    print_schedule(&config, &betas, cli.format)
}

fn resolve_config(cli: &Cli) -> Result<ScheduleConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config {}", path.display()))?
        }
        None => ScheduleConfig::default(),
    };

    if let Some(kind) = cli.schedule {
        config.name = kind.to_schedule_name();
    }
    if let Some(steps) = cli.steps {
        config.num_steps = steps;
    }
    if let Some(max_beta) = cli.max_beta {
        config.max_beta = max_beta;
    }
    if cli.truncated {
        config.truncated = true;
    }
    Ok(config)
}

fn print_schedule(
    config: &ScheduleConfig,
    betas: &BetaSequence,
    format: OutputFormat,
) -> Result<()> {
    let alphas_cumprod = betas.alphas_cumprod();

    match format {
        OutputFormat::Text => {
            for (i, (beta, alpha)) in betas.iter().zip(&alphas_cumprod).enumerate() {
                println!("{}\t{:.10}\t{:.10}", i, beta, alpha);
            }
        }
        OutputFormat::Json => {
            let report = ScheduleReport {
                schedule: config.name,
                num_steps: betas.len(),
                truncated: config.truncated,
                betas,
                alphas_cumprod: &alphas_cumprod,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::parse_from([
            "burn-models-schedules",
            "--schedule",
            "linear",
            "--steps",
            "500",
        ]);
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.name, ScheduleName::Linear);
        assert_eq!(config.num_steps, 500);
        assert!(!config.truncated);
    }

    #[test]
    fn test_defaults_without_flags() {
        let cli = Cli::parse_from(["burn-models-schedules"]);
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config, ScheduleConfig::default());
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let cli = Cli::parse_from([
            "burn-models-schedules",
            "--config",
            "/nonexistent/schedule.json",
        ]);
        assert!(resolve_config(&cli).is_err());
    }

    #[test]
    fn test_max_beta_with_linear_is_rejected() {
        let cli = Cli::parse_from([
            "burn-models-schedules",
            "--schedule",
            "linear",
            "--max-beta",
            "0.5",
        ]);
        let config = resolve_config(&cli).unwrap();
        assert!(config.betas().is_err());
    }

    #[test]
    fn test_max_beta_with_cosine_is_applied() {
        let cli = Cli::parse_from(["burn-models-schedules", "--steps", "10", "--max-beta", "0.5"]);
        let config = resolve_config(&cli).unwrap();
        let betas = config.betas().unwrap();
        assert_eq!(*betas.last().unwrap(), 0.5);
    }
}
