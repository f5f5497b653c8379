//! Configuration loading from parabench.toml
//!
//! Parabench configuration can be specified in a `parabench.toml` file in the
//! project root. The file is discovered by walking up from the current
//! directory; every field has a default and CLI flags override file values.

use parabench_core::{ComparisonConfig, ScalingConfig, TrialConfig, Workload};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the configuration file looked up by [`ParabenchConfig::discover`]
pub const CONFIG_FILE_NAME: &str = "parabench.toml";

/// Parabench configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ParabenchConfig {
    /// Scaling-curve runner configuration
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Statistical trial configuration
    #[serde(default)]
    pub trials: TrialsConfig,
    /// Concurrent-vs-sequential comparison configuration
    #[serde(default)]
    pub comparison: ComparisonSection,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Scaling-curve runner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Worker counts measured, in order
    #[serde(default = "default_worker_counts")]
    pub workers: Vec<usize>,
    /// Untimed invocations per worker before the barrier
    #[serde(default = "default_runner_warmup")]
    pub warmup_iterations: u64,
    /// Timed invocations per worker (per-worker form)
    #[serde(default = "default_iterations_per_worker")]
    pub iterations_per_worker: u64,
    /// Switch to the pooled form with this many shared tasks
    #[serde(default)]
    pub pooled_tasks: Option<usize>,
    /// Pin worker `i` to CPU `i mod ncpu`
    #[serde(default)]
    pub pin_workers: bool,
    /// Run one checked invocation before measuring
    #[serde(default = "default_true")]
    pub sanity_check: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            workers: default_worker_counts(),
            warmup_iterations: default_runner_warmup(),
            iterations_per_worker: default_iterations_per_worker(),
            pooled_tasks: None,
            pin_workers: false,
            sanity_check: true,
        }
    }
}

fn default_worker_counts() -> Vec<usize> {
    parabench_core::DEFAULT_WORKER_COUNTS.to_vec()
}
fn default_runner_warmup() -> u64 {
    100
}
fn default_iterations_per_worker() -> u64 {
    1000
}
fn default_true() -> bool {
    true
}

/// Statistical trial configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialsConfig {
    /// Number of timed trials
    #[serde(default = "default_trials")]
    pub trials: usize,
    /// Invocations per trial
    #[serde(default = "default_iterations_per_trial")]
    pub iterations_per_trial: u64,
    /// Untimed invocations before the first trial
    #[serde(default = "default_trials_warmup")]
    pub warmup_iterations: u64,
    /// Log progress every N trials (0 disables)
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,
}

impl Default for TrialsConfig {
    fn default() -> Self {
        Self {
            trials: default_trials(),
            iterations_per_trial: default_iterations_per_trial(),
            warmup_iterations: default_trials_warmup(),
            progress_interval: default_progress_interval(),
        }
    }
}

fn default_trials() -> usize {
    1000
}
fn default_iterations_per_trial() -> u64 {
    100
}
fn default_trials_warmup() -> u64 {
    200
}
fn default_progress_interval() -> usize {
    200
}

/// Concurrent-vs-sequential comparison configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonSection {
    /// Workers for the concurrent run
    #[serde(default = "default_comparison_workers")]
    pub workers: usize,
    /// Tasks executed by each run
    #[serde(default = "default_comparison_tasks")]
    pub tasks: usize,
    /// Untimed invocations before each timed section
    #[serde(default)]
    pub warmup_iterations: u64,
}

impl Default for ComparisonSection {
    fn default() -> Self {
        Self {
            workers: default_comparison_workers(),
            tasks: default_comparison_tasks(),
            warmup_iterations: 0,
        }
    }
}

fn default_comparison_workers() -> usize {
    4
}
fn default_comparison_tasks() -> usize {
    100
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format: "human" or "json"
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
        }
    }
}

fn default_format() -> String {
    "human".to_string()
}

impl ParabenchConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Self::load(&config_path).ok();
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Scaling-curve settings from the `[runner]` section
    pub fn scaling_config(&self) -> ScalingConfig {
        let workload = match self.runner.pooled_tasks {
            Some(tasks) => Workload::Pooled { tasks },
            None => Workload::PerWorker {
                iterations: self.runner.iterations_per_worker,
            },
        };
        ScalingConfig {
            worker_counts: self.runner.workers.clone(),
            warmup_iterations: self.runner.warmup_iterations,
            workload,
            pin_workers: self.runner.pin_workers,
            sanity_check: self.runner.sanity_check,
        }
    }

    /// Trial runner settings from the `[trials]` section
    pub fn trial_config(&self) -> TrialConfig {
        TrialConfig {
            trials: self.trials.trials,
            iterations_per_trial: self.trials.iterations_per_trial,
            warmup_iterations: self.trials.warmup_iterations,
            progress_interval: self.trials.progress_interval,
            sanity_check: self.runner.sanity_check,
        }
    }

    /// Comparison settings from the `[comparison]` section
    pub fn comparison_config(&self) -> ComparisonConfig {
        ComparisonConfig {
            workers: self.comparison.workers,
            tasks: self.comparison.tasks,
            warmup_iterations: self.comparison.warmup_iterations,
            sanity_check: self.runner.sanity_check,
        }
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# Parabench Configuration
# https://github.com/ml-rust/parabench

[runner]
# Worker counts for the scaling curve (speedup is relative to 1 worker)
workers = [1, 2, 4, 6, 8, 10]
# Untimed invocations per worker before the start barrier
warmup_iterations = 100
# Timed invocations per worker
iterations_per_worker = 1000
# Share this many tasks through a work pool instead (uncomment to enable)
# pooled_tasks = 1000
# Pin worker i to CPU i mod ncpu (Linux only)
pin_workers = false
# Run one checked invocation before measuring
sanity_check = true

[trials]
# Timed trials (one throughput sample each)
trials = 1000
# Invocations timed together in one trial
iterations_per_trial = 100
# Untimed invocations before the first trial
warmup_iterations = 200
# Log progress every N trials (0 disables)
progress_interval = 200

[comparison]
# Workers for the concurrent run
workers = 4
# Tasks executed by both the concurrent and the sequential run
tasks = 100
# Untimed invocations before each run
warmup_iterations = 0

[output]
# Default output format: human, json
format = "human"
"#
        .to_string()
    }

    /// Parse duration string (e.g., "500us", "1ms", "2s") to nanoseconds
    pub fn parse_duration(s: &str) -> anyhow::Result<u64> {
        let s = s.trim();
        if s.is_empty() {
            return Err(anyhow::anyhow!("Empty duration string"));
        }

        let (num_part, unit_part) = s
            .char_indices()
            .find(|(_, c)| c.is_alphabetic() || *c == 'µ')
            .map(|(i, _)| s.split_at(i))
            .unwrap_or((s, "s"));

        let value: f64 = num_part
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid duration number: {}", num_part))?;
        if !value.is_finite() || value < 0.0 {
            return Err(anyhow::anyhow!("Duration must be non-negative: {}", s));
        }

        let multiplier: u64 = match unit_part.to_lowercase().as_str() {
            "ns" => 1,
            "us" | "µs" => 1_000,
            "ms" => 1_000_000,
            "s" | "" => 1_000_000_000,
            "m" | "min" => 60_000_000_000,
            _ => return Err(anyhow::anyhow!("Unknown duration unit: {}", unit_part)),
        };

        Ok((value * multiplier as f64) as u64)
    }
}
