//! Statistical Trial Runner
//!
//! Two-level measurement on the calling thread: each trial times a batch of
//! `iterations_per_trial` invocations with its own clock pair and yields one
//! throughput sample (ops/s). Batching keeps per-sample clock overhead
//! negligible; many trials give the distribution its shape.

use crate::error::HarnessError;
use crate::measure::Instant;
use crate::operation::Operation;
use crate::phase::{invoke, sanity_check};
use parabench_stats::{StatsError, TrialStatistics, compute_trial_statistics};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Trial runner parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrialConfig {
    /// Number of timed trials (samples)
    pub trials: usize,
    /// Invocations timed together in one trial
    pub iterations_per_trial: u64,
    /// Untimed invocations before the first trial
    pub warmup_iterations: u64,
    /// Log progress every this many trials (0 disables)
    pub progress_interval: usize,
    /// Run one checked invocation before warm-up
    pub sanity_check: bool,
}

impl Default for TrialConfig {
    fn default() -> Self {
        Self {
            trials: 1000,
            iterations_per_trial: 100,
            warmup_iterations: 200,
            progress_interval: 200,
            sanity_check: true,
        }
    }
}

impl TrialConfig {
    /// Reject configurations that cannot produce samples
    pub fn validate(&self) -> Result<(), HarnessError> {
        if self.trials == 0 {
            return Err(HarnessError::InvalidConfig(
                "at least one trial is required".to_string(),
            ));
        }
        if self.iterations_per_trial == 0 {
            return Err(HarnessError::InvalidConfig(
                "iterations per trial must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Ordered samples from one trial run
#[derive(Debug, Clone, PartialEq)]
pub struct TrialRun {
    /// Operation name
    pub operation: String,
    /// Throughput per trial (ops/s), in trial order
    pub samples: Vec<f64>,
    /// Timed invocations that failed
    pub failed_operations: u64,
    /// Warm-up invocations that failed
    pub warmup_failures: u64,
    /// Configuration the run used
    pub config: TrialConfig,
}

impl TrialRun {
    /// Full statistics record over the samples
    pub fn statistics(&self) -> Result<TrialStatistics, StatsError> {
        compute_trial_statistics(&self.samples)
    }
}

/// Collect `config.trials` throughput samples for `op`
pub fn run_trials<O: Operation>(op: &O, config: &TrialConfig) -> Result<TrialRun, HarnessError> {
    config.validate()?;
    if config.sanity_check {
        sanity_check(op)?;
    }

    let mut ctx = op
        .new_context()
        .map_err(|source| HarnessError::ContextInit { worker: 0, source })?;
    let mut task = op
        .prepare_task(0)
        .map_err(|source| HarnessError::TaskSetup { index: 0, source })?;

    debug!(
        operation = op.name(),
        warmup = config.warmup_iterations,
        "warming up"
    );
    let mut warmup_failures = 0;
    for _ in 0..config.warmup_iterations {
        if !invoke(op, &mut ctx, &mut task) {
            warmup_failures += 1;
        }
    }

    let mut samples = Vec::with_capacity(config.trials);
    let mut failed_operations = 0;
    for trial in 0..config.trials {
        let start = Instant::now();
        for _ in 0..config.iterations_per_trial {
            if !invoke(op, &mut ctx, &mut task) {
                failed_operations += 1;
            }
        }
        let end = Instant::now();

        // Sub-nanosecond batches would divide by zero
        let secs = end.duration_since(start).as_secs_f64().max(1e-9);
        samples.push(config.iterations_per_trial as f64 / secs);

        let done = trial + 1;
        if config.progress_interval > 0 && done % config.progress_interval == 0 {
            info!(
                operation = op.name(),
                "trial {}/{} complete",
                done,
                config.trials
            );
        }
    }

    Ok(TrialRun {
        operation: op.name().to_string(),
        samples,
        failed_operations,
        warmup_failures,
        config: config.clone(),
    })
}
