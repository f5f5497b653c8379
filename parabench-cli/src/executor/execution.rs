//! Run Execution
//!
//! Each suite runs the requested operations one after another. Worker
//! threads inside a run belong to the core phase protocol; nothing here
//! runs concurrently with a timed section, so the progress bar is only
//! touched between configurations.

use crate::ops::{OpSpec, with_operation};
use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use parabench_core::{
    ComparisonConfig, ConcurrencyComparison, Operation, ScalingConfig, ScalingCurve, TrialConfig,
    TrialRun, compare_concurrent_sequential, run_scaling_with, run_trials,
};

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// Measure a scaling curve for every operation
pub fn run_scaling_suite(
    ops: &[OpSpec],
    config: &ScalingConfig,
) -> anyhow::Result<Vec<ScalingCurve>> {
    let pb = progress_bar((ops.len() * config.worker_counts.len()) as u64);

    let mut curves = Vec::with_capacity(ops.len());
    for &spec in ops {
        pb.set_message(spec.to_string());
        let curve = with_operation!(spec, |op| run_scaling_with(op, config, |m| {
            pb.set_message(format!("{} ({} workers)", op.name(), m.workers));
            pb.inc(1);
        }))
        .with_context(|| format!("scaling run for {} failed", spec))?;
        curves.push(curve);
    }

    pb.finish_with_message("Complete");
    Ok(curves)
}

/// Collect statistical trial samples for every operation
pub fn run_trial_suite(ops: &[OpSpec], config: &TrialConfig) -> anyhow::Result<Vec<TrialRun>> {
    let pb = progress_bar(ops.len() as u64);

    let mut runs = Vec::with_capacity(ops.len());
    for &spec in ops {
        pb.set_message(spec.to_string());
        let run = with_operation!(spec, |op| run_trials(op, config))
            .with_context(|| format!("trial run for {} failed", spec))?;
        runs.push(run);
        pb.inc(1);
    }

    pb.finish_with_message("Complete");
    Ok(runs)
}

/// Compare pooled and sequential execution for every operation
pub fn run_comparison_suite(
    ops: &[OpSpec],
    config: &ComparisonConfig,
) -> anyhow::Result<Vec<ConcurrencyComparison>> {
    let mut comparisons = Vec::with_capacity(ops.len());
    for &spec in ops {
        let comparison = with_operation!(spec, |op| compare_concurrent_sequential(op, config))
            .with_context(|| format!("comparison for {} failed", spec))?;
        comparisons.push(comparison);
    }
    Ok(comparisons)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parabench_core::Workload;

    #[test]
    fn test_scaling_suite_runs_each_op() {
        let ops = vec![
            "spin:10".parse::<OpSpec>().unwrap(),
            "checksum:32".parse::<OpSpec>().unwrap(),
        ];
        let config = ScalingConfig {
            worker_counts: vec![1, 2],
            warmup_iterations: 5,
            workload: Workload::PerWorker { iterations: 50 },
            ..ScalingConfig::default()
        };

        let curves = run_scaling_suite(&ops, &config).unwrap();
        assert_eq!(curves.len(), 2);
        assert_eq!(curves[0].operation, "spin:10");
        assert_eq!(curves[1].operation, "checksum:32");
        for curve in &curves {
            assert_eq!(curve.points.len(), 2);
            assert_eq!(curve.points[1].measurement.total_operations, 100);
        }
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let ops = vec!["spin:10".parse::<OpSpec>().unwrap()];
        let config = ScalingConfig {
            worker_counts: vec![0],
            ..ScalingConfig::default()
        };
        let err = run_scaling_suite(&ops, &config).unwrap_err();
        assert!(format!("{:#}", err).contains("spin:10"));
    }

    #[test]
    fn test_trial_and_comparison_suites() {
        let ops = vec!["spin:5".parse::<OpSpec>().unwrap()];
        let trials = TrialConfig {
            trials: 20,
            iterations_per_trial: 10,
            warmup_iterations: 10,
            progress_interval: 0,
            sanity_check: true,
        };
        let runs = run_trial_suite(&ops, &trials).unwrap();
        assert_eq!(runs[0].samples.len(), 20);

        let comparisons = run_comparison_suite(
            &ops,
            &ComparisonConfig {
                workers: 2,
                tasks: 40,
                ..ComparisonConfig::default()
            },
        )
        .unwrap();
        assert_eq!(comparisons[0].concurrent.total_operations, 40);
        assert_eq!(comparisons[0].sequential.total_operations, 40);
        assert_eq!(comparisons[0].sequential.workers, 1);
    }
}
