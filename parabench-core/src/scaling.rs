//! Scaling Curve and Concurrency Comparison
//!
//! A scaling curve repeats the phase protocol for a list of worker counts
//! and derives speedup and parallel efficiency against a baseline point.
//! The comparison pits one pooled run against the same tasks executed
//! sequentially on the calling thread.

use crate::error::HarnessError;
use crate::operation::Operation;
use crate::phase::{PhaseConfig, RunMeasurement, Workload, run_phase, run_sequential, sanity_check};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Worker counts measured by default
pub const DEFAULT_WORKER_COUNTS: [usize; 6] = [1, 2, 4, 6, 8, 10];

/// Scaling curve parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalingConfig {
    /// Worker counts, measured in order
    pub worker_counts: Vec<usize>,
    /// Untimed invocations per worker
    pub warmup_iterations: u64,
    /// Timed work at each point
    pub workload: Workload,
    /// Pin workers to cores
    pub pin_workers: bool,
    /// Run one checked invocation before the first point
    pub sanity_check: bool,
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self {
            worker_counts: DEFAULT_WORKER_COUNTS.to_vec(),
            warmup_iterations: 100,
            workload: Workload::PerWorker { iterations: 1000 },
            pin_workers: false,
            sanity_check: true,
        }
    }
}

impl ScalingConfig {
    fn phase_config(&self, workers: usize) -> PhaseConfig {
        PhaseConfig {
            workers,
            warmup_iterations: self.warmup_iterations,
            workload: self.workload,
            pin_workers: self.pin_workers,
            sanity_check: false,
        }
    }
}

/// One worker count on the curve
#[derive(Debug, Clone, PartialEq)]
pub struct ScalingPoint {
    /// Raw measurement
    pub measurement: RunMeasurement,
    /// Throughput relative to the baseline point
    pub speedup: f64,
    /// `speedup / (workers / baseline_workers) × 100`
    pub efficiency_pct: f64,
}

impl ScalingPoint {
    /// Worker count
    pub fn workers(&self) -> usize {
        self.measurement.workers
    }
}

/// Measured scaling curve
#[derive(Debug, Clone, PartialEq)]
pub struct ScalingCurve {
    /// Operation name
    pub operation: String,
    /// Points in measurement order
    pub points: Vec<ScalingPoint>,
}

impl ScalingCurve {
    /// Point speedups are relative to: the 1-worker point, else the first
    pub fn baseline(&self) -> Option<&ScalingPoint> {
        self.points
            .iter()
            .find(|p| p.workers() == 1)
            .or_else(|| self.points.first())
    }
}

/// Derive speedup and efficiency for a set of measurements.
///
/// The baseline is the 1-worker measurement if present, otherwise the first.
pub fn derive_scaling(measurements: Vec<RunMeasurement>) -> Vec<ScalingPoint> {
    let baseline = measurements
        .iter()
        .find(|m| m.workers == 1)
        .or_else(|| measurements.first())
        .map(|m| (m.throughput(), m.workers));

    let Some((base_throughput, base_workers)) = baseline else {
        return Vec::new();
    };

    measurements
        .into_iter()
        .map(|measurement| {
            let speedup = if base_throughput > 0.0 {
                measurement.throughput() / base_throughput
            } else {
                0.0
            };
            let ideal = measurement.workers as f64 / base_workers as f64;
            ScalingPoint {
                efficiency_pct: speedup / ideal * 100.0,
                speedup,
                measurement,
            }
        })
        .collect()
}

/// Measure `op` at every configured worker count
pub fn run_scaling<O: Operation>(
    op: &O,
    config: &ScalingConfig,
) -> Result<ScalingCurve, HarnessError> {
    run_scaling_with(op, config, |_| {})
}

/// As [`run_scaling`], calling `on_point` after each worker count finishes
pub fn run_scaling_with<O, F>(
    op: &O,
    config: &ScalingConfig,
    mut on_point: F,
) -> Result<ScalingCurve, HarnessError>
where
    O: Operation,
    F: FnMut(&RunMeasurement),
{
    if config.worker_counts.is_empty() {
        return Err(HarnessError::InvalidConfig(
            "no worker counts to measure".to_string(),
        ));
    }
    // Validate every point before running any
    for &workers in &config.worker_counts {
        config.phase_config(workers).validate()?;
    }
    if config.sanity_check {
        sanity_check(op)?;
    }

    let mut measurements = Vec::with_capacity(config.worker_counts.len());
    for &workers in &config.worker_counts {
        let measurement = run_phase(op, &config.phase_config(workers))?;
        info!(
            operation = op.name(),
            workers,
            throughput = measurement.throughput(),
            failed = measurement.failed_operations,
            "scaling point measured"
        );
        on_point(&measurement);
        measurements.push(measurement);
    }

    Ok(ScalingCurve {
        operation: op.name().to_string(),
        points: derive_scaling(measurements),
    })
}

/// Concurrent-vs-sequential comparison parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonConfig {
    /// Workers for the concurrent run
    pub workers: usize,
    /// Tasks executed by each run
    pub tasks: usize,
    /// Untimed invocations before each run's timed section
    pub warmup_iterations: u64,
    /// Run one checked invocation first
    pub sanity_check: bool,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            tasks: 100,
            warmup_iterations: 0,
            sanity_check: true,
        }
    }
}

/// Outcome of a concurrent-vs-sequential comparison
#[derive(Debug, Clone, PartialEq)]
pub struct ConcurrencyComparison {
    /// Operation name
    pub operation: String,
    /// Pooled run on `workers` threads
    pub concurrent: RunMeasurement,
    /// Same number of tasks on the calling thread
    pub sequential: RunMeasurement,
}

impl ConcurrencyComparison {
    /// `(t_concurrent − t_sequential) / t_sequential × 100`; negative means
    /// the concurrent run finished sooner
    pub fn overhead_pct(&self) -> f64 {
        let t_seq = self.sequential.elapsed_secs();
        if t_seq <= 0.0 {
            return 0.0;
        }
        (self.concurrent.elapsed_secs() - t_seq) / t_seq * 100.0
    }

    /// One-line reading of [`overhead_pct`](Self::overhead_pct)
    pub fn analysis(&self) -> String {
        let overhead = self.overhead_pct();
        if overhead > 0.0 {
            format!("Concurrent adds {overhead:.1}% overhead due to thread coordination")
        } else {
            format!(
                "Concurrent yields {:.1}% lower latency (better parallelism)",
                -overhead
            )
        }
    }
}

/// Run the pooled form, then the same task count sequentially
pub fn compare_concurrent_sequential<O: Operation>(
    op: &O,
    config: &ComparisonConfig,
) -> Result<ConcurrencyComparison, HarnessError> {
    let phase = PhaseConfig::pooled(config.workers, config.tasks)
        .with_warmup(config.warmup_iterations)
        .with_sanity_check(config.sanity_check);

    let concurrent = run_phase(op, &phase)?;
    let sequential = run_sequential(op, config.tasks, config.warmup_iterations)?.measurement;

    let comparison = ConcurrencyComparison {
        operation: op.name().to_string(),
        concurrent,
        sequential,
    };
    info!(
        operation = op.name(),
        overhead_pct = comparison.overhead_pct(),
        "{}",
        comparison.analysis()
    );
    Ok(comparison)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::from_fn;
    use std::time::Duration;

    fn measurement(workers: usize, ops: u64, millis: u64) -> RunMeasurement {
        RunMeasurement {
            workers,
            warmup_iterations: 0,
            total_operations: ops,
            failed_operations: 0,
            warmup_failures: 0,
            elapsed: Duration::from_millis(millis),
            ticks: 0,
        }
    }

    #[test]
    fn test_speedup_relative_to_single_worker() {
        let points = derive_scaling(vec![
            measurement(2, 2000, 1000),
            measurement(1, 1000, 1000),
            measurement(4, 3000, 1000),
        ]);

        assert!((points[0].speedup - 2.0).abs() < 1e-9);
        assert!((points[0].efficiency_pct - 100.0).abs() < 1e-9);
        assert!((points[1].speedup - 1.0).abs() < 1e-9);
        assert!((points[2].speedup - 3.0).abs() < 1e-9);
        assert!((points[2].efficiency_pct - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_baseline_falls_back_to_first_point() {
        let points = derive_scaling(vec![measurement(2, 1000, 1000), measurement(8, 3000, 1000)]);

        assert!((points[0].speedup - 1.0).abs() < 1e-9);
        assert!((points[0].efficiency_pct - 100.0).abs() < 1e-9);
        // 3x throughput on 4x the workers
        assert!((points[1].efficiency_pct - 75.0).abs() < 1e-9);
        assert!(derive_scaling(Vec::new()).is_empty());
    }

    #[test]
    fn test_run_scaling_reports_every_point() {
        let op = from_fn("noop", || Ok(()));
        let config = ScalingConfig {
            worker_counts: vec![1, 2, 3],
            warmup_iterations: 2,
            workload: Workload::PerWorker { iterations: 50 },
            ..ScalingConfig::default()
        };

        let mut seen = Vec::new();
        let curve = run_scaling_with(&op, &config, |m| seen.push(m.workers)).unwrap();

        assert_eq!(seen, vec![1, 2, 3]);
        assert_eq!(curve.points.len(), 3);
        assert_eq!(curve.baseline().map(ScalingPoint::workers), Some(1));
        assert_eq!(curve.points[2].measurement.total_operations, 150);
    }

    #[test]
    fn test_invalid_point_rejected_up_front() {
        let op = from_fn("noop", || Ok(()));
        let config = ScalingConfig {
            worker_counts: vec![1, 0],
            ..ScalingConfig::default()
        };
        assert!(matches!(
            run_scaling(&op, &config),
            Err(HarnessError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_overhead_sign_and_analysis() {
        let slower = ConcurrencyComparison {
            operation: "op".to_string(),
            concurrent: measurement(4, 100, 120),
            sequential: measurement(1, 100, 100),
        };
        assert!((slower.overhead_pct() - 20.0).abs() < 1e-9);
        assert_eq!(
            slower.analysis(),
            "Concurrent adds 20.0% overhead due to thread coordination"
        );

        let faster = ConcurrencyComparison {
            concurrent: measurement(4, 100, 25),
            ..slower
        };
        assert!((faster.overhead_pct() + 75.0).abs() < 1e-9);
        assert!(faster.analysis().contains("75.0% lower latency"));
    }

    #[test]
    fn test_comparison_runs_both_forms() {
        let op = from_fn("sleep", || {
            std::thread::sleep(Duration::from_millis(1));
            Ok(())
        });
        let config = ComparisonConfig {
            workers: 4,
            tasks: 20,
            ..ComparisonConfig::default()
        };

        let cmp = compare_concurrent_sequential(&op, &config).unwrap();
        assert_eq!(cmp.concurrent.total_operations, 20);
        assert_eq!(cmp.sequential.total_operations, 20);
        assert!(cmp.sequential.elapsed >= Duration::from_millis(20));
        assert!(cmp.overhead_pct() < 0.0);
    }
}
