#![warn(missing_docs)]
//! # Parabench
//!
//! Barrier-synchronised multi-threaded throughput harness with
//! publication-grade statistics.
//!
//! - **Timed phase protocol**: workers build their own context, warm up,
//!   meet at a rendezvous barrier, and only then start the clock; the
//!   clock stops when the last task completes
//! - **Work pool**: tasks are claimed dynamically and handed back with
//!   their outputs after the run
//! - **Scaling curves**: throughput, speedup and parallel efficiency across
//!   worker counts
//! - **Statistical trials**: mean, Bessel-corrected SD, percentiles,
//!   bias-corrected skewness and kurtosis, Jarque–Bera normality and
//!   3σ outlier detection
//!
//! ## Quick Start
//!
//! ```ignore
//! use parabench::prelude::*;
//!
//! let op = from_fn("verify", || {
//!     verify_signature().map_err(|e| OperationError::new(e.to_string()))
//! });
//!
//! let curve = run_scaling(&op, &ScalingConfig::default())?;
//! for point in &curve.points {
//!     println!("{} workers: {:.2}x", point.workers(), point.speedup);
//! }
//!
//! let run = run_trials(&op, &TrialConfig::default())?;
//! let stats = run.statistics()?;
//! println!("{:.0} ops/s ({})", stats.mean, stats.stability());
//! ```

// Re-export core runtime
pub use parabench_core::{
    BarrierCancelled, BarrierWaitResult, ComparisonConfig, ConcurrencyComparison,
    DEFAULT_WORKER_COUNTS, FnOperation, HarnessError, LengthSummary, NoopProvider, Operation,
    OperationError, Phase, PhaseConfig, PhaseRun, Provider, ProviderSession, RendezvousBarrier,
    RunMeasurement, ScalingConfig, ScalingCurve, ScalingPoint, TrialConfig, TrialRun, WorkPool,
    Workload, compare_concurrent_sequential, derive_scaling, from_fn, run_phase,
    run_phase_with_tasks, run_scaling, run_scaling_with, run_sequential, run_trials,
    sanity_check, summarize_lengths,
};

// Re-export stats
pub use parabench_stats::{
    JB_CRITICAL_005, NormalityTest, OutlierAnalysis, OutlierGrade, OutlierMethod, OverallGrade,
    Percentiles, RecommendedSummary, SkewShape, Stability, StatsError, TailShape, TrialStatistics,
    compute_trial_statistics, detect_outliers, test_normality,
};

// Re-export report surface
pub use parabench_report::{Report, generate_json_report};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        ComparisonConfig, Operation, OperationError, PhaseConfig, ScalingConfig, TrialConfig,
        compare_concurrent_sequential, from_fn, run_phase, run_scaling, run_trials,
    };
}

/// Run the Parabench CLI.
///
/// ```ignore
/// fn main() {
///     parabench::run().unwrap();
/// }
/// ```
pub use parabench_cli::run;
