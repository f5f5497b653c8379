//! Report Data Structures

use chrono::{DateTime, Utc};
use parabench_core::{ConcurrencyComparison, RunMeasurement, ScalingCurve, TrialRun};
use parabench_stats::{
    OutlierGrade, OverallGrade, RecommendedSummary, SkewShape, Stability, TailShape,
    TrialStatistics,
};
use serde::{Deserialize, Serialize};

/// Current report schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Complete run report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub meta: ReportMeta,
    pub scaling: Vec<ScalingReport>,
    pub trials: Vec<TrialReport>,
    pub comparisons: Vec<ComparisonReport>,
}

impl Report {
    /// Empty report carrying `meta`
    pub fn new(meta: ReportMeta) -> Self {
        Self {
            meta,
            scaling: Vec::new(),
            trials: Vec::new(),
            comparisons: Vec::new(),
        }
    }

    /// Timed operations that failed across every section
    pub fn total_failed_operations(&self) -> u64 {
        let scaling: u64 = self
            .scaling
            .iter()
            .flat_map(|s| &s.points)
            .map(|p| p.failed_operations)
            .sum();
        let trials: u64 = self.trials.iter().map(|t| t.failed_operations).sum();
        let comparisons: u64 = self
            .comparisons
            .iter()
            .map(|c| c.concurrent.failed_operations + c.sequential.failed_operations)
            .sum();
        scaling + trials + comparisons
    }
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    pub schema_version: u32,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub system: SystemInfo,
}

/// System information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    pub os: String,
    pub arch: String,
    pub cpu: String,
    pub cpu_cores: u32,
    pub memory_gb: f64,
    /// Whether `ticks` fields carry hardware counter values
    pub tick_counter: bool,
}

/// One timed section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementReport {
    pub workers: usize,
    pub warmup_iterations: u64,
    pub total_operations: u64,
    pub failed_operations: u64,
    pub warmup_failures: u64,
    pub total_time_ms: f64,
    pub avg_latency_ms: f64,
    pub throughput_ops_sec: f64,
    pub ticks: u64,
}

impl From<&RunMeasurement> for MeasurementReport {
    fn from(m: &RunMeasurement) -> Self {
        Self {
            workers: m.workers,
            warmup_iterations: m.warmup_iterations,
            total_operations: m.total_operations,
            failed_operations: m.failed_operations,
            warmup_failures: m.warmup_failures,
            total_time_ms: m.elapsed_ms(),
            avg_latency_ms: m.avg_latency_ms(),
            throughput_ops_sec: m.throughput(),
            ticks: m.ticks,
        }
    }
}

/// Scaling curve for one operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalingReport {
    pub operation: String,
    pub baseline_workers: usize,
    pub points: Vec<ScalingPointReport>,
}

/// One worker count on a scaling curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalingPointReport {
    pub workers: usize,
    pub total_operations: u64,
    pub failed_operations: u64,
    pub total_time_ms: f64,
    pub throughput_ops_sec: f64,
    pub speedup: f64,
    pub efficiency_pct: f64,
}

impl From<&ScalingCurve> for ScalingReport {
    fn from(curve: &ScalingCurve) -> Self {
        Self {
            operation: curve.operation.clone(),
            baseline_workers: curve.baseline().map(|p| p.workers()).unwrap_or(0),
            points: curve
                .points
                .iter()
                .map(|p| ScalingPointReport {
                    workers: p.workers(),
                    total_operations: p.measurement.total_operations,
                    failed_operations: p.measurement.failed_operations,
                    total_time_ms: p.measurement.elapsed_ms(),
                    throughput_ops_sec: p.measurement.throughput(),
                    speedup: p.speedup,
                    efficiency_pct: p.efficiency_pct,
                })
                .collect(),
        }
    }
}

/// Statistical trial run with full statistics and raw samples
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialReport {
    pub operation: String,
    pub trials: usize,
    pub iterations_per_trial: u64,
    pub warmup_iterations: u64,
    pub failed_operations: u64,
    pub warmup_failures: u64,
    pub statistics: StatisticsReport,
    pub verdicts: DistributionVerdicts,
    /// Throughput samples (ops/s) in trial order
    pub raw_data: Vec<f64>,
}

impl TrialReport {
    /// Build from a run and its statistics
    pub fn new(run: &TrialRun, stats: &TrialStatistics) -> Self {
        Self {
            operation: run.operation.clone(),
            trials: run.config.trials,
            iterations_per_trial: run.config.iterations_per_trial,
            warmup_iterations: run.config.warmup_iterations,
            failed_operations: run.failed_operations,
            warmup_failures: run.warmup_failures,
            statistics: StatisticsReport::from(stats),
            verdicts: DistributionVerdicts::from(stats),
            raw_data: run.samples.clone(),
        }
    }
}

/// Flat statistics record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsReport {
    pub sample_count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub cv_percent: f64,
    pub min: f64,
    pub p5: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub p95: f64,
    pub p99: f64,
    pub max: f64,
    pub iqr: f64,
    pub skewness: f64,
    pub excess_kurtosis: f64,
    pub jarque_bera: f64,
    pub jb_critical_value: f64,
    pub normality_pass: bool,
    pub outlier_count: usize,
    pub outlier_indices: Vec<usize>,
}

impl From<&TrialStatistics> for StatisticsReport {
    fn from(s: &TrialStatistics) -> Self {
        Self {
            sample_count: s.sample_count,
            mean: s.mean,
            std_dev: s.std_dev,
            cv_percent: s.cv_percent,
            min: s.min,
            p5: s.percentiles.p5,
            p25: s.percentiles.p25,
            median: s.percentiles.p50,
            p75: s.percentiles.p75,
            p95: s.percentiles.p95,
            p99: s.percentiles.p99,
            max: s.max,
            iqr: s.iqr,
            skewness: s.skewness,
            excess_kurtosis: s.excess_kurtosis,
            jarque_bera: s.normality.statistic,
            jb_critical_value: s.normality.critical_value,
            normality_pass: s.normality.is_normal,
            outlier_count: s.outlier_count,
            outlier_indices: s.outlier_indices.clone(),
        }
    }
}

/// Qualitative reading of a statistics record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionVerdicts {
    pub stability: Stability,
    pub skew_shape: SkewShape,
    pub tail_shape: TailShape,
    pub recommended_summary: RecommendedSummary,
    pub outlier_grade: OutlierGrade,
    pub overall_grade: OverallGrade,
}

impl From<&TrialStatistics> for DistributionVerdicts {
    fn from(s: &TrialStatistics) -> Self {
        Self {
            stability: s.stability(),
            skew_shape: s.skew_shape(),
            tail_shape: s.tail_shape(),
            recommended_summary: s.recommended_summary(),
            outlier_grade: s.outlier_grade(),
            overall_grade: s.overall_grade(),
        }
    }
}

/// Concurrent-vs-sequential comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub operation: String,
    pub concurrent: MeasurementReport,
    pub sequential: MeasurementReport,
    pub overhead_pct: f64,
    pub analysis: String,
}

impl From<&ConcurrencyComparison> for ComparisonReport {
    fn from(c: &ConcurrencyComparison) -> Self {
        Self {
            operation: c.operation.clone(),
            concurrent: MeasurementReport::from(&c.concurrent),
            sequential: MeasurementReport::from(&c.sequential),
            overhead_pct: c.overhead_pct(),
            analysis: c.analysis(),
        }
    }
}
