//! Output Formatting
//!
//! Human-readable output formatting for run reports.
//!
//! Generates terminal-friendly output with:
//! - Scaling tables (throughput, speedup and efficiency per worker count)
//! - Trial statistics with distribution verdicts
//! - Concurrent-vs-sequential comparisons

use parabench_report::{ComparisonReport, MeasurementReport, Report, ScalingReport, TrialReport};
use parabench_stats::{SkewShape, TailShape};

/// Format a report for human-readable terminal display
pub fn format_human_output(report: &Report) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str("Parabench Results\n");
    output.push_str(&"=".repeat(60));
    output.push_str("\n\n");

    for scaling in &report.scaling {
        format_scaling(&mut output, scaling);
    }
    for trial in &report.trials {
        format_trial(&mut output, trial);
    }
    for cmp in &report.comparisons {
        format_comparison(&mut output, cmp);
    }

    let failed = report.total_failed_operations();
    if failed > 0 {
        output.push_str(&format!("{} timed operation(s) failed\n", failed));
    }

    output
}

fn format_scaling(output: &mut String, scaling: &ScalingReport) {
    output.push_str(&format!(
        "Scaling: {} (baseline: {} worker{})\n",
        scaling.operation,
        scaling.baseline_workers,
        if scaling.baseline_workers == 1 { "" } else { "s" }
    ));
    output.push_str(&"-".repeat(60));
    output.push('\n');

    output.push_str(&format!(
        "  {:>7}  {:>12}  {:>14}  {:>8}  {:>10}  {:>6}\n",
        "Workers", "Time (ms)", "Ops/sec", "Speedup", "Efficiency", "Failed"
    ));
    for p in &scaling.points {
        output.push_str(&format!(
            "  {:>7}  {:>12.2}  {:>14.2}  {:>7.2}x  {:>9.1}%  {:>6}\n",
            p.workers,
            p.total_time_ms,
            p.throughput_ops_sec,
            p.speedup,
            p.efficiency_pct,
            p.failed_operations
        ));
    }
    output.push('\n');
}

fn format_trial(output: &mut String, trial: &TrialReport) {
    let s = &trial.statistics;
    let v = &trial.verdicts;

    output.push_str(&format!(
        "Trials: {} ({} trials x {} iterations, {} warm-up)\n",
        trial.operation, trial.trials, trial.iterations_per_trial, trial.warmup_iterations
    ));
    output.push_str(&"-".repeat(60));
    output.push('\n');

    output.push_str(&format!(
        "      mean: {:.2} ops/s  median: {:.2} ops/s  stddev: {:.2}  cv: {:.2}%\n",
        s.mean, s.median, s.std_dev, s.cv_percent
    ));
    output.push_str(&format!(
        "      min: {:.2}  max: {:.2}  iqr: {:.2}  samples: {}\n",
        s.min, s.max, s.iqr, s.sample_count
    ));
    output.push_str(&format!(
        "      p5: {:.2}  p25: {:.2}  p75: {:.2}  p95: {:.2}  p99: {:.2}\n",
        s.p5, s.p25, s.p75, s.p95, s.p99
    ));
    output.push_str(&format!(
        "      skewness: {:.4} ({})  excess kurtosis: {:.4} ({})\n",
        s.skewness,
        skew_label(v.skew_shape),
        s.excess_kurtosis,
        tail_label(v.tail_shape)
    ));
    output.push_str(&format!(
        "      jarque-bera: {:.4} (critical {:.3})  {}\n",
        s.jarque_bera,
        s.jb_critical_value,
        if s.normality_pass {
            "consistent with normal"
        } else {
            "not normal"
        }
    ));
    output.push_str(&format!(
        "      outliers (>3σ): {} ({})  stability: {}  report as: {}\n",
        s.outlier_count, v.outlier_grade, v.stability, v.recommended_summary
    ));
    output.push_str(&format!("      verdict: {}\n", v.overall_grade));
    if trial.failed_operations > 0 || trial.warmup_failures > 0 {
        output.push_str(&format!(
            "      failed: {} timed, {} warm-up\n",
            trial.failed_operations, trial.warmup_failures
        ));
    }
    output.push('\n');
}

fn format_comparison(output: &mut String, cmp: &ComparisonReport) {
    output.push_str(&format!("Concurrent vs Sequential: {}\n", cmp.operation));
    output.push_str(&"-".repeat(60));
    output.push('\n');

    format_measurement(output, "concurrent", &cmp.concurrent);
    format_measurement(output, "sequential", &cmp.sequential);
    output.push_str(&format!("  overhead: {:+.1}%\n", cmp.overhead_pct));
    output.push_str(&format!("  {}\n\n", cmp.analysis));
}

fn format_measurement(output: &mut String, label: &str, m: &MeasurementReport) {
    output.push_str(&format!(
        "  {:<10} ({:>2} worker{}): {:.2} ms total, {:.4} ms/op, {:.2} ops/sec",
        label,
        m.workers,
        if m.workers == 1 { " " } else { "s" },
        m.total_time_ms,
        m.avg_latency_ms,
        m.throughput_ops_sec
    ));
    if m.failed_operations > 0 {
        output.push_str(&format!(", {} failed", m.failed_operations));
    }
    output.push('\n');
}

fn skew_label(shape: SkewShape) -> &'static str {
    match shape {
        SkewShape::Symmetric => "symmetric",
        SkewShape::RightSkewed => "right-skewed",
        SkewShape::LeftSkewed => "left-skewed",
    }
}

fn tail_label(shape: TailShape) -> &'static str {
    match shape {
        TailShape::NearGaussian => "near-gaussian",
        TailShape::HeavyTails => "heavy tails",
        TailShape::LightTails => "light tails",
    }
}
