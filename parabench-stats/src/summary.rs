//! Summary Statistics
//!
//! One record per trial run. Every field is computed from ALL samples:
//! outliers are counted, not removed, because they are the tail signal.

use crate::error::StatsError;
use crate::moments::Moments;
use crate::normality::NormalityTest;
use crate::outliers::sigma_analysis;
use crate::percentiles::{Percentiles, compute_percentiles, sort_samples};
use serde::{Deserialize, Serialize};

/// Smallest sample for which every statistic in the record is defined
pub const MIN_SAMPLES_FOR_ANALYSIS: usize = 4;

/// Outlier share (percent of trials) at or above which the run is flagged
pub const OUTLIER_THRESHOLD_PCT: f64 = 1.0;

/// Full statistics record for a sequence of trial samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialStatistics {
    /// Number of samples
    pub sample_count: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Sample standard deviation (n − 1)
    pub std_dev: f64,
    /// Coefficient of variation in percent
    pub cv_percent: f64,
    /// Smallest sample
    pub min: f64,
    /// Largest sample
    pub max: f64,
    /// Standard percentiles (p50 is the median)
    pub percentiles: Percentiles,
    /// p75 − p25
    pub iqr: f64,
    /// Bias-corrected skewness G1
    pub skewness: f64,
    /// Bias-corrected excess kurtosis G2
    pub excess_kurtosis: f64,
    /// Jarque–Bera result
    pub normality: NormalityTest,
    /// Samples more than 3 standard deviations from the mean
    pub outlier_count: usize,
    /// Trial indices of those samples
    pub outlier_indices: Vec<usize>,
}

/// Run-to-run stability judged by the coefficient of variation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stability {
    /// CV < 2%
    Excellent,
    /// CV < 5%
    Acceptable,
    /// CV ≥ 5%
    Noisy,
}

/// Direction of asymmetry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkewShape {
    /// |G1| ≤ 0.1
    Symmetric,
    /// G1 > 0.1: occasional slow trials pull the tail right
    RightSkewed,
    /// G1 < −0.1
    LeftSkewed,
}

/// Tail weight relative to a Gaussian
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TailShape {
    /// |G2| ≤ 0.5
    NearGaussian,
    /// G2 > 0.5
    HeavyTails,
    /// G2 < −0.5
    LightTails,
}

/// Which central tendency / spread pair to quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendedSummary {
    /// Distribution passes Jarque–Bera: quote mean ± SD
    MeanStdDev,
    /// Non-normal: quote median and IQR
    MedianIqr,
}

/// Outlier share verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutlierGrade {
    /// Fewer than 1% of trials beyond 3σ
    Pass,
    /// 1% or more: the environment injected tail events
    Warn,
}

/// Combined verdict on whether the numbers can be quoted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverallGrade {
    /// Stability acceptable or better and outliers pass
    SuitableForPublication,
    /// Noisy or outlier-heavy run
    ReviewEnvironment,
}

impl std::fmt::Display for Stability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stability::Excellent => write!(f, "excellent"),
            Stability::Acceptable => write!(f, "acceptable"),
            Stability::Noisy => write!(f, "noisy"),
        }
    }
}

impl std::fmt::Display for RecommendedSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecommendedSummary::MeanStdDev => write!(f, "mean ± SD"),
            RecommendedSummary::MedianIqr => write!(f, "median / IQR"),
        }
    }
}

impl std::fmt::Display for OutlierGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutlierGrade::Pass => write!(f, "pass"),
            OutlierGrade::Warn => write!(f, "warn"),
        }
    }
}

impl std::fmt::Display for OverallGrade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverallGrade::SuitableForPublication => write!(f, "good, suitable for publication"),
            OverallGrade::ReviewEnvironment => {
                write!(f, "review, check environment before publishing")
            }
        }
    }
}

impl TrialStatistics {
    /// Median (p50)
    pub fn median(&self) -> f64 {
        self.percentiles.p50
    }

    /// Jarque–Bera statistic
    pub fn jarque_bera(&self) -> f64 {
        self.normality.statistic
    }

    /// Whether the sample passes the normality test
    pub fn is_normal(&self) -> bool {
        self.normality.is_normal
    }

    /// Stability verdict from the coefficient of variation
    pub fn stability(&self) -> Stability {
        if self.cv_percent < 2.0 {
            Stability::Excellent
        } else if self.cv_percent < 5.0 {
            Stability::Acceptable
        } else {
            Stability::Noisy
        }
    }

    /// Skew verdict
    pub fn skew_shape(&self) -> SkewShape {
        if self.skewness > 0.1 {
            SkewShape::RightSkewed
        } else if self.skewness < -0.1 {
            SkewShape::LeftSkewed
        } else {
            SkewShape::Symmetric
        }
    }

    /// Tail verdict
    pub fn tail_shape(&self) -> TailShape {
        if self.excess_kurtosis > 0.5 {
            TailShape::HeavyTails
        } else if self.excess_kurtosis < -0.5 {
            TailShape::LightTails
        } else {
            TailShape::NearGaussian
        }
    }

    /// Percentage of trials flagged as outliers
    pub fn outlier_percentage(&self) -> f64 {
        if self.sample_count == 0 {
            return 0.0;
        }
        (self.outlier_count as f64 / self.sample_count as f64) * 100.0
    }

    /// Outlier verdict against [`OUTLIER_THRESHOLD_PCT`]
    pub fn outlier_grade(&self) -> OutlierGrade {
        if self.outlier_percentage() < OUTLIER_THRESHOLD_PCT {
            OutlierGrade::Pass
        } else {
            OutlierGrade::Warn
        }
    }

    /// Publication verdict. Normality only picks the summary pair, it does
    /// not gate this grade.
    pub fn overall_grade(&self) -> OverallGrade {
        let stable = matches!(self.stability(), Stability::Excellent | Stability::Acceptable);
        if stable && self.outlier_grade() == OutlierGrade::Pass {
            OverallGrade::SuitableForPublication
        } else {
            OverallGrade::ReviewEnvironment
        }
    }

    /// Summary pair appropriate for the distribution
    pub fn recommended_summary(&self) -> RecommendedSummary {
        if self.normality.is_normal {
            RecommendedSummary::MeanStdDev
        } else {
            RecommendedSummary::MedianIqr
        }
    }
}

/// Compute the full statistics record. Requires `n >= 4` and finite samples.
///
/// `samples` stay in trial order; sorting happens on a private copy.
pub fn compute_trial_statistics(samples: &[f64]) -> Result<TrialStatistics, StatsError> {
    let moments = Moments::compute(samples)?;
    let sorted = sort_samples(samples);
    let percentiles = compute_percentiles(&sorted)?;
    let outliers = sigma_analysis(samples, &moments, crate::DEFAULT_OUTLIER_SIGMA);

    Ok(TrialStatistics {
        sample_count: moments.n,
        mean: moments.mean,
        std_dev: moments.std_dev,
        cv_percent: moments.coefficient_of_variation(),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        iqr: percentiles.iqr(),
        percentiles,
        skewness: moments.skewness,
        excess_kurtosis: moments.excess_kurtosis,
        normality: NormalityTest::from_moments(&moments),
        outlier_count: outliers.outlier_count(),
        outlier_indices: outliers.outlier_indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn gaussian(rng: &mut StdRng, n: usize, mean: f64, sd: f64) -> Vec<f64> {
        (0..n)
            .map(|_| {
                // Box–Muller
                let u1: f64 = rng.r#gen::<f64>().max(f64::MIN_POSITIVE);
                let u2: f64 = rng.r#gen();
                mean + sd * (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
            })
            .collect()
    }

    #[test]
    fn test_record_fields_consistent() {
        let samples: Vec<f64> = (1..=100).map(|x| x as f64).collect();
        let stats = compute_trial_statistics(&samples).unwrap();

        assert_eq!(stats.sample_count, 100);
        assert!((stats.mean - 50.5).abs() < 1e-9);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 100.0);
        assert!((stats.median() - 50.5).abs() < 1e-9);
        assert!((stats.iqr - 49.5).abs() < 1e-9);
        assert_eq!(stats.outlier_count, 0);
        assert_eq!(stats.skew_shape(), SkewShape::Symmetric);
        // Uniform is platykurtic (G2 ≈ −1.2)
        assert_eq!(stats.tail_shape(), TailShape::LightTails);
    }

    #[test]
    fn test_input_order_preserved_for_outlier_indices() {
        let mut samples = vec![10.0; 30];
        samples[7] = 1000.0;
        for (i, s) in samples.iter_mut().enumerate() {
            *s += (i % 3) as f64;
        }
        let stats = compute_trial_statistics(&samples).unwrap();
        assert_eq!(stats.outlier_indices, vec![7]);
        assert_eq!(stats.skew_shape(), SkewShape::RightSkewed);
        assert_eq!(stats.tail_shape(), TailShape::HeavyTails);
        assert_eq!(stats.recommended_summary(), RecommendedSummary::MedianIqr);
    }

    #[test]
    fn test_gaussian_sample_verdicts() {
        let mut rng = StdRng::seed_from_u64(42);
        let samples = gaussian(&mut rng, 1000, 10_000.0, 50.0);
        let stats = compute_trial_statistics(&samples).unwrap();

        assert_eq!(stats.stability(), Stability::Excellent);
        assert!(stats.outlier_count <= 10);
        assert!(stats.skewness.abs() < 0.5);
    }

    #[test]
    fn test_stability_thresholds() {
        let mut stats = compute_trial_statistics(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        stats.cv_percent = 1.99;
        assert_eq!(stats.stability(), Stability::Excellent);
        stats.cv_percent = 2.0;
        assert_eq!(stats.stability(), Stability::Acceptable);
        stats.cv_percent = 5.0;
        assert_eq!(stats.stability(), Stability::Noisy);
    }

    #[test]
    fn test_constant_samples() {
        let stats = compute_trial_statistics(&[3.0; 8]).unwrap();
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.skewness, 0.0);
        assert_eq!(stats.excess_kurtosis, 0.0);
        assert_eq!(stats.outlier_count, 0);
        assert!(stats.is_normal());
    }

    #[test]
    fn test_large_inexact_constant_sample() {
        let stats = compute_trial_statistics(&[1234.567; 1000]).unwrap();
        assert_eq!(stats.mean, 1234.567);
        assert_eq!(stats.std_dev, 0.0);
        assert_eq!(stats.skewness, 0.0);
        assert_eq!(stats.excess_kurtosis, 0.0);
        assert_eq!(stats.jarque_bera(), 0.0);
        assert!(stats.is_normal());
        assert_eq!(stats.outlier_count, 0);
        assert_eq!(stats.overall_grade(), OverallGrade::SuitableForPublication);
    }

    #[test]
    fn test_outlier_grade_threshold() {
        let samples: Vec<f64> = (0..100).map(|i| 1000.0 + (i % 7) as f64).collect();
        let mut stats = compute_trial_statistics(&samples).unwrap();
        assert_eq!(stats.outlier_grade(), OutlierGrade::Pass);
        assert_eq!(stats.overall_grade(), OverallGrade::SuitableForPublication);

        // 1 of 100 is exactly 1%: not below the threshold
        stats.outlier_count = 1;
        assert!((stats.outlier_percentage() - 1.0).abs() < 1e-12);
        assert_eq!(stats.outlier_grade(), OutlierGrade::Warn);
        assert_eq!(stats.overall_grade(), OverallGrade::ReviewEnvironment);

        stats.sample_count = 101;
        assert_eq!(stats.outlier_grade(), OutlierGrade::Pass);
    }

    #[test]
    fn test_overall_grade_requires_stability() {
        let mut stats = compute_trial_statistics(&[10.0, 10.1, 9.9, 10.0]).unwrap();
        stats.outlier_count = 0;

        stats.cv_percent = 4.99;
        assert_eq!(stats.overall_grade(), OverallGrade::SuitableForPublication);
        stats.cv_percent = 5.0;
        assert_eq!(stats.overall_grade(), OverallGrade::ReviewEnvironment);

        // Non-normal but stable still passes
        stats.cv_percent = 1.0;
        stats.normality = NormalityTest::from_statistic(50.0);
        assert_eq!(stats.overall_grade(), OverallGrade::SuitableForPublication);
        assert_eq!(stats.recommended_summary(), RecommendedSummary::MedianIqr);
    }

    #[test]
    fn test_too_few_samples() {
        assert!(matches!(
            compute_trial_statistics(&[1.0, 2.0, 3.0]),
            Err(StatsError::NotEnoughSamples { min: MIN_SAMPLES_FOR_ANALYSIS, .. })
        ));
    }
}
