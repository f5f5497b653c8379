//! Outlier Detection
//!
//! Outliers are counted and indexed, never removed: every other statistic in
//! this crate is computed over the full sample. Indices refer to trial order,
//! so a flagged sample can be traced back to the trial that produced it.
//!
//! For Gaussian data, P(|X − μ| > 3σ) ≈ 0.27%: about 2–3 outliers per 1,000
//! trials. Markedly more points to non-Gaussian tails (scheduler jitter,
//! thermal throttling).

use crate::error::StatsError;
use crate::moments::{Moments, raw_mean, raw_std_dev};
use crate::percentiles::{percentile, sort_samples};
use serde::{Deserialize, Serialize};

/// Method for outlier detection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OutlierMethod {
    /// Outside `mean ± threshold · s`, with `s` the sample standard deviation
    Sigma {
        /// Number of standard deviations
        threshold: f64,
    },
    /// Outside `[Q1 − k·IQR, Q3 + k·IQR]`
    Iqr {
        /// IQR multiplier (1.5 is Tukey's fence)
        k: f64,
    },
}

impl Default for OutlierMethod {
    fn default() -> Self {
        OutlierMethod::Sigma {
            threshold: crate::DEFAULT_OUTLIER_SIGMA,
        }
    }
}

/// Result of outlier analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierAnalysis {
    /// Indices (trial order) of outlier samples
    pub outlier_indices: Vec<usize>,
    /// Samples below the lower fence
    pub low_outlier_count: usize,
    /// Samples above the upper fence
    pub high_outlier_count: usize,
    /// Lower fence
    pub lower_bound: f64,
    /// Upper fence
    pub upper_bound: f64,
    /// Total samples analysed
    pub sample_count: usize,
    /// Detection method used
    pub method: OutlierMethod,
}

impl OutlierAnalysis {
    /// Total outliers
    pub fn outlier_count(&self) -> usize {
        self.outlier_indices.len()
    }

    /// Percentage of samples that are outliers
    pub fn outlier_percentage(&self) -> f64 {
        if self.sample_count == 0 {
            return 0.0;
        }
        (self.outlier_indices.len() as f64 / self.sample_count as f64) * 100.0
    }

    /// Check if outlier percentage exceeds threshold (indicates noisy environment)
    pub fn is_noisy(&self, threshold_pct: f64) -> bool {
        self.outlier_percentage() > threshold_pct
    }
}

/// Count samples strictly more than `threshold` standard deviations from `mean`.
///
/// A zero standard deviation has no outliers.
pub fn count_outliers(samples: &[f64], mean: f64, std_dev: f64, threshold: f64) -> usize {
    if std_dev == 0.0 {
        return 0;
    }
    let lo = mean - threshold * std_dev;
    let hi = mean + threshold * std_dev;
    samples.iter().filter(|&&x| x < lo || x > hi).count()
}

/// Detect outliers in samples using the specified method.
///
/// Sigma fences need `n >= 2` (a standard deviation); IQR fences need `n >= 1`.
pub fn detect_outliers(
    samples: &[f64],
    method: OutlierMethod,
) -> Result<OutlierAnalysis, StatsError> {
    StatsError::require_finite(samples)?;

    let (lower_bound, upper_bound) = match method {
        OutlierMethod::Sigma { threshold } => {
            check_threshold(threshold)?;
            StatsError::require("sigma outlier fences", samples.len(), 2)?;
            let mean = raw_mean(samples);
            let sd = raw_std_dev(samples, mean);
            if sd == 0.0 {
                return Ok(degenerate(samples.len(), mean, method));
            }
            (mean - threshold * sd, mean + threshold * sd)
        }
        OutlierMethod::Iqr { k } => {
            check_threshold(k)?;
            let sorted = sort_samples(samples);
            let q1 = percentile(&sorted, 25.0)?;
            let q3 = percentile(&sorted, 75.0)?;
            let iqr = q3 - q1;
            (q1 - k * iqr, q3 + k * iqr)
        }
    };

    Ok(fence(samples, lower_bound, upper_bound, method))
}

/// Sigma-fence analysis from precomputed moments
pub(crate) fn sigma_analysis(
    samples: &[f64],
    moments: &Moments,
    threshold: f64,
) -> OutlierAnalysis {
    let method = OutlierMethod::Sigma { threshold };
    if moments.std_dev == 0.0 {
        return degenerate(samples.len(), moments.mean, method);
    }
    let lower_bound = moments.mean - threshold * moments.std_dev;
    let upper_bound = moments.mean + threshold * moments.std_dev;
    fence(samples, lower_bound, upper_bound, method)
}

/// Constant sample: both fences sit on the mean and nothing is flagged
fn degenerate(sample_count: usize, mean: f64, method: OutlierMethod) -> OutlierAnalysis {
    OutlierAnalysis {
        outlier_indices: Vec::new(),
        low_outlier_count: 0,
        high_outlier_count: 0,
        lower_bound: mean,
        upper_bound: mean,
        sample_count,
        method,
    }
}

fn check_threshold(k: f64) -> Result<(), StatsError> {
    if k.is_finite() && k > 0.0 {
        Ok(())
    } else {
        Err(StatsError::InvalidThreshold(k))
    }
}

fn fence(
    samples: &[f64],
    lower_bound: f64,
    upper_bound: f64,
    method: OutlierMethod,
) -> OutlierAnalysis {
    let mut outlier_indices = Vec::new();
    let mut low_count = 0;
    let mut high_count = 0;

    for (i, &sample) in samples.iter().enumerate() {
        if sample < lower_bound {
            outlier_indices.push(i);
            low_count += 1;
        } else if sample > upper_bound {
            outlier_indices.push(i);
            high_count += 1;
        }
    }

    OutlierAnalysis {
        outlier_indices,
        low_outlier_count: low_count,
        high_outlier_count: high_count,
        lower_bound,
        upper_bound,
        sample_count: samples.len(),
        method,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plateau_with_spike() -> Vec<f64> {
        let mut samples: Vec<f64> = (0..50).map(|i| 100.0 + (i % 5) as f64).collect();
        samples.push(1000.0);
        samples
    }

    #[test]
    fn test_no_outliers() {
        let samples = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let result = detect_outliers(&samples, OutlierMethod::default()).unwrap();

        assert!(result.outlier_indices.is_empty());
        assert_eq!(result.sample_count, 5);
    }

    #[test]
    fn test_sigma_flags_spike_with_index() {
        let samples = plateau_with_spike();
        let result = detect_outliers(&samples, OutlierMethod::default()).unwrap();

        assert_eq!(result.outlier_indices, vec![50]);
        assert_eq!(result.high_outlier_count, 1);
        assert_eq!(result.low_outlier_count, 0);
    }

    #[test]
    fn test_iqr_flags_spike() {
        let samples = plateau_with_spike();
        let result = detect_outliers(&samples, OutlierMethod::Iqr { k: 1.5 }).unwrap();

        assert_eq!(result.outlier_count(), 1);
        assert!(result.upper_bound < 1000.0);
    }

    #[test]
    fn test_count_outliers_is_strict() {
        // Exactly on the fence is not an outlier
        assert_eq!(count_outliers(&[7.0, 13.0, 10.0], 10.0, 1.0, 3.0), 0);
        assert_eq!(count_outliers(&[6.9, 13.1, 10.0], 10.0, 1.0, 3.0), 2);
    }

    #[test]
    fn test_outlier_percentage() {
        let samples = plateau_with_spike();
        let result = detect_outliers(&samples, OutlierMethod::default()).unwrap();

        // 1 out of 51
        assert!((result.outlier_percentage() - 100.0 / 51.0).abs() < 1e-9);
        assert!(result.is_noisy(1.0));
        assert!(!result.is_noisy(5.0));
    }

    #[test]
    fn test_constant_sample_has_no_outliers() {
        let result = detect_outliers(&[5.0; 20], OutlierMethod::default()).unwrap();
        assert_eq!(result.outlier_count(), 0);
    }

    #[test]
    fn test_inexact_constant_has_no_outliers() {
        let result = detect_outliers(&[0.1; 1000], OutlierMethod::default()).unwrap();
        assert_eq!(result.outlier_count(), 0);
        assert_eq!(result.lower_bound, 0.1);
        assert_eq!(result.upper_bound, 0.1);

        let moments = Moments::compute(&[1234.567; 1000]).unwrap();
        let sigma = sigma_analysis(&[1234.567; 1000], &moments, 3.0);
        assert_eq!(sigma.outlier_count(), 0);

        // Zero spread with a mean that does not match the samples
        assert_eq!(count_outliers(&[0.1; 10], 0.09999999999999999, 0.0, 3.0), 0);
    }

    #[test]
    fn test_invalid_threshold() {
        assert_eq!(
            detect_outliers(&[1.0, 2.0], OutlierMethod::Sigma { threshold: 0.0 }),
            Err(StatsError::InvalidThreshold(0.0))
        );
    }

    #[test]
    fn test_sigma_needs_two_samples() {
        assert!(matches!(
            detect_outliers(&[1.0], OutlierMethod::default()),
            Err(StatsError::NotEnoughSamples { .. })
        ));
    }
}
