//! Moments
//!
//! Mean, Bessel-corrected standard deviation and the bias-corrected third
//! and fourth standardized moments ("adjusted Fisher–Pearson" forms).
//!
//! Minimum sample counts:
//! - mean: 1
//! - standard deviation: 2
//! - skewness: 3
//! - excess kurtosis: 4
//!
//! A constant sample has undefined z-scores; skewness and kurtosis are
//! reported as 0 in that case. Constancy is detected on the samples
//! themselves, so values like 0.1 whose sum rounds still give an SD of
//! exactly 0.

use crate::error::StatsError;

/// First four moments of a sample, computed in one pass over the data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    /// Number of samples
    pub n: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Sample standard deviation (n − 1 denominator)
    pub std_dev: f64,
    /// Bias-corrected skewness G1
    pub skewness: f64,
    /// Bias-corrected excess kurtosis G2
    pub excess_kurtosis: f64,
}

impl Moments {
    /// Compute all moments. Requires `n >= 4` and finite samples.
    pub fn compute(samples: &[f64]) -> Result<Self, StatsError> {
        StatsError::require("excess kurtosis", samples.len(), 4)?;
        StatsError::require_finite(samples)?;

        let mean = raw_mean(samples);
        let std_dev = raw_std_dev(samples, mean);

        Ok(Self {
            n: samples.len(),
            mean,
            std_dev,
            skewness: raw_skewness(samples, mean, std_dev),
            excess_kurtosis: raw_kurtosis(samples, mean, std_dev),
        })
    }

    /// Coefficient of variation in percent
    pub fn coefficient_of_variation(&self) -> f64 {
        coefficient_of_variation(self.mean, self.std_dev)
    }
}

/// Arithmetic mean. Requires `n >= 1`.
pub fn mean(samples: &[f64]) -> Result<f64, StatsError> {
    StatsError::require("mean", samples.len(), 1)?;
    StatsError::require_finite(samples)?;
    Ok(raw_mean(samples))
}

/// Bessel-corrected sample standard deviation. Requires `n >= 2`.
///
/// The sum of squared deviations is divided by `n − 1`: trials are a sample
/// from the population of all possible runs.
pub fn std_dev(samples: &[f64]) -> Result<f64, StatsError> {
    StatsError::require("standard deviation", samples.len(), 2)?;
    StatsError::require_finite(samples)?;
    Ok(raw_std_dev(samples, raw_mean(samples)))
}

/// Bias-corrected skewness `G1 = n / ((n−1)(n−2)) · Σ zᵢ³`. Requires `n >= 3`.
pub fn skewness(samples: &[f64]) -> Result<f64, StatsError> {
    StatsError::require("skewness", samples.len(), 3)?;
    StatsError::require_finite(samples)?;
    let mean = raw_mean(samples);
    Ok(raw_skewness(samples, mean, raw_std_dev(samples, mean)))
}

/// Bias-corrected excess kurtosis. Requires `n >= 4`.
///
/// `G2 = n(n+1) / ((n−1)(n−2)(n−3)) · Σ zᵢ⁴ − 3(n−1)² / ((n−2)(n−3))`
pub fn excess_kurtosis(samples: &[f64]) -> Result<f64, StatsError> {
    StatsError::require("excess kurtosis", samples.len(), 4)?;
    StatsError::require_finite(samples)?;
    let mean = raw_mean(samples);
    Ok(raw_kurtosis(samples, mean, raw_std_dev(samples, mean)))
}

/// Relative standard deviation in percent (0 when the mean is not positive)
pub fn coefficient_of_variation(mean: f64, std_dev: f64) -> f64 {
    if mean > 0.0 {
        (std_dev / mean) * 100.0
    } else {
        0.0
    }
}

/// True when every sample equals the first one
pub(crate) fn is_constant(samples: &[f64]) -> bool {
    match samples.split_first() {
        Some((first, rest)) => rest.iter().all(|x| x == first),
        None => true,
    }
}

pub(crate) fn raw_mean(samples: &[f64]) -> f64 {
    if is_constant(samples) {
        return samples.first().copied().unwrap_or(0.0);
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

pub(crate) fn raw_std_dev(samples: &[f64], mean: f64) -> f64 {
    if is_constant(samples) {
        return 0.0;
    }
    let sum_sq: f64 = samples.iter().map(|x| (x - mean).powi(2)).sum();
    (sum_sq / (samples.len() - 1) as f64).sqrt()
}

fn raw_skewness(samples: &[f64], mean: f64, sd: f64) -> f64 {
    if sd == 0.0 {
        return 0.0;
    }
    let n = samples.len() as f64;
    let sum: f64 = samples.iter().map(|x| ((x - mean) / sd).powi(3)).sum();
    n / ((n - 1.0) * (n - 2.0)) * sum
}

fn raw_kurtosis(samples: &[f64], mean: f64, sd: f64) -> f64 {
    if sd == 0.0 {
        return 0.0;
    }
    let n = samples.len() as f64;
    let sum: f64 = samples.iter().map(|x| ((x - mean) / sd).powi(4)).sum();
    let (nm1, nm2, nm3) = (n - 1.0, n - 2.0, n - 3.0);
    let term1 = (n * (n + 1.0)) / (nm1 * nm2 * nm3) * sum;
    let term2 = (3.0 * nm1 * nm1) / (nm2 * nm3);
    term1 - term2
}
