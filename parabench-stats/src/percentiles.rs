//! Percentile Computation
//!
//! Linear interpolation between nearest ranks ("linear" quantile convention):
//! rank `r = (p/100)·(n−1)`, interpolate between `floor(r)` and `floor(r)+1`
//! by the fractional part of `r`, clamping to the last element when the upper
//! rank falls off the end.

use crate::error::StatsError;
use serde::{Deserialize, Serialize};

/// Standard percentiles reported for a trial run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    /// 5th percentile
    pub p5: f64,
    /// 25th percentile (Q1)
    pub p25: f64,
    /// 50th percentile (median)
    pub p50: f64,
    /// 75th percentile (Q3)
    pub p75: f64,
    /// 95th percentile
    pub p95: f64,
    /// 99th percentile
    pub p99: f64,
}

impl Percentiles {
    /// Interquartile range (p75 − p25)
    pub fn iqr(&self) -> f64 {
        self.p75 - self.p25
    }
}

/// Percentile of an ascending-sorted sample.
///
/// Requires `n >= 1`, `0 <= p <= 100` and `sorted` in ascending order.
///
/// # Examples
///
/// ```
/// # use parabench_stats::percentile;
/// let median = percentile(&[1.0, 2.0, 3.0, 4.0], 50.0).unwrap();
/// assert_eq!(median, 2.5);
/// ```
pub fn percentile(sorted: &[f64], p: f64) -> Result<f64, StatsError> {
    StatsError::require("percentile", sorted.len(), 1)?;
    if !(0.0..=100.0).contains(&p) {
        return Err(StatsError::InvalidPercentile(p));
    }
    if !sorted.is_sorted_by(|a, b| a <= b) {
        return Err(StatsError::Unsorted);
    }
    Ok(interpolate(sorted, p))
}

/// Percentile of an unsorted sample (sorts a copy first)
pub fn compute_percentile(samples: &[f64], p: f64) -> Result<f64, StatsError> {
    StatsError::require_finite(samples)?;
    percentile(&sort_samples(samples), p)
}

/// Compute all standard percentiles from an ascending-sorted sample
pub fn compute_percentiles(sorted: &[f64]) -> Result<Percentiles, StatsError> {
    // Validate once; the remaining lookups cannot fail
    let p5 = percentile(sorted, 5.0)?;
    Ok(Percentiles {
        p5,
        p25: interpolate(sorted, 25.0),
        p50: interpolate(sorted, 50.0),
        p75: interpolate(sorted, 75.0),
        p95: interpolate(sorted, 95.0),
        p99: interpolate(sorted, 99.0),
    })
}

/// Ascending copy of `samples` (total order, NaN sorts last)
pub fn sort_samples(samples: &[f64]) -> Vec<f64> {
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

fn interpolate(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    let rank = (p / 100.0) * (n - 1) as f64;
    let lo = rank as usize;
    let hi = lo + 1;
    if hi >= n {
        return sorted[n - 1];
    }
    let fraction = rank - lo as f64;
    sorted[lo] + fraction * (sorted[hi] - sorted[lo])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_interpolates() {
        let p50 = percentile(&[1.0, 2.0, 3.0, 4.0], 50.0).unwrap();
        assert_eq!(p50, 2.5);
    }

    #[test]
    fn test_median_odd() {
        let p50 = percentile(&[1.0, 2.0, 3.0, 4.0, 5.0], 50.0).unwrap();
        assert!((p50 - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_quartiles() {
        let samples: Vec<f64> = (1..=100).map(|x| x as f64).collect();
        // rank 0.25 · 99 = 24.75 → 25 + 0.75
        assert!((percentile(&samples, 25.0).unwrap() - 25.75).abs() < 1e-12);
        assert!((percentile(&samples, 75.0).unwrap() - 75.25).abs() < 1e-12);
    }

    #[test]
    fn test_bounds_clamp_to_extremes() {
        let samples = [3.0, 5.0, 9.0];
        assert_eq!(percentile(&samples, 0.0).unwrap(), 3.0);
        assert_eq!(percentile(&samples, 100.0).unwrap(), 9.0);
    }

    #[test]
    fn test_single_sample() {
        assert_eq!(percentile(&[42.0], 99.0).unwrap(), 42.0);
    }

    #[test]
    fn test_preconditions() {
        assert!(matches!(
            percentile(&[], 50.0),
            Err(StatsError::NotEnoughSamples { .. })
        ));
        assert_eq!(
            percentile(&[1.0, 2.0], 101.0),
            Err(StatsError::InvalidPercentile(101.0))
        );
        assert_eq!(percentile(&[2.0, 1.0], 50.0), Err(StatsError::Unsorted));
    }

    #[test]
    fn test_unsorted_entry_point_sorts() {
        let p50 = compute_percentile(&[4.0, 1.0, 3.0, 2.0], 50.0).unwrap();
        assert_eq!(p50, 2.5);
    }

    #[test]
    fn test_compute_all_percentiles() {
        let sorted: Vec<f64> = (1..=1000).map(|x| x as f64).collect();
        let p = compute_percentiles(&sorted).unwrap();

        assert!(p.p5 > 49.0 && p.p5 < 52.0);
        assert!((p.p50 - 500.5).abs() < 1e-9);
        assert!(p.p99 > 989.0 && p.p99 < 992.0);
        assert!((p.iqr() - 499.5).abs() < 1e-9);
    }
}
