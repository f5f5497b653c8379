//! Jarque–Bera normality test
//!
//! `JB = (n/6) · (S² + K²/4)`, asymptotically χ²(2) under normality.
//! S and K are the bias-corrected skewness and excess kurtosis from
//! [`crate::Moments`]; for large `n` the difference from raw-moment inputs is
//! negligible (correction factors ≈ 1 + O(1/n)).

use crate::error::StatsError;
use crate::moments::Moments;
use serde::{Deserialize, Serialize};

/// 95th percentile of χ²(2): reject normality at α = 0.05 above this
pub const JB_CRITICAL_005: f64 = 5.991;

/// Outcome of a Jarque–Bera test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalityTest {
    /// JB statistic
    pub statistic: f64,
    /// Critical value the statistic was compared against
    pub critical_value: f64,
    /// `statistic <= critical_value`
    pub is_normal: bool,
}

impl NormalityTest {
    /// Evaluate the test from precomputed moments
    pub fn from_moments(moments: &Moments) -> Self {
        Self::from_statistic(jarque_bera(
            moments.n,
            moments.skewness,
            moments.excess_kurtosis,
        ))
    }

    /// Compare a JB statistic against the 5% critical value.
    ///
    /// A statistic equal to the critical value still counts as normal.
    pub fn from_statistic(statistic: f64) -> Self {
        Self {
            statistic,
            critical_value: JB_CRITICAL_005,
            is_normal: statistic <= JB_CRITICAL_005,
        }
    }
}

/// Jarque–Bera statistic from sample size, skewness and excess kurtosis
pub fn jarque_bera(n: usize, skewness: f64, excess_kurtosis: f64) -> f64 {
    (n as f64 / 6.0) * (skewness * skewness + (excess_kurtosis * excess_kurtosis) / 4.0)
}

/// Run the Jarque–Bera test on raw samples. Requires `n >= 4`.
pub fn test_normality(samples: &[f64]) -> Result<NormalityTest, StatsError> {
    Ok(NormalityTest::from_moments(&Moments::compute(samples)?))
}
