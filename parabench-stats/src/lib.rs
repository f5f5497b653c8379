#![warn(missing_docs)]
//! Parabench Statistical Engine
//!
//! Pure functions over an already-collected sequence of trial measurements:
//! - Mean and Bessel-corrected sample standard deviation
//! - Percentiles via linear interpolation between nearest ranks
//! - Bias-corrected skewness and excess kurtosis
//! - Jarque–Bera normality test at α = 0.05
//! - Outlier detection (sigma fences or IQR fences)
//!
//! Every function states the minimum sample count its formula needs and
//! returns [`StatsError`] below it instead of producing NaN.

mod error;
mod moments;
mod normality;
mod outliers;
mod percentiles;
mod summary;

pub use error::StatsError;
pub use moments::{Moments, coefficient_of_variation, excess_kurtosis, mean, skewness, std_dev};
pub use normality::{JB_CRITICAL_005, NormalityTest, jarque_bera, test_normality};
pub use outliers::{OutlierAnalysis, OutlierMethod, count_outliers, detect_outliers};
pub use percentiles::{
    Percentiles, compute_percentile, compute_percentiles, percentile, sort_samples,
};
pub use summary::{
    MIN_SAMPLES_FOR_ANALYSIS, OUTLIER_THRESHOLD_PCT, OutlierGrade, OverallGrade,
    RecommendedSummary, SkewShape, Stability, TailShape, TrialStatistics,
    compute_trial_statistics,
};

/// Default sigma multiplier for outlier fences
pub const DEFAULT_OUTLIER_SIGMA: f64 = 3.0;
