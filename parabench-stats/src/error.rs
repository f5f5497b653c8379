//! Statistics precondition errors

use thiserror::Error;

/// Errors raised when a statistic's preconditions are violated
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    /// Fewer samples than the formula requires
    #[error("{statistic} needs at least {min} samples, got {got}")]
    NotEnoughSamples {
        /// Name of the statistic being computed
        statistic: &'static str,
        /// Samples supplied
        got: usize,
        /// Minimum required
        min: usize,
    },

    /// Percentile outside [0, 100]
    #[error("invalid percentile {0} (must be between 0 and 100)")]
    InvalidPercentile(f64),

    /// Input to an order statistic was not sorted ascending
    #[error("samples must be sorted in ascending order")]
    Unsorted,

    /// A sample is NaN or infinite
    #[error("sample {index} is not finite ({value})")]
    NonFinite {
        /// Position of the offending sample
        index: usize,
        /// The offending value
        value: f64,
    },

    /// Fence multiplier must be positive and finite
    #[error("invalid outlier threshold {0}")]
    InvalidThreshold(f64),
}

impl StatsError {
    pub(crate) fn require(statistic: &'static str, got: usize, min: usize) -> Result<(), Self> {
        if got < min {
            Err(StatsError::NotEnoughSamples {
                statistic,
                got,
                min,
            })
        } else {
            Ok(())
        }
    }

    pub(crate) fn require_finite(samples: &[f64]) -> Result<(), Self> {
        match samples.iter().position(|x| !x.is_finite()) {
            Some(index) => Err(StatsError::NonFinite {
                index,
                value: samples[index],
            }),
            None => Ok(()),
        }
    }
}
