//! Statistics Computation
//!
//! Each trial run's samples are independent, so statistics for several
//! operations are computed in parallel with Rayon.

use parabench_core::TrialRun;
use parabench_stats::{StatsError, TrialStatistics};
use rayon::prelude::*;

/// Compute statistics for every trial run (parallelized with Rayon)
///
/// Results keep the order of `runs`. A run with too few samples yields its
/// [`StatsError`] instead of a record.
pub fn compute_statistics(runs: &[TrialRun]) -> Vec<Result<TrialStatistics, StatsError>> {
    runs.par_iter().map(TrialRun::statistics).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use parabench_core::TrialConfig;

    fn run(samples: Vec<f64>) -> TrialRun {
        TrialRun {
            operation: "op".to_string(),
            samples,
            failed_operations: 0,
            warmup_failures: 0,
            config: TrialConfig::default(),
        }
    }

    #[test]
    fn test_order_and_errors_preserved() {
        let runs = vec![
            run(vec![10.0, 11.0, 12.0, 13.0, 14.0]),
            run(vec![1.0, 2.0]),
            run(vec![5.0; 8]),
        ];
        let stats = compute_statistics(&runs);

        assert_eq!(stats.len(), 3);
        assert_eq!(stats[0].as_ref().unwrap().median(), 12.0);
        assert!(matches!(stats[1], Err(StatsError::NotEnoughSamples { .. })));
        assert_eq!(stats[2].as_ref().unwrap().std_dev, 0.0);
    }
}
