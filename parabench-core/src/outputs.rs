//! Task output inspection

use serde::{Deserialize, Serialize};

/// Spread of variable-length task outputs (e.g. signature sizes)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LengthSummary {
    /// Number of outputs
    pub count: usize,
    /// Shortest output in bytes
    pub min: usize,
    /// Longest output in bytes
    pub max: usize,
    /// Mean length
    pub mean: f64,
    /// Population standard deviation (every output is observed)
    pub std_dev: f64,
}

/// Summarise output lengths; `None` for an empty set
pub fn summarize_lengths<I>(lengths: I) -> Option<LengthSummary>
where
    I: IntoIterator<Item = usize>,
{
    let lengths: Vec<usize> = lengths.into_iter().collect();
    let min = *lengths.iter().min()?;
    let max = *lengths.iter().max()?;

    let n = lengths.len() as f64;
    let mean = lengths.iter().map(|&l| l as f64).sum::<f64>() / n;
    let variance = lengths
        .iter()
        .map(|&l| (l as f64 - mean).powi(2))
        .sum::<f64>()
        / n;

    Some(LengthSummary {
        count: lengths.len(),
        min,
        max,
        mean,
        std_dev: variance.sqrt(),
    })
}
