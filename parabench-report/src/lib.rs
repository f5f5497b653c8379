//! Parabench Report - Result Surface
//!
//! Serializable views of scaling curves, trial statistics and
//! concurrent-vs-sequential comparisons, plus JSON generation.

mod json;
mod report;

pub use json::generate_json_report;
pub use report::{
    ComparisonReport, DistributionVerdicts, MeasurementReport, Report, ReportMeta, SCHEMA_VERSION,
    ScalingPointReport, ScalingReport, StatisticsReport, SystemInfo, TrialReport,
};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON with full schema
    Json,
    /// Human-readable terminal output
    Human,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "human" | "text" => Ok(OutputFormat::Human),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}
