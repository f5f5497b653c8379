//! Run Executor
//!
//! Drives the core runners for every requested operation and turns the
//! results into a [`Report`](parabench_report::Report).
//!
//! ## Pipeline Overview
//!
//! ```text
//! OpSpec (--op, repeatable)
//!       │
//!       ▼
//! ┌─────────────┐
//! │  execution  │  Scaling curves, trial runs, comparisons
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │ statistics  │  Trial statistics (parallel)
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │ formatting  │  Human-readable output
//! └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`execution`] - Runs operations one configuration at a time
//! - [`statistics`] - Parallel statistics computation
//! - [`formatting`] - Human-readable output formatting
//! - [`metadata`] - System metadata collection

mod execution;
mod formatting;
mod metadata;
mod statistics;

pub use execution::{run_comparison_suite, run_scaling_suite, run_trial_suite};
pub use formatting::format_human_output;
pub use metadata::build_report_meta;
pub use statistics::compute_statistics;
