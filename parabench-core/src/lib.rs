#![warn(missing_docs)]
//! Parabench Core - Worker Runtime
//!
//! This crate provides the execution environment for throughput runs:
//! - `RendezvousBarrier`, a reusable and cancellable barrier
//! - `WorkPool` for dynamic task distribution
//! - The timed phase protocol (warm-up, barrier, timed section, drain, join)
//! - Trial runner, scaling curve and concurrent-vs-sequential comparison
//! - High-precision timing and optional CPU pinning

mod barrier;
mod error;
mod measure;
mod operation;
mod outputs;
mod phase;
mod pool;
mod provider;
mod scaling;
mod trials;

pub use barrier::{BarrierCancelled, BarrierWaitResult, RendezvousBarrier};
pub use error::{HarnessError, OperationError};
pub use measure::{HAS_TICK_COUNTER, Instant, available_cpus, pin_to_cpu};
pub use operation::{FnOperation, Operation, from_fn};
pub use outputs::{LengthSummary, summarize_lengths};
pub use phase::{
    Phase, PhaseConfig, PhaseRun, RunMeasurement, Workload, run_phase, run_phase_with_tasks,
    run_sequential, sanity_check,
};
pub use pool::WorkPool;
pub use provider::{NoopProvider, Provider, ProviderSession};
pub use scaling::{
    ComparisonConfig, ConcurrencyComparison, DEFAULT_WORKER_COUNTS, ScalingConfig, ScalingCurve,
    ScalingPoint, compare_concurrent_sequential, derive_scaling, run_scaling, run_scaling_with,
};
pub use trials::{TrialConfig, TrialRun, run_trials};
