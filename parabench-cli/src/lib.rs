#![warn(missing_docs)]
//! Parabench CLI Library
//!
//! Command-line driver for the parabench harness. Measures built-in
//! synthetic operations with the core runners and prints a human-readable
//! or JSON report.
//!
//! ```text
//! parabench scaling --op spin:1000 --op checksum:256 --workers 1,2,4,8
//! parabench trials --op sleep:100us --trials 500
//! parabench compare --op checksum:4096 --workers 4 --tasks 1000
//! parabench init > parabench.toml
//! ```

mod config;
mod executor;
mod ops;

pub use config::*;
pub use executor::{
    build_report_meta, compute_statistics, format_human_output, run_comparison_suite,
    run_scaling_suite, run_trial_suite,
};
pub use ops::{ChecksumOperation, ChecksumTask, OpSpec, SleepOperation, SpinOperation};

use anyhow::Context;
use clap::{Parser, Subcommand};
use parabench_core::{NoopProvider, ProviderSession, Workload};
use parabench_report::{
    ComparisonReport, OutputFormat, Report, ScalingReport, TrialReport, generate_json_report,
};
use rayon::ThreadPoolBuilder;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// Parabench CLI arguments
#[derive(Parser, Debug)]
#[command(name = "parabench")]
#[command(author, version, about = "Parabench - throughput and scaling harness")]
pub struct Cli {
    /// What to measure
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (default: discover parabench.toml upwards)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format: json, human (default: from config)
    #[arg(long, global = true)]
    pub format: Option<String>,

    /// Output file (stdout if not specified)
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Number of threads for parallel statistics computation
    /// 0 = use all available cores (default), 1 = single-threaded
    #[arg(long, short = 'j', default_value = "0", global = true)]
    pub threads: usize,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Measure throughput across worker counts
    Scaling {
        /// Operation to measure (repeatable): spin:<rounds>, sleep:<duration>, checksum:<bytes>
        #[arg(long = "op", required = true)]
        ops: Vec<OpSpec>,
        /// Worker counts, comma-separated
        #[arg(long, value_delimiter = ',')]
        workers: Option<Vec<usize>>,
        /// Timed invocations per worker
        #[arg(long)]
        iterations: Option<u64>,
        /// Share this many tasks through a work pool instead of per-worker iterations
        #[arg(long, conflicts_with = "iterations")]
        tasks: Option<usize>,
        /// Untimed invocations per worker before the barrier
        #[arg(long)]
        warmup: Option<u64>,
        /// Pin worker i to CPU i mod ncpu (Linux only)
        #[arg(long)]
        pin: bool,
    },
    /// Collect per-trial throughput samples and analyse their distribution
    Trials {
        /// Operation to measure (repeatable)
        #[arg(long = "op", required = true)]
        ops: Vec<OpSpec>,
        /// Number of trials
        #[arg(long)]
        trials: Option<usize>,
        /// Invocations per trial
        #[arg(long)]
        iterations: Option<u64>,
        /// Untimed invocations before the first trial
        #[arg(long)]
        warmup: Option<u64>,
    },
    /// Compare a pooled concurrent run against the same tasks run sequentially
    Compare {
        /// Operation to measure (repeatable)
        #[arg(long = "op", required = true)]
        ops: Vec<OpSpec>,
        /// Workers for the concurrent run
        #[arg(long)]
        workers: Option<usize>,
        /// Tasks executed by each run
        #[arg(long)]
        tasks: Option<usize>,
        /// Untimed invocations before each run
        #[arg(long)]
        warmup: Option<u64>,
    },
    /// Print a default parabench.toml
    Init,
}

/// Run the Parabench CLI with the process arguments.
///
/// # Returns
/// Returns `Ok(())` on success, or an error if any run could not be set up.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the Parabench CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    // Initialize logging (stderr keeps stdout clean for reports)
    let filter = if cli.verbose {
        "parabench=debug"
    } else {
        "parabench=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Init = cli.command {
        print!("{}", ParabenchConfig::default_toml());
        return Ok(());
    }

    // Explicit --config must load; otherwise discover (CLI flags override)
    let config = match &cli.config {
        Some(path) => ParabenchConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ParabenchConfig::discover().unwrap_or_default(),
    };

    let format_str = cli.format.as_deref().unwrap_or(&config.output.format);
    let format: OutputFormat = format_str.parse().unwrap_or_else(|e| {
        warn!("{}; falling back to human output", e);
        OutputFormat::Human
    });

    // Configure Rayon thread pool for statistics computation
    if cli.threads > 0 {
        ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .ok();
    }

    let _session = ProviderSession::open(&NoopProvider)?;
    let start_time = Instant::now();
    let mut report = Report::new(build_report_meta());

    match &cli.command {
        Commands::Scaling {
            ops,
            workers,
            iterations,
            tasks,
            warmup,
            pin,
        } => {
            let mut scaling = config.scaling_config();
            if let Some(workers) = workers {
                scaling.worker_counts = workers.clone();
            }
            if let Some(tasks) = tasks {
                scaling.workload = Workload::Pooled { tasks: *tasks };
            } else if let Some(iterations) = iterations {
                scaling.workload = Workload::PerWorker {
                    iterations: *iterations,
                };
            }
            if let Some(warmup) = warmup {
                scaling.warmup_iterations = *warmup;
            }
            scaling.pin_workers |= *pin;

            info!(
                operations = ops.len(),
                workers = ?scaling.worker_counts,
                "measuring scaling curves"
            );
            let curves = run_scaling_suite(ops, &scaling)?;
            report.scaling = curves.iter().map(ScalingReport::from).collect();
        }
        Commands::Trials {
            ops,
            trials,
            iterations,
            warmup,
        } => {
            let mut trial_config = config.trial_config();
            if let Some(trials) = trials {
                trial_config.trials = *trials;
            }
            if let Some(iterations) = iterations {
                trial_config.iterations_per_trial = *iterations;
            }
            if let Some(warmup) = warmup {
                trial_config.warmup_iterations = *warmup;
            }

            info!(
                operations = ops.len(),
                trials = trial_config.trials,
                iterations = trial_config.iterations_per_trial,
                "running statistical trials"
            );
            let runs = run_trial_suite(ops, &trial_config)?;
            let stats = compute_statistics(&runs);
            for (run, stats) in runs.iter().zip(stats) {
                let stats = stats
                    .with_context(|| format!("statistics for {} failed", run.operation))?;
                report.trials.push(TrialReport::new(run, &stats));
            }
        }
        Commands::Compare {
            ops,
            workers,
            tasks,
            warmup,
        } => {
            let mut comparison = config.comparison_config();
            if let Some(workers) = workers {
                comparison.workers = *workers;
            }
            if let Some(tasks) = tasks {
                comparison.tasks = *tasks;
            }
            if let Some(warmup) = warmup {
                comparison.warmup_iterations = *warmup;
            }

            let comparisons = run_comparison_suite(ops, &comparison)?;
            report.comparisons = comparisons.iter().map(ComparisonReport::from).collect();
        }
        Commands::Init => {}
    }

    info!(
        total_ms = start_time.elapsed().as_secs_f64() * 1000.0,
        "all runs complete"
    );

    // Generate output
    let output = match format {
        OutputFormat::Json => generate_json_report(&report)?,
        OutputFormat::Human => format_human_output(&report),
    };

    // Write output
    if let Some(ref path) = cli.output {
        let mut file = std::fs::File::create(path)?;
        file.write_all(output.as_bytes())?;
        println!("Report written to: {}", path.display());
    } else {
        print!("{}", output);
    }

    let failed = report.total_failed_operations();
    if failed > 0 {
        warn!(failed, "timed operations failed (still counted in throughput)");
    }

    Ok(())
}
