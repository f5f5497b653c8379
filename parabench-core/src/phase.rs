//! Timed Phase Protocol
//!
//! One parameterised run of an operation on `W` worker threads:
//!
//! ```text
//! SPAWNED ─▶ WARMUP ─▶ BARRIER_WAIT ─▶ TIMED ─▶ DRAINED ─▶ JOINED
//!   W threads   untimed    W workers +     t_start      t_end
//!               private    coordinator     recorded     recorded
//!               buffers    (capacity W+1)  on release
//! ```
//!
//! The coordinator takes part in the barrier, so `t_start` is recorded only
//! after every worker has finished warm-up and no thread-creation cost falls
//! inside the timed window. In the pooled form workers drain a shared
//! [`WorkPool`] and `t_end` is taken when the pool signals completion; in the
//! per-worker form every worker runs a fixed private iteration count and
//! `t_end` is taken after joining them.
//!
//! Nothing inside the timed window logs or allocates on any participating
//! thread. Operation failures and panics are counted, never propagated.
//! Setup failures (spawn, context creation, task preparation) cancel the
//! barrier so every participant exits, and surface as [`HarnessError`].

use crate::barrier::RendezvousBarrier;
use crate::error::{HarnessError, OperationError};
use crate::measure::{Instant, available_cpus, pin_to_cpu};
use crate::operation::Operation;
use crate::pool::WorkPool;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::thread::{self, ScopedJoinHandle};
use std::time::Duration;
use tracing::{debug, trace};

/// Lifecycle states of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Worker threads created
    Spawned,
    /// Untimed invocations on private buffers
    Warmup,
    /// Rendezvous of all workers and the coordinator
    BarrierWait,
    /// Measured section
    Timed,
    /// All timed work finished, `t_end` recorded
    Drained,
    /// Workers joined, per-run resources released
    Joined,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Spawned => "spawned",
            Phase::Warmup => "warmup",
            Phase::BarrierWait => "barrier_wait",
            Phase::Timed => "timed",
            Phase::Drained => "drained",
            Phase::Joined => "joined",
        };
        f.write_str(name)
    }
}

/// How timed work is distributed across workers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Workload {
    /// `tasks` descriptors shared through a work pool, each executed once
    Pooled {
        /// Number of task descriptors
        tasks: usize,
    },
    /// Every worker executes `iterations` invocations on its private task
    PerWorker {
        /// Invocations per worker
        iterations: u64,
    },
}

impl Workload {
    /// Operations executed in the timed section by `workers` workers
    /// (saturates at `u64::MAX`)
    pub fn total_operations(&self, workers: usize) -> u64 {
        match *self {
            Workload::Pooled { tasks } => tasks as u64,
            Workload::PerWorker { iterations } => iterations.saturating_mul(workers as u64),
        }
    }
}

/// Parameters for one run of the phase protocol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseConfig {
    /// Number of worker threads
    pub workers: usize,
    /// Untimed invocations per worker before the barrier
    pub warmup_iterations: u64,
    /// Timed work
    pub workload: Workload,
    /// Pin worker `i` to CPU `i mod ncpu` (Linux only, best effort)
    pub pin_workers: bool,
    /// Run one invocation on the calling thread before spawning anything
    pub sanity_check: bool,
}

impl PhaseConfig {
    /// `workers` threads draining `tasks` pooled descriptors
    pub fn pooled(workers: usize, tasks: usize) -> Self {
        Self {
            workers,
            warmup_iterations: 0,
            workload: Workload::Pooled { tasks },
            pin_workers: false,
            sanity_check: false,
        }
    }

    /// `workers` threads running `iterations` private invocations each
    pub fn per_worker(workers: usize, iterations: u64) -> Self {
        Self {
            workers,
            warmup_iterations: 0,
            workload: Workload::PerWorker { iterations },
            pin_workers: false,
            sanity_check: false,
        }
    }

    /// Set the per-worker warm-up count
    pub fn with_warmup(mut self, iterations: u64) -> Self {
        self.warmup_iterations = iterations;
        self
    }

    /// Enable or disable CPU pinning
    pub fn with_pinning(mut self, pin: bool) -> Self {
        self.pin_workers = pin;
        self
    }

    /// Enable or disable the pre-run sanity check
    pub fn with_sanity_check(mut self, check: bool) -> Self {
        self.sanity_check = check;
        self
    }

    /// Reject configurations that cannot produce a measurement
    pub fn validate(&self) -> Result<(), HarnessError> {
        if self.workers == 0 {
            return Err(HarnessError::InvalidConfig(
                "at least one worker is required".to_string(),
            ));
        }
        match self.workload {
            Workload::Pooled { tasks: 0 } => Err(HarnessError::InvalidConfig(
                "pooled workload needs at least one task".to_string(),
            )),
            Workload::PerWorker { iterations: 0 } => Err(HarnessError::InvalidConfig(
                "per-worker workload needs at least one iteration".to_string(),
            )),
            Workload::PerWorker { iterations }
                if iterations.checked_mul(self.workers as u64).is_none() =>
            {
                Err(HarnessError::InvalidConfig(format!(
                    "{} iterations on {} workers overflows the operation count",
                    iterations, self.workers
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Outcome of one timed section
#[derive(Debug, Clone, PartialEq)]
pub struct RunMeasurement {
    /// Worker threads that took part (1 for a sequential run)
    pub workers: usize,
    /// Warm-up invocations per worker
    pub warmup_iterations: u64,
    /// Operations attempted inside the timed section
    pub total_operations: u64,
    /// Timed operations that returned an error or panicked
    pub failed_operations: u64,
    /// Warm-up operations that returned an error or panicked
    pub warmup_failures: u64,
    /// `t_end − t_start`
    pub elapsed: Duration,
    /// Same interval in hardware ticks (0 without a tick counter)
    pub ticks: u64,
}

impl RunMeasurement {
    /// Timed section length in seconds
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Timed section length in milliseconds
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1e3
    }

    /// Operations per second (0 for an empty interval)
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed_secs();
        if secs > 0.0 {
            self.total_operations as f64 / secs
        } else {
            0.0
        }
    }

    /// Mean wall-clock time per operation in milliseconds
    pub fn avg_latency_ms(&self) -> f64 {
        if self.total_operations == 0 {
            return 0.0;
        }
        self.elapsed_ms() / self.total_operations as f64
    }

    /// Timed operations that succeeded
    pub fn successful_operations(&self) -> u64 {
        self.total_operations - self.failed_operations
    }
}

/// A measurement together with the task descriptors it ran over
#[derive(Debug)]
pub struct PhaseRun<T> {
    /// Timing and failure counts
    pub measurement: RunMeasurement,
    /// Task descriptors in index order, outputs included (empty for the
    /// per-worker form)
    pub tasks: Vec<T>,
}

#[derive(Debug, Default, Clone, Copy)]
struct WorkerTally {
    completed: u64,
    failed: u64,
    warmup_failures: u64,
}

impl WorkerTally {
    #[inline(always)]
    fn record(&mut self, ok: bool) {
        if ok {
            self.completed += 1;
        } else {
            self.failed += 1;
        }
    }
}

/// Cancels the barrier if a worker unwinds so nobody waits for it forever
struct CancelOnUnwind<'a>(&'a RendezvousBarrier);

impl Drop for CancelOnUnwind<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.cancel();
        }
    }
}

/// Run the phase protocol and return its measurement
pub fn run_phase<O: Operation>(
    op: &O,
    config: &PhaseConfig,
) -> Result<RunMeasurement, HarnessError> {
    run_phase_with_tasks(op, config).map(|run| run.measurement)
}

/// Run the phase protocol and also return the pooled task descriptors
pub fn run_phase_with_tasks<O: Operation>(
    op: &O,
    config: &PhaseConfig,
) -> Result<PhaseRun<O::Task>, HarnessError> {
    config.validate()?;
    if config.sanity_check {
        sanity_check(op)?;
    }

    let tasks = match config.workload {
        Workload::Pooled { tasks } => prepare_tasks(op, tasks)?,
        Workload::PerWorker { .. } => Vec::new(),
    };
    let pool = WorkPool::new(tasks);
    let barrier = RendezvousBarrier::new(config.workers + 1);

    debug!(
        operation = op.name(),
        workers = config.workers,
        warmup = config.warmup_iterations,
        phase = %Phase::Spawned,
        "starting run"
    );

    // Filled by the joins; reserved up front so the per-worker `t_end`
    // does not wait on an allocation
    let mut tallies: Vec<WorkerTally> = Vec::with_capacity(config.workers);

    let (start, end) = thread::scope(|scope| -> Result<_, HarnessError> {
        let mut handles = Vec::with_capacity(config.workers);
        for worker in 0..config.workers {
            let (barrier, pool) = (&barrier, &pool);
            let spawned = thread::Builder::new()
                .name(format!("parabench-worker-{worker}"))
                .spawn_scoped(scope, move || worker_main(op, worker, config, barrier, pool));
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(source) => {
                    barrier.cancel();
                    let _ = join_workers(handles, &mut tallies);
                    return Err(HarnessError::Spawn { worker, source });
                }
            }
        }

        trace!(phase = %Phase::BarrierWait, "coordinator waiting for workers");
        if barrier.wait().is_err() {
            // A worker failed before the barrier and reports the cause
            return Err(join_workers(handles, &mut tallies)
                .err()
                .unwrap_or(HarnessError::Cancelled));
        }
        let start = Instant::now();

        match config.workload {
            Workload::Pooled { .. } => {
                pool.wait_all();
                let end = Instant::now();
                join_workers(handles, &mut tallies)?;
                Ok((start, end))
            }
            Workload::PerWorker { .. } => {
                let joined = join_workers(handles, &mut tallies);
                let end = Instant::now();
                joined?;
                Ok((start, end))
            }
        }
    })?;

    let measurement = RunMeasurement {
        workers: config.workers,
        warmup_iterations: config.warmup_iterations,
        total_operations: tallies.iter().map(|t| t.completed + t.failed).sum(),
        failed_operations: tallies.iter().map(|t| t.failed).sum(),
        warmup_failures: tallies.iter().map(|t| t.warmup_failures).sum(),
        elapsed: end.duration_since(start),
        ticks: end.ticks_since(start),
    };

    debug!(
        operation = op.name(),
        workers = measurement.workers,
        elapsed_ms = measurement.elapsed_ms(),
        throughput = measurement.throughput(),
        failed = measurement.failed_operations,
        phase = %Phase::Joined,
        "run complete"
    );

    Ok(PhaseRun {
        measurement,
        tasks: pool.into_tasks(),
    })
}

fn worker_main<O: Operation>(
    op: &O,
    worker: usize,
    config: &PhaseConfig,
    barrier: &RendezvousBarrier,
    pool: &WorkPool<O::Task>,
) -> Result<WorkerTally, HarnessError> {
    let _unwind = CancelOnUnwind(barrier);

    if config.pin_workers {
        let _ = pin_to_cpu(worker % available_cpus());
    }

    trace!(worker, phase = %Phase::Warmup, "building context");
    let mut ctx = match op.new_context() {
        Ok(ctx) => ctx,
        Err(source) => {
            barrier.cancel();
            return Err(HarnessError::ContextInit { worker, source });
        }
    };

    let needs_private = matches!(config.workload, Workload::PerWorker { .. })
        || config.warmup_iterations > 0;
    let mut private = if needs_private {
        match op.prepare_task(worker) {
            Ok(task) => Some(task),
            Err(source) => {
                barrier.cancel();
                return Err(HarnessError::TaskSetup {
                    index: worker,
                    source,
                });
            }
        }
    } else {
        None
    };

    let mut tally = WorkerTally::default();
    if let Some(task) = private.as_mut() {
        for _ in 0..config.warmup_iterations {
            if !invoke(op, &mut ctx, task) {
                tally.warmup_failures += 1;
            }
        }
    }

    if barrier.wait().is_err() {
        return Err(HarnessError::Cancelled);
    }

    match config.workload {
        Workload::Pooled { .. } => {
            pool.drain(|_, task| tally.record(invoke(op, &mut ctx, task)));
        }
        Workload::PerWorker { iterations } => {
            if let Some(task) = private.as_mut() {
                for _ in 0..iterations {
                    tally.record(invoke(op, &mut ctx, task));
                }
            }
        }
    }

    Ok(tally)
}

/// Join every worker, pushing tallies into `tallies`. The first real
/// failure wins over cancellations it caused in other workers.
///
/// `tallies` must already hold capacity for every handle; joining does not
/// allocate.
fn join_workers(
    handles: Vec<ScopedJoinHandle<'_, Result<WorkerTally, HarnessError>>>,
    tallies: &mut Vec<WorkerTally>,
) -> Result<(), HarnessError> {
    let mut failure: Option<HarnessError> = None;

    for (worker, handle) in handles.into_iter().enumerate() {
        let outcome = handle
            .join()
            .unwrap_or(Err(HarnessError::WorkerPanicked { worker }));
        match outcome {
            Ok(tally) => tallies.push(tally),
            Err(err) => {
                let replace = match &failure {
                    None => true,
                    Some(existing) => existing.is_cancellation() && !err.is_cancellation(),
                };
                if replace {
                    failure = Some(err);
                }
            }
        }
    }

    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// One invocation; `false` if the operation failed or panicked
#[inline]
pub(crate) fn invoke<O: Operation>(op: &O, ctx: &mut O::Context, task: &mut O::Task) -> bool {
    let outcome = catch_unwind(AssertUnwindSafe(|| op.execute(ctx, task)));
    matches!(std::hint::black_box(outcome), Ok(Ok(())))
}

pub(crate) fn prepare_tasks<O: Operation>(
    op: &O,
    count: usize,
) -> Result<Vec<O::Task>, HarnessError> {
    (0..count)
        .map(|index| {
            op.prepare_task(index)
                .map_err(|source| HarnessError::TaskSetup { index, source })
        })
        .collect()
}

/// Run a single invocation on the calling thread and fail loudly if it does
/// not succeed
pub fn sanity_check<O: Operation>(op: &O) -> Result<(), HarnessError> {
    let fail = |source: OperationError| HarnessError::SanityCheck {
        operation: op.name().to_string(),
        source,
    };

    let mut ctx = op.new_context().map_err(fail)?;
    let mut task = op.prepare_task(0).map_err(fail)?;
    match catch_unwind(AssertUnwindSafe(|| op.execute(&mut ctx, &mut task))) {
        Ok(result) => result.map_err(fail),
        Err(payload) => Err(fail(OperationError::from_panic(payload))),
    }
}

/// Execute `tasks` freshly prepared descriptors one after another on the
/// calling thread, after `warmup_iterations` untimed invocations
pub fn run_sequential<O: Operation>(
    op: &O,
    tasks: usize,
    warmup_iterations: u64,
) -> Result<PhaseRun<O::Task>, HarnessError> {
    if tasks == 0 {
        return Err(HarnessError::InvalidConfig(
            "sequential run needs at least one task".to_string(),
        ));
    }

    let mut ctx = op
        .new_context()
        .map_err(|source| HarnessError::ContextInit { worker: 0, source })?;
    let mut descriptors = prepare_tasks(op, tasks)?;

    let mut warmup_failures = 0;
    if warmup_iterations > 0 {
        let mut private = op
            .prepare_task(0)
            .map_err(|source| HarnessError::TaskSetup { index: 0, source })?;
        for _ in 0..warmup_iterations {
            if !invoke(op, &mut ctx, &mut private) {
                warmup_failures += 1;
            }
        }
    }

    let mut tally = WorkerTally::default();
    let start = Instant::now();
    for task in descriptors.iter_mut() {
        tally.record(invoke(op, &mut ctx, task));
    }
    let end = Instant::now();

    let measurement = RunMeasurement {
        workers: 1,
        warmup_iterations,
        total_operations: tasks as u64,
        failed_operations: tally.failed,
        warmup_failures,
        elapsed: end.duration_since(start),
        ticks: end.ticks_since(start),
    };
    debug!(
        operation = op.name(),
        elapsed_ms = measurement.elapsed_ms(),
        "sequential run complete"
    );

    Ok(PhaseRun {
        measurement,
        tasks: descriptors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::from_fn;
    use std::marker::PhantomData;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
    use std::thread::ThreadId;

    /// Counts invocations; each pooled task records how often it ran
    #[derive(Default)]
    struct Counting {
        invocations: AtomicU64,
    }

    impl Operation for Counting {
        type Context = ();
        type Task = u32;

        fn name(&self) -> &str {
            "counting"
        }

        fn new_context(&self) -> Result<(), OperationError> {
            Ok(())
        }

        fn prepare_task(&self, _index: usize) -> Result<u32, OperationError> {
            Ok(0)
        }

        fn execute(&self, _ctx: &mut (), task: &mut u32) -> Result<(), OperationError> {
            self.invocations.fetch_add(1, Ordering::Relaxed);
            *task += 1;
            Ok(())
        }
    }

    /// Context that is not `Send` and checks it dies on its own thread
    struct ThreadBound {
        owner: ThreadId,
        drops: &'static AtomicUsize,
        _not_send: PhantomData<*const ()>,
    }

    impl Drop for ThreadBound {
        fn drop(&mut self) {
            assert_eq!(self.owner, thread::current().id());
            self.drops.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct PerThreadContext {
        created: AtomicUsize,
        drops: &'static AtomicUsize,
        fail_on_context: Option<usize>,
    }

    impl Operation for PerThreadContext {
        type Context = ThreadBound;
        type Task = ();

        fn name(&self) -> &str {
            "per-thread"
        }

        fn new_context(&self) -> Result<ThreadBound, OperationError> {
            let n = self.created.fetch_add(1, Ordering::SeqCst);
            if self.fail_on_context == Some(n) {
                return Err(OperationError::new("context unavailable"));
            }
            Ok(ThreadBound {
                owner: thread::current().id(),
                drops: self.drops,
                _not_send: PhantomData,
            })
        }

        fn prepare_task(&self, _index: usize) -> Result<(), OperationError> {
            Ok(())
        }

        fn execute(&self, ctx: &mut ThreadBound, _task: &mut ()) -> Result<(), OperationError> {
            assert_eq!(ctx.owner, thread::current().id());
            Ok(())
        }
    }

    #[test]
    fn test_validate() {
        assert!(PhaseConfig::pooled(0, 10).validate().is_err());
        assert!(PhaseConfig::pooled(2, 0).validate().is_err());
        assert!(PhaseConfig::per_worker(2, 0).validate().is_err());
        assert!(PhaseConfig::pooled(8, 1).validate().is_ok());
    }

    #[test]
    fn test_operation_count_overflow() {
        let err = PhaseConfig::per_worker(4, u64::MAX).validate().unwrap_err();
        assert!(matches!(err, HarnessError::InvalidConfig(_)));
        assert!(PhaseConfig::per_worker(2, u64::MAX / 2).validate().is_ok());
        assert!(PhaseConfig::per_worker(1, u64::MAX).validate().is_ok());

        let workload = Workload::PerWorker {
            iterations: u64::MAX,
        };
        assert_eq!(workload.total_operations(4), u64::MAX);
        assert_eq!(workload.total_operations(1), u64::MAX);
        assert_eq!(Workload::PerWorker { iterations: 10 }.total_operations(3), 30);
    }

    #[test]
    fn test_join_fills_reserved_tallies() {
        let mut tallies: Vec<WorkerTally> = Vec::with_capacity(3);
        let reserved = tallies.as_ptr();

        thread::scope(|scope| {
            let handles: Vec<_> = (0..3u64)
                .map(|i| {
                    scope.spawn(move || {
                        Ok(WorkerTally {
                            completed: i,
                            ..WorkerTally::default()
                        })
                    })
                })
                .collect();
            join_workers(handles, &mut tallies).unwrap();
        });

        assert_eq!(tallies.len(), 3);
        assert_eq!(tallies.capacity(), 3);
        assert_eq!(tallies.as_ptr(), reserved);
        assert_eq!(tallies.iter().map(|t| t.completed).sum::<u64>(), 3);
    }

    #[test]
    fn test_join_reports_first_real_failure() {
        let mut tallies: Vec<WorkerTally> = Vec::with_capacity(3);

        let err = thread::scope(|scope| {
            let handles = vec![
                scope.spawn(|| Err(HarnessError::Cancelled)),
                scope.spawn(|| Ok(WorkerTally::default())),
                scope.spawn(|| {
                    Err(HarnessError::ContextInit {
                        worker: 2,
                        source: OperationError::new("no device"),
                    })
                }),
            ];
            join_workers(handles, &mut tallies).unwrap_err()
        });

        assert!(matches!(err, HarnessError::ContextInit { worker: 2, .. }));
        assert_eq!(tallies.len(), 1);
    }

    #[test]
    fn test_pooled_runs_every_task_once() {
        let op = Counting::default();
        let run = run_phase_with_tasks(&op, &PhaseConfig::pooled(4, 250)).unwrap();

        assert_eq!(run.measurement.total_operations, 250);
        assert_eq!(run.measurement.failed_operations, 0);
        assert_eq!(run.tasks.len(), 250);
        assert!(run.tasks.iter().all(|&n| n == 1));
    }

    #[test]
    fn test_warmup_is_untimed_work() {
        let op = Counting::default();
        let config = PhaseConfig::pooled(3, 30).with_warmup(10);
        let m = run_phase(&op, &config).unwrap();

        assert_eq!(m.total_operations, 30);
        assert_eq!(m.warmup_iterations, 10);
        assert_eq!(op.invocations.load(Ordering::Relaxed), 3 * 10 + 30);
    }

    #[test]
    fn test_per_worker_iterations() {
        let op = Counting::default();
        let config = PhaseConfig::per_worker(4, 500).with_warmup(5);
        let run = run_phase_with_tasks(&op, &config).unwrap();

        assert_eq!(run.measurement.total_operations, 2000);
        assert!(run.tasks.is_empty());
        assert_eq!(op.invocations.load(Ordering::Relaxed), 4 * 505);
    }

    #[test]
    fn test_more_workers_than_tasks() {
        let op = Counting::default();
        let run = run_phase_with_tasks(&op, &PhaseConfig::pooled(8, 3)).unwrap();
        assert_eq!(run.tasks, vec![1, 1, 1]);
    }

    #[test]
    fn test_one_context_per_worker_on_its_thread() {
        static DROPS: AtomicUsize = AtomicUsize::new(0);
        let op = PerThreadContext {
            created: AtomicUsize::new(0),
            drops: &DROPS,
            fail_on_context: None,
        };

        run_phase(&op, &PhaseConfig::pooled(5, 100).with_warmup(2)).unwrap();

        assert_eq!(op.created.load(Ordering::SeqCst), 5);
        assert_eq!(DROPS.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_context_failure_aborts_without_hanging() {
        static DROPS: AtomicUsize = AtomicUsize::new(0);
        let op = PerThreadContext {
            created: AtomicUsize::new(0),
            drops: &DROPS,
            fail_on_context: Some(2),
        };

        let err = run_phase(&op, &PhaseConfig::per_worker(4, 10)).unwrap_err();
        assert!(matches!(err, HarnessError::ContextInit { .. }));
        // Every context that was built has been dropped
        assert_eq!(DROPS.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_failures_are_counted_not_fatal() {
        let calls = AtomicU64::new(0);
        let op = from_fn("every-other", || {
            if calls.fetch_add(1, Ordering::Relaxed) % 2 == 0 {
                Ok(())
            } else {
                Err(OperationError::new("rejected"))
            }
        });

        let m = run_phase(&op, &PhaseConfig::per_worker(1, 100)).unwrap();
        assert_eq!(m.total_operations, 100);
        assert_eq!(m.failed_operations, 50);
        assert_eq!(m.successful_operations(), 50);
    }

    #[test]
    fn test_panics_are_counted() {
        let seen = Mutex::new(0u32);
        let op = from_fn("panics-once", || {
            let mut seen = seen.lock().unwrap_or_else(|e| e.into_inner());
            *seen += 1;
            if *seen == 7 {
                panic!("operation blew up");
            }
            Ok(())
        });

        let m = run_phase(&op, &PhaseConfig::pooled(2, 20)).unwrap();
        assert_eq!(m.total_operations, 20);
        assert_eq!(m.failed_operations, 1);
    }

    #[test]
    fn test_sanity_check_runs_before_spawning() {
        let calls = AtomicU64::new(0);
        let op = from_fn("broken", || {
            calls.fetch_add(1, Ordering::Relaxed);
            Err(OperationError::new("self-test failed"))
        });

        let config = PhaseConfig::pooled(4, 100).with_sanity_check(true);
        let err = run_phase(&op, &config).unwrap_err();

        assert!(matches!(err, HarnessError::SanityCheck { .. }));
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_sequential_run() {
        let op = Counting::default();
        let run = run_sequential(&op, 40, 5).unwrap();

        assert_eq!(run.measurement.workers, 1);
        assert_eq!(run.measurement.total_operations, 40);
        assert!(run.tasks.iter().all(|&n| n == 1));
        assert_eq!(op.invocations.load(Ordering::Relaxed), 45);
        assert!(run_sequential(&op, 0, 0).is_err());
    }

    #[test]
    fn test_measurement_derived_values() {
        let m = RunMeasurement {
            workers: 4,
            warmup_iterations: 0,
            total_operations: 100,
            failed_operations: 0,
            warmup_failures: 0,
            elapsed: Duration::from_millis(25),
            ticks: 0,
        };
        assert!((m.throughput() - 4000.0).abs() < 1e-6);
        assert!((m.avg_latency_ms() - 0.25).abs() < 1e-9);

        let empty = RunMeasurement {
            elapsed: Duration::ZERO,
            ..m
        };
        assert_eq!(empty.throughput(), 0.0);
    }

    #[test]
    fn test_phase_names() {
        assert_eq!(Phase::BarrierWait.to_string(), "barrier_wait");
        assert_eq!(Phase::Joined.to_string(), "joined");
    }
}
