//! Operation Capability
//!
//! The unit of work the harness times. An operation is shared by reference
//! across all workers (`Sync`); per-thread mutable state lives in a
//! [`Operation::Context`] that is created, used and dropped on a single
//! worker thread, so it need not be `Send`. Task descriptors move between
//! the coordinator and workers and must be `Send`.

use crate::error::OperationError;

/// Externally supplied timed operation
pub trait Operation: Sync {
    /// Per-worker state (e.g. a library handle that is not thread-safe)
    type Context;
    /// One task's inputs and output buffers, sized before the timed section
    type Task: Send;

    /// Short name used in logs and reports
    fn name(&self) -> &str;

    /// Build one worker's private context. Called once per worker, on that
    /// worker's thread, outside the timed section.
    fn new_context(&self) -> Result<Self::Context, OperationError>;

    /// Build the descriptor for task `index`. Never called inside a timed
    /// section.
    fn prepare_task(&self, index: usize) -> Result<Self::Task, OperationError>;

    /// Run the operation once
    fn execute(&self, ctx: &mut Self::Context, task: &mut Self::Task)
    -> Result<(), OperationError>;
}

/// Stateless operation built from a closure
pub struct FnOperation<F> {
    name: String,
    f: F,
}

impl<F> FnOperation<F>
where
    F: Fn() -> Result<(), OperationError> + Sync,
{
    /// Wrap `f` as an operation named `name`
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Operation for FnOperation<F>
where
    F: Fn() -> Result<(), OperationError> + Sync,
{
    type Context = ();
    type Task = ();

    fn name(&self) -> &str {
        &self.name
    }

    fn new_context(&self) -> Result<(), OperationError> {
        Ok(())
    }

    fn prepare_task(&self, _index: usize) -> Result<(), OperationError> {
        Ok(())
    }

    fn execute(&self, _ctx: &mut (), _task: &mut ()) -> Result<(), OperationError> {
        (self.f)()
    }
}

/// Shorthand for [`FnOperation::new`]
pub fn from_fn<F>(name: impl Into<String>, f: F) -> FnOperation<F>
where
    F: Fn() -> Result<(), OperationError> + Sync,
{
    FnOperation::new(name, f)
}
