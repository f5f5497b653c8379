//! Harness and operation errors

use parabench_stats::StatsError;
use std::any::Any;
use thiserror::Error;

/// Failure reported by an [`Operation`](crate::Operation) invocation or setup step
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct OperationError {
    message: String,
}

impl OperationError {
    /// Create an error with a human-readable message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Convert a caught panic payload into an error
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            format!("panicked: {s}")
        } else if let Some(s) = payload.downcast_ref::<String>() {
            format!("panicked: {s}")
        } else {
            "panicked: unknown payload".to_string()
        };
        Self { message }
    }

    /// Error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Setup failures that abort a run.
///
/// Operation failures during warm-up or timed sections never surface here;
/// they are counted in the run's measurement.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Configuration rejected before any thread was spawned
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The OS refused to create a worker thread
    #[error("failed to spawn worker {worker}: {source}")]
    Spawn {
        /// Index of the worker that could not be created
        worker: usize,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// A worker could not build its per-thread context
    #[error("worker {worker} failed to create its context: {source}")]
    ContextInit {
        /// Index of the failing worker
        worker: usize,
        /// Error returned by the operation
        #[source]
        source: OperationError,
    },

    /// A task descriptor could not be prepared
    #[error("failed to prepare task {index}: {source}")]
    TaskSetup {
        /// Task index
        index: usize,
        /// Error returned by the operation
        #[source]
        source: OperationError,
    },

    /// The single pre-run invocation failed
    #[error("sanity check for '{operation}' failed: {source}")]
    SanityCheck {
        /// Operation name
        operation: String,
        /// Error returned by the operation
        #[source]
        source: OperationError,
    },

    /// A worker thread panicked outside an operation invocation
    #[error("worker {worker} panicked")]
    WorkerPanicked {
        /// Index of the worker
        worker: usize,
    },

    /// The run was torn down because another participant failed
    #[error("run cancelled before the timed section")]
    Cancelled,

    /// Provider initialisation failed
    #[error("provider '{provider}' failed to initialise: {source}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error returned by the provider
        #[source]
        source: OperationError,
    },

    /// Collected samples could not be summarised
    #[error(transparent)]
    Stats(#[from] StatsError),
}

impl HarnessError {
    /// Whether this error only reflects another participant's failure
    pub fn is_cancellation(&self) -> bool {
        matches!(self, HarnessError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload_of(f: fn()) -> Box<dyn Any + Send> {
        std::panic::catch_unwind(f).unwrap_err()
    }

    #[test]
    fn test_panic_payload_message() {
        let err = OperationError::from_panic(payload_of(|| panic!("boom")));
        assert_eq!(err.message(), "panicked: boom");

        let err = OperationError::from_panic(payload_of(|| panic!("{}", String::from("owned"))));
        assert_eq!(err.message(), "panicked: owned");
    }

    #[test]
    fn test_error_display() {
        let err = HarnessError::ContextInit {
            worker: 3,
            source: OperationError::new("no key material"),
        };
        assert_eq!(
            err.to_string(),
            "worker 3 failed to create its context: no key material"
        );
        assert!(!err.is_cancellation());
        assert!(HarnessError::Cancelled.is_cancellation());
    }
}
