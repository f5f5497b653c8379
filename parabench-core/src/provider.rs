//! Provider Session
//!
//! Some operation libraries need process-wide initialisation before any
//! context is created and teardown after the last one is gone. A
//! [`ProviderSession`] is acquired once before all configurations run and
//! tears the provider down when dropped, on every exit path.

use crate::error::{HarnessError, OperationError};
use tracing::debug;

/// Process-wide setup and teardown for an operation library
pub trait Provider {
    /// Name used in logs and errors
    fn name(&self) -> &str;

    /// Initialise the library. Called once per session.
    fn initialize(&self) -> Result<(), OperationError>;

    /// Release the library. Called once, when the session ends.
    fn teardown(&self);
}

/// RAII guard for an initialised provider
#[must_use = "the provider is torn down as soon as the session is dropped"]
pub struct ProviderSession<'a, P: Provider + ?Sized> {
    provider: &'a P,
}

impl<'a, P: Provider + ?Sized> ProviderSession<'a, P> {
    /// Initialise `provider` and hold it until the session is dropped
    pub fn open(provider: &'a P) -> Result<Self, HarnessError> {
        provider
            .initialize()
            .map_err(|source| HarnessError::Provider {
                provider: provider.name().to_string(),
                source,
            })?;
        debug!(provider = provider.name(), "provider initialised");
        Ok(Self { provider })
    }

    /// The provider this session holds
    pub fn provider(&self) -> &P {
        self.provider
    }
}

impl<P: Provider + ?Sized> Drop for ProviderSession<'_, P> {
    fn drop(&mut self) {
        self.provider.teardown();
        debug!(provider = self.provider.name(), "provider torn down");
    }
}

/// Provider for operations that need no global setup
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProvider;

impl Provider for NoopProvider {
    fn name(&self) -> &str {
        "none"
    }

    fn initialize(&self) -> Result<(), OperationError> {
        Ok(())
    }

    fn teardown(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Recording {
        inits: AtomicUsize,
        teardowns: AtomicUsize,
        fail: bool,
    }

    impl Provider for Recording {
        fn name(&self) -> &str {
            "recording"
        }

        fn initialize(&self) -> Result<(), OperationError> {
            self.inits.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(OperationError::new("library missing"))
            } else {
                Ok(())
            }
        }

        fn teardown(&self) {
            self.teardowns.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_teardown_on_drop() {
        let provider = Recording::default();
        {
            let session = ProviderSession::open(&provider).unwrap();
            assert_eq!(session.provider().inits.load(Ordering::SeqCst), 1);
            assert_eq!(provider.teardowns.load(Ordering::SeqCst), 0);
        }
        assert_eq!(provider.teardowns.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_init_skips_teardown() {
        let provider = Recording {
            fail: true,
            ..Recording::default()
        };
        let err = ProviderSession::open(&provider).err().unwrap();
        assert!(matches!(err, HarnessError::Provider { .. }));
        assert_eq!(provider.teardowns.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_teardown_on_early_return() {
        fn run(provider: &Recording) -> Result<(), HarnessError> {
            let _session = ProviderSession::open(provider)?;
            Err(HarnessError::Cancelled)
        }

        let provider = Recording::default();
        assert!(run(&provider).is_err());
        assert_eq!(provider.teardowns.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dyn_provider() {
        let provider: &dyn Provider = &NoopProvider;
        let session = ProviderSession::open(provider).unwrap();
        assert_eq!(session.provider().name(), "none");
    }
}
