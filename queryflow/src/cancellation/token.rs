//! Cancellation token for cooperative query cancellation.

use crate::errors::{QueryError, QueryResult};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

/// A callback type for cancellation notifications.
pub type CancelCallback = Box<dyn Fn() + Send + Sync>;

/// A token a caller flips to stop runners that are draining their inner
/// sequence.
///
/// Runners only observe the token between pulls, so a pull that is already
/// in flight completes before cancellation takes effect. Cancellation is
/// idempotent and only the first reason is kept.
#[derive(Default)]
pub struct CancellationToken {
    cancelled: AtomicBool,
    reason: RwLock<Option<String>>,
    callbacks: RwLock<Vec<CancelCallback>>,
}

impl CancellationToken {
    /// Creates a new cancellation token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation with a reason.
    ///
    /// Callbacks run on the first call only. A panicking callback is logged
    /// and does not stop the others.
    pub fn cancel(&self, reason: impl Into<String>) {
        if self
            .cancelled
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }

        let reason = reason.into();
        tracing::debug!(reason = %reason, "Query cancellation requested");
        *self.reason.write() = Some(reason);

        for callback in self.callbacks.read().iter() {
            invoke(callback.as_ref());
        }
    }

    /// Registers a callback to be invoked on cancellation.
    ///
    /// If the token is already cancelled, the callback runs immediately.
    pub fn on_cancel<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        if self.is_cancelled() {
            invoke(&callback);
        } else {
            self.callbacks.write().push(Box::new(callback));
        }
    }

    /// Returns whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns the cancellation reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        self.reason.read().clone()
    }

    /// Returns `Err(QueryError::Cancelled)` once the token has been cancelled.
    ///
    /// # Errors
    ///
    /// Returns the cancellation error carrying the first recorded reason.
    pub fn check(&self) -> QueryResult<()> {
        if self.is_cancelled() {
            return Err(QueryError::cancelled(self.reason().unwrap_or_default()));
        }
        Ok(())
    }
}

fn invoke(callback: &(dyn Fn() + Send + Sync)) {
    if let Err(e) = std::panic::catch_unwind(std::panic::AssertUnwindSafe(callback)) {
        warn!("Cancellation callback panicked: {:?}", e);
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .field("reason", &self.reason())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    #[test]
    fn test_token_default_not_cancelled() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        assert!(token.reason().is_none());
        assert!(token.check().is_ok());
    }

    #[test]
    fn test_token_cancel_first_reason_wins() {
        let token = CancellationToken::new();
        token.cancel("deadline exceeded");
        token.cancel("client disconnected");

        assert!(token.is_cancelled());
        assert_eq!(token.reason(), Some("deadline exceeded".to_string()));
        assert_eq!(
            token.check(),
            Err(QueryError::cancelled("deadline exceeded"))
        );
    }

    #[test]
    fn test_on_cancel_runs_once() {
        let token = CancellationToken::new();
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        token.on_cancel(move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        token.cancel("a");
        token.cancel("b");
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_on_cancel_after_cancellation_runs_immediately() {
        let token = CancellationToken::new();
        token.cancel("done");

        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();
        token.on_cancel(move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_panicking_callback_is_suppressed() {
        let token = CancellationToken::new();
        token.on_cancel(|| {
            panic!("Intentional panic");
        });

        token.cancel("test");
        assert!(token.is_cancelled());
    }
}
