//! Settle-once completion handles.
//!
//! A [`Deferred`] is the producer side handed to an extension; every
//! [`CompletionHandle`] obtained from it observes the same single outcome.
//! Settling consumes the `Deferred`, so a handle can never settle twice.

use std::fmt;

use serde_json::Value;
use tokio::sync::watch;

use crate::error::ExtensionError;

/// Final outcome of a completion handle.
#[derive(Debug, Clone, PartialEq)]
pub enum Settlement {
    /// Settled successfully with a payload.
    Fulfilled(Value),
    /// Settled with a failure payload.
    Rejected(Value),
}

impl Settlement {
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Self::Fulfilled(_))
    }

    /// The payload carried by either outcome.
    pub fn payload(&self) -> &Value {
        match self {
            Self::Fulfilled(value) | Self::Rejected(value) => value,
        }
    }

    fn into_result(self) -> Result<Value, ExtensionError> {
        match self {
            Self::Fulfilled(value) => Ok(value),
            Self::Rejected(reason) => Err(ExtensionError::Rejected(reason)),
        }
    }
}

/// Producer side of a completion handle.
///
/// Dropping a `Deferred` without calling [`resolve`](Self::resolve) or
/// [`reject`](Self::reject) settles every observer with
/// [`ExtensionError::Abandoned`].
pub struct Deferred {
    tx: watch::Sender<Option<Settlement>>,
}

impl Deferred {
    /// Create a new, unsettled deferred.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self { tx }
    }

    /// Create a deferred together with its first observer.
    pub fn with_handle() -> (Self, CompletionHandle) {
        let deferred = Self::new();
        let handle = deferred.handle();
        (deferred, handle)
    }

    /// Get an observer for this deferred.
    pub fn handle(&self) -> CompletionHandle {
        CompletionHandle {
            rx: self.tx.subscribe(),
        }
    }

    /// Fulfill the handle with a payload.
    pub fn resolve(self, value: impl Into<Value>) {
        self.settle(Settlement::Fulfilled(value.into()));
    }

    /// Reject the handle with a failure payload.
    pub fn reject(self, reason: impl Into<Value>) {
        self.settle(Settlement::Rejected(reason.into()));
    }

    /// Settle the handle with an already-built outcome.
    pub fn settle(self, settlement: Settlement) {
        // send_replace stores the value even when no observer is subscribed yet.
        self.tx.send_replace(Some(settlement));
    }
}

impl Default for Deferred {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Deferred {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred")
            .field("observers", &self.tx.receiver_count())
            .finish()
    }
}

/// Observer side of a completion handle. Cheap to clone.
#[derive(Clone)]
pub struct CompletionHandle {
    rx: watch::Receiver<Option<Settlement>>,
}

impl CompletionHandle {
    /// A handle that is already fulfilled with `value`.
    pub fn fulfilled(value: impl Into<Value>) -> Self {
        let (deferred, handle) = Deferred::with_handle();
        deferred.resolve(value);
        handle
    }

    /// A handle that is already rejected with `reason`.
    pub fn rejected(reason: impl Into<Value>) -> Self {
        let (deferred, handle) = Deferred::with_handle();
        deferred.reject(reason);
        handle
    }

    /// Wait for the handle to settle.
    ///
    /// Returns the fulfillment payload, [`ExtensionError::Rejected`] with the
    /// rejection payload, or [`ExtensionError::Abandoned`] when the producer
    /// was dropped unsettled. Any number of callers may wait concurrently.
    pub async fn wait(&self) -> Result<Value, ExtensionError> {
        let mut rx = self.rx.clone();
        let settlement = match rx.wait_for(Option::is_some).await {
            Ok(slot) => slot.clone(),
            Err(_) => None,
        };
        settlement
            .ok_or(ExtensionError::Abandoned)
            .and_then(Settlement::into_result)
    }

    /// Whether the producer has settled this handle.
    pub fn is_settled(&self) -> bool {
        self.rx.borrow().is_some()
    }

    /// Current outcome without waiting.
    pub fn peek(&self) -> Option<Settlement> {
        self.rx.borrow().clone()
    }

    /// Whether the producer was dropped without settling.
    pub fn is_abandoned(&self) -> bool {
        !self.is_settled() && self.rx.has_changed().is_err()
    }
}

impl fmt::Debug for CompletionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionHandle")
            .field("settlement", &self.peek())
            .finish()
    }
}

#[cfg(test)]
#[path = "handle_tests.rs"]
mod tests;
