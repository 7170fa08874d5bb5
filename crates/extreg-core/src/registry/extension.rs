//! Extension registry: completion handles by name and readiness lookups.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use tokio::sync::Notify;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

use extreg_config::RegistrySettings;
use extreg_protocols::error::ExtensionError;
use extreg_protocols::extension::{CompletionHandle, Deferred, Extension, LoadMessage};

/// Registry coordinating extension initialization.
///
/// Construct one per application (or per test), share it by reference or
/// `Arc`, then call [`init`](Self::init) with the base object and extensions.
pub struct Registry<B>
where
    B: Send + Sync + 'static,
{
    pub(super) base_object: RwLock<Option<Arc<B>>>,
    pub(super) extensions: RwLock<Vec<Box<dyn Extension<B>>>>,
    pub(super) promises: DashMap<String, CompletionHandle>,
    pub(super) messages: Arc<Mutex<Vec<LoadMessage>>>,
    pub(super) ready: RwLock<Option<CompletionHandle>>,
    /// Producer of an aggregate handle that is never settled (empty init).
    pub(super) parked_ready: Mutex<Option<Deferred>>,
    settings: RwLock<RegistrySettings>,
    registered: Notify,
}

impl<B> Registry<B>
where
    B: Send + Sync + 'static,
{
    /// Create a registry with default settings.
    pub fn new() -> Self {
        Self::with_settings(RegistrySettings::default())
    }

    /// Create a registry with explicit settings.
    pub fn with_settings(settings: RegistrySettings) -> Self {
        Self {
            base_object: RwLock::new(None),
            extensions: RwLock::new(Vec::new()),
            promises: DashMap::new(),
            messages: Arc::new(Mutex::new(Vec::new())),
            ready: RwLock::new(None),
            parked_ready: Mutex::new(None),
            settings: RwLock::new(settings),
            registered: Notify::new(),
        }
    }

    /// Register a completion handle under `name`.
    ///
    /// Overwrites any handle already stored under the same name and wakes
    /// pending [`extension_ready`](Self::extension_ready) lookups. Fails only
    /// for an empty name.
    pub fn register(&self, name: &str, handle: CompletionHandle) -> Result<(), ExtensionError> {
        if name.is_empty() {
            return Err(ExtensionError::InvalidName(name.to_string()));
        }

        let replaced = self.promises.insert(name.to_string(), handle).is_some();
        debug!(extension = name, replaced, "Registered completion handle");
        self.registered.notify_waiters();
        Ok(())
    }

    /// Wait until the extension called `name` has registered and settled.
    ///
    /// An already registered handle is followed directly. Otherwise the lookup
    /// waits for the registration for at most `checks × check_interval`, then
    /// follows the handle it finds, rejections included. Gives up with
    /// [`ExtensionError::Timeout`] when nothing is registered in time, and with
    /// [`ExtensionError::InvalidName`] right away for an empty name.
    pub async fn extension_ready(&self, name: &str) -> Result<Value, ExtensionError> {
        if name.is_empty() {
            return Err(ExtensionError::InvalidName(name.to_string()));
        }

        if let Some(handle) = self.handle(name) {
            return handle.wait().await;
        }

        let budget = self.settings.read().lookup_budget();
        // A budget past the clock's range never expires.
        let deadline = Instant::now().checked_add(budget);
        debug!(extension = name, budget_ms = millis_ceil(budget), "Waiting for registration");

        loop {
            let notified = self.registered.notified();
            tokio::pin!(notified);
            // Enabled before the map check so a registration in between still wakes us.
            notified.as_mut().enable();

            if let Some(handle) = self.handle(name) {
                return handle.wait().await;
            }

            match deadline {
                Some(deadline) => {
                    if timeout_at(deadline, notified).await.is_err() {
                        warn!(extension = name, "Extension was never registered");
                        return Err(ExtensionError::Timeout {
                            name: name.to_string(),
                            waited_ms: millis_ceil(budget),
                        });
                    }
                }
                None => notified.await,
            }
        }
    }

    /// Aggregate handle published by the latest [`init`](Self::init).
    pub fn ready(&self) -> Option<CompletionHandle> {
        self.ready.read().clone()
    }

    /// Snapshot of the load messages recorded so far, in settlement order.
    pub fn messages(&self) -> Vec<LoadMessage> {
        self.messages.lock().clone()
    }

    /// Completion handle registered under `name`.
    pub fn handle(&self, name: &str) -> Option<CompletionHandle> {
        self.promises.get(name).map(|entry| entry.value().clone())
    }

    /// Names with a registered handle, sorted.
    pub fn registered_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.promises.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Names of the extensions passed to the latest init, in order.
    pub fn extension_names(&self) -> Vec<String> {
        self.extensions
            .read()
            .iter()
            .map(|e| e.name().to_string())
            .collect()
    }

    /// Base object passed to the latest init.
    pub fn base_object(&self) -> Option<Arc<B>> {
        self.base_object.read().clone()
    }

    pub fn settings(&self) -> RegistrySettings {
        self.settings.read().clone()
    }

    /// Set the number of readiness checks used by later lookups.
    pub fn set_checks(&self, checks: u32) {
        self.settings.write().checks = checks;
    }

    /// Set the readiness check period used by later lookups.
    ///
    /// Stored in whole milliseconds, rounded up, so a non-zero interval never
    /// collapses to zero.
    pub fn set_check_interval(&self, interval: Duration) {
        self.settings.write().check_interval_ms = millis_ceil(interval);
    }
}

/// Whole milliseconds in `duration`, rounded up and capped at `u64::MAX`.
fn millis_ceil(duration: Duration) -> u64 {
    let partial = u128::from(duration.subsec_nanos() % 1_000_000 != 0);
    u64::try_from(duration.as_millis() + partial).unwrap_or(u64::MAX)
}

impl<B> Default for Registry<B>
where
    B: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "extension_tests.rs"]
mod tests;
