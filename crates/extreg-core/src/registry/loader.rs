//! Extension initialization and the aggregate `ready` handle.

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::{try_join_all, BoxFuture, FutureExt};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use extreg_protocols::error::ExtensionError;
use extreg_protocols::extension::{CompletionHandle, Deferred, LoadMessage};

use super::{Registry, RegistryConfig};

type Outcome = Result<Value, Value>;

impl<B> Registry<B>
where
    B: Send + Sync + 'static,
{
    /// Initialize every extension in `config` against its base object.
    ///
    /// The aggregate handle is published before any extension runs and is
    /// also returned. It fulfills with the payloads of all registered handles
    /// once every one of them has fulfilled, and rejects with the first
    /// rejection. Extensions still running at that point are left alone and
    /// keep recording messages.
    ///
    /// With no extensions the aggregate handle stays pending, unless
    /// `empty_is_ready` is set. Calling `init` again replaces the published
    /// handle.
    ///
    /// # Errors
    ///
    /// Returns [`ExtensionError::InvalidConfig`] without touching any state
    /// when the config is invalid or no tokio runtime is running.
    pub fn init(&self, config: RegistryConfig<B>) -> Result<CompletionHandle, ExtensionError> {
        let runtime = Handle::try_current()
            .map_err(|e| ExtensionError::InvalidConfig(format!("no tokio runtime: {e}")))?;
        let base_object = config.validate()?;
        let extensions = config.extensions;

        let (ready, ready_handle) = Deferred::with_handle();
        *self.ready.write() = Some(ready_handle.clone());
        *self.parked_ready.lock() = None;

        info!(count = extensions.len(), "Initializing extensions");

        let mut recorders = Vec::with_capacity(extensions.len());
        for extension in &extensions {
            let name = extension.name().to_string();
            let (deferred, handle) = Deferred::with_handle();

            extension.clone_box().init(Arc::clone(&base_object), deferred);
            self.register(&name, handle.clone())?;

            let task = runtime.spawn(record_outcome(
                name.clone(),
                handle,
                Arc::clone(&self.messages),
            ));
            recorders.push((name, task));
        }

        let is_empty = extensions.is_empty();
        *self.base_object.write() = Some(base_object);
        *self.extensions.write() = extensions;

        if is_empty {
            if self.settings().empty_is_ready {
                debug!("No extensions, ready fulfilled immediately");
                ready.resolve(Value::Array(Vec::new()));
            } else {
                debug!("No extensions, ready stays pending");
                *self.parked_ready.lock() = Some(ready);
            }
            return Ok(ready_handle);
        }

        let waits = self.aggregate_waits(recorders);
        runtime.spawn(async move {
            match try_join_all(waits).await {
                Ok(payloads) => {
                    info!(count = payloads.len(), "All extensions ready");
                    ready.resolve(Value::Array(payloads));
                }
                Err(reason) => {
                    warn!(%reason, "Extensions not ready");
                    ready.reject(reason);
                }
            }
        });

        Ok(ready_handle)
    }

    /// One future per registered handle.
    ///
    /// Extensions from this init are followed through their recorder task, so
    /// their message is in place before the aggregate settles. Handles
    /// registered by other means are followed directly.
    fn aggregate_waits(
        &self,
        recorders: Vec<(String, JoinHandle<Outcome>)>,
    ) -> Vec<BoxFuture<'static, Outcome>> {
        let own: HashSet<String> = recorders.iter().map(|(name, _)| name.clone()).collect();

        let mut waits: Vec<BoxFuture<'static, Outcome>> = recorders
            .into_iter()
            .map(|(name, task)| {
                async move {
                    match task.await {
                        Ok(outcome) => outcome.map_err(|reason| rejection(&name, reason)),
                        Err(e) => Err(rejection(&name, Value::String(e.to_string()))),
                    }
                }
                .boxed()
            })
            .collect();

        for entry in self.promises.iter() {
            if own.contains(entry.key()) {
                continue;
            }
            let name = entry.key().clone();
            let handle = entry.value().clone();
            waits.push(
                async move {
                    handle
                        .wait()
                        .await
                        .map_err(|e| rejection(&name, e.into_payload()))
                }
                .boxed(),
            );
        }

        waits
    }
}

/// Follow one extension's handle and append its load message.
async fn record_outcome(
    name: String,
    handle: CompletionHandle,
    messages: Arc<Mutex<Vec<LoadMessage>>>,
) -> Outcome {
    match handle.wait().await {
        Ok(data) => {
            info!(extension = %name, "Extension loaded");
            messages.lock().push(LoadMessage::loaded(&name, data.clone()));
            Ok(data)
        }
        Err(e) => {
            let data = e.into_payload();
            warn!(extension = %name, reason = %data, "Extension failed to load");
            messages.lock().push(LoadMessage::failed(&name, data.clone()));
            Err(data)
        }
    }
}

fn rejection(name: &str, reason: Value) -> Value {
    json!({ "extension": name, "reason": reason })
}
