//! Extension trait definition.

use std::fmt;
use std::sync::Arc;

use super::Deferred;

/// Core trait for all extensions.
///
/// An extension is a named unit of work that initializes itself against a
/// shared base object of type `B`. The registry calls [`init`](Self::init)
/// exactly once, on a fresh clone of the registered descriptor, and hands it
/// a [`Deferred`] which the extension must eventually settle. `init` returns
/// immediately; long-running work belongs in a spawned task that owns the
/// `Deferred`.
pub trait Extension<B>: ExtensionClone<B> + Send + Sync + 'static
where
    B: Send + Sync + 'static,
{
    /// Unique, non-empty extension name.
    fn name(&self) -> &str;

    /// Start initializing against `base`, settling `deferred` when done.
    fn init(&mut self, base: Arc<B>, deferred: Deferred);
}

/// Object-safe cloning for boxed extensions.
///
/// Implemented automatically for every `Extension` that is `Clone`.
pub trait ExtensionClone<B>
where
    B: Send + Sync + 'static,
{
    fn clone_box(&self) -> Box<dyn Extension<B>>;
}

impl<B, T> ExtensionClone<B> for T
where
    B: Send + Sync + 'static,
    T: Extension<B> + Clone,
{
    fn clone_box(&self) -> Box<dyn Extension<B>> {
        Box::new(self.clone())
    }
}

impl<B> Clone for Box<dyn Extension<B>>
where
    B: Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

type InitFn<B> = dyn Fn(Arc<B>, Deferred) + Send + Sync;

/// Closure-backed extension.
///
/// Handy for extensions whose whole state is captured by the closure.
pub struct FnExtension<B> {
    name: String,
    init: Arc<InitFn<B>>,
}

impl<B> FnExtension<B>
where
    B: Send + Sync + 'static,
{
    pub fn new<F>(name: impl Into<String>, init: F) -> Self
    where
        F: Fn(Arc<B>, Deferred) + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            init: Arc::new(init),
        }
    }
}

impl<B> Clone for FnExtension<B> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            init: Arc::clone(&self.init),
        }
    }
}

impl<B> fmt::Debug for FnExtension<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnExtension").field("name", &self.name).finish()
    }
}

impl<B> Extension<B> for FnExtension<B>
where
    B: Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&mut self, base: Arc<B>, deferred: Deferred) {
        (self.init)(base, deferred);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Clone)]
    struct Counting {
        name: String,
        calls: u32,
    }

    impl Extension<()> for Counting {
        fn name(&self) -> &str {
            &self.name
        }

        fn init(&mut self, _base: Arc<()>, deferred: Deferred) {
            self.calls += 1;
            deferred.resolve(self.calls);
        }
    }

    #[tokio::test]
    async fn test_fn_extension_runs_closure() {
        let mut ext = FnExtension::new("greeter", |base: Arc<String>, deferred: Deferred| {
            deferred.resolve(format!("hello {}", base));
        });
        assert_eq!(Extension::name(&ext), "greeter");

        let (deferred, handle) = Deferred::with_handle();
        ext.init(Arc::new("world".to_string()), deferred);
        assert_eq!(handle.wait().await.unwrap(), json!("hello world"));
    }

    #[test]
    fn test_clone_box_isolates_state() {
        let canonical: Box<dyn Extension<()>> = Box::new(Counting {
            name: "counter".to_string(),
            calls: 0,
        });

        let mut copy = canonical.clone();
        copy.init(Arc::new(()), Deferred::new());
        copy.init(Arc::new(()), Deferred::new());

        let mut fresh = canonical.clone_box();
        let (deferred, handle) = Deferred::with_handle();
        fresh.init(Arc::new(()), deferred);
        assert_eq!(handle.peek().unwrap().payload(), &json!(1));
        assert_eq!(canonical.name(), "counter");
    }
}
