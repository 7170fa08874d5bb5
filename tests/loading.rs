//! End-to-end loading scenarios through the public facade.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::json;

use extreg::{
    Deferred, Extension, ExtensionError, FnExtension, LoadMessage, MessageCode, Registry,
    RegistryConfig, registry_from_toml,
};

/// Shared application object the extensions attach to.
#[derive(Default)]
struct Host {
    attached: AtomicUsize,
}

/// Extension that attaches to the host and reports after a delay.
#[derive(Clone)]
struct Plugin {
    name: String,
    delay: Duration,
}

impl Plugin {
    fn new(name: &str, delay_ms: u64) -> Self {
        Self {
            name: name.to_string(),
            delay: Duration::from_millis(delay_ms),
        }
    }
}

impl Extension<Host> for Plugin {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&mut self, host: Arc<Host>, deferred: Deferred) {
        let delay = self.delay;
        let name = self.name.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let position = host.attached.fetch_add(1, Ordering::SeqCst);
            deferred.resolve(json!({ "plugin": name, "position": position }));
        });
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("extreg_core=debug")
        .try_init();
}

#[tokio::test]
async fn test_ok_and_failing_extension() {
    init_tracing();

    let registry = Registry::new();
    let config = RegistryConfig::new(Arc::new(Host::default()))
        .with_extension(FnExtension::new("A", |_host: Arc<Host>, deferred: Deferred| {
            deferred.resolve("ok");
        }))
        .with_extension(FnExtension::new("B", |_host: Arc<Host>, deferred: Deferred| {
            deferred.reject("boom");
        }));

    let ready = registry.init(config).unwrap();
    assert!(matches!(ready.wait().await, Err(ExtensionError::Rejected(_))));

    let a = registry.extension_ready("A").await.unwrap();
    assert_eq!(a, json!("ok"));

    let mut messages = Vec::new();
    for _ in 0..50 {
        messages = registry.messages();
        if messages.len() == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(messages.contains(&LoadMessage::loaded("A", json!("ok"))));
    assert!(messages.contains(&LoadMessage::failed("B", json!("boom"))));
}

#[tokio::test(start_paused = true)]
async fn test_plugins_settle_out_of_order() {
    init_tracing();

    let host = Arc::new(Host::default());
    let registry = Arc::new(Registry::new());
    let config = RegistryConfig::new(Arc::clone(&host))
        .with_extension(Plugin::new("slow", 300))
        .with_extension(Plugin::new("fast", 10));

    let ready = registry.init(config).unwrap();

    // A dependent waits on "fast" without touching "slow".
    let fast = registry.extension_ready("fast").await.unwrap();
    assert_eq!(fast["position"], json!(0));
    assert!(!ready.is_settled());

    let all = ready.wait().await.unwrap();
    assert_eq!(all.as_array().unwrap().len(), 2);
    assert_eq!(host.attached.load(Ordering::SeqCst), 2);

    let descriptions: Vec<_> = registry
        .messages()
        .into_iter()
        .map(|m| m.description)
        .collect();
    assert_eq!(descriptions, vec!["fast loaded", "slow loaded"]);
    assert!(registry.messages().iter().all(|m| m.code == MessageCode::Loaded));
}

#[tokio::test(start_paused = true)]
async fn test_registry_from_toml_settings() {
    init_tracing();

    let registry: Registry<Host> = registry_from_toml(
        r#"
        [registry]
        checks = 2
        check_interval_ms = 25
        "#,
    )
    .unwrap();

    let started = tokio::time::Instant::now();
    let result = registry.extension_ready("missing").await;
    assert!(matches!(result, Err(ExtensionError::Timeout { waited_ms: 50, .. })));
    assert!(started.elapsed() >= Duration::from_millis(50));
}

#[tokio::test(start_paused = true)]
async fn test_registry_from_toml_huge_budget_keeps_waiting() {
    let registry: Registry<Host> = registry_from_toml(
        "[registry]\nchecks = 4294967295\ncheck_interval_ms = 9223372036854775807\n",
    )
    .unwrap();

    let lookup =
        tokio::time::timeout(Duration::from_secs(86_400), registry.extension_ready("ghost")).await;
    assert!(lookup.is_err());
}

#[test]
fn test_registry_from_toml_rejects_zero_interval() {
    let result = registry_from_toml::<Host>("[registry]\ncheck_interval_ms = 0\n");
    let err = result.err().unwrap();
    assert!(err.to_string().contains("check_interval_ms"));
}
