//! # Extreg
//!
//! Asynchronous extension-loading coordinator.
//!
//! A [`Registry`] initializes a set of extensions against a shared base
//! object, keeps one [`CompletionHandle`] per extension, publishes an
//! aggregate `ready` handle and answers readiness lookups for extensions
//! that may not have registered yet.
//!
//! ```no_run
//! use std::sync::Arc;
//! use extreg::{Deferred, FnExtension, Registry, RegistryConfig};
//!
//! # async fn run() -> Result<(), extreg::ExtensionError> {
//! let registry = Registry::new();
//! let config = RegistryConfig::new(Arc::new(()))
//!     .with_extension(FnExtension::new("search", |_base: Arc<()>, deferred: Deferred| {
//!         deferred.resolve("indexed");
//!     }));
//!
//! let ready = registry.init(config)?;
//! registry.extension_ready("search").await?;
//! ready.wait().await?;
//! # Ok(())
//! # }
//! ```

pub use extreg_config::{
    Config, ConfigError, ConfigLoader, ConfigValidator, RegistrySettings, ValidationResult,
};
pub use extreg_core::{Registry, RegistryConfig};
pub use extreg_protocols::{
    CompletionHandle, Deferred, Extension, ExtensionError, FnExtension, LoadMessage, MessageCode,
    Settlement,
};

/// Build a registry from a TOML config string.
///
/// The `[registry]` table is validated first; validation warnings are logged
/// and the first validation error is returned.
pub fn registry_from_toml<B>(content: &str) -> Result<Registry<B>, ConfigError>
where
    B: Send + Sync + 'static,
{
    let config = ConfigLoader::load_str(content)?;
    let warnings = ConfigValidator::validate(&config).into_result()?;
    for warning in warnings {
        tracing::warn!(path = %warning.path, "{}", warning.message);
    }
    Ok(Registry::with_settings(config.registry))
}
