//! Init configuration for a registry.

use std::collections::HashSet;
use std::sync::Arc;

use extreg_protocols::error::ExtensionError;
use extreg_protocols::extension::Extension;

/// Base object and ordered extension descriptors for [`Registry::init`].
///
/// [`Registry::init`]: crate::Registry::init
pub struct RegistryConfig<B>
where
    B: Send + Sync + 'static,
{
    pub base_object: Option<Arc<B>>,
    pub extensions: Vec<Box<dyn Extension<B>>>,
}

impl<B> RegistryConfig<B>
where
    B: Send + Sync + 'static,
{
    /// Create a config around a base object, with no extensions yet.
    pub fn new(base_object: Arc<B>) -> Self {
        Self {
            base_object: Some(base_object),
            extensions: Vec::new(),
        }
    }

    pub fn with_extension(mut self, extension: impl Extension<B>) -> Self {
        self.extensions.push(Box::new(extension));
        self
    }

    pub fn with_extensions(
        mut self,
        extensions: impl IntoIterator<Item = Box<dyn Extension<B>>>,
    ) -> Self {
        self.extensions.extend(extensions);
        self
    }

    /// Check the config and hand back the base object.
    ///
    /// Fails when the base object is missing, or when an extension name is
    /// empty or used twice.
    pub(crate) fn validate(&self) -> Result<Arc<B>, ExtensionError> {
        let base_object = self
            .base_object
            .clone()
            .ok_or_else(|| ExtensionError::InvalidConfig("base object is missing".to_string()))?;

        let mut seen = HashSet::with_capacity(self.extensions.len());
        for (index, extension) in self.extensions.iter().enumerate() {
            let name = extension.name();
            if name.is_empty() {
                return Err(ExtensionError::InvalidConfig(format!(
                    "extension at position {index} has an empty name"
                )));
            }
            if !seen.insert(name) {
                return Err(ExtensionError::InvalidConfig(format!(
                    "extension name used twice: {name}"
                )));
            }
        }

        Ok(base_object)
    }
}

impl<B> Default for RegistryConfig<B>
where
    B: Send + Sync + 'static,
{
    fn default() -> Self {
        Self {
            base_object: None,
            extensions: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use extreg_protocols::extension::{Deferred, FnExtension};

    fn noop(name: &str) -> FnExtension<()> {
        FnExtension::new(name, |_base: Arc<()>, deferred: Deferred| deferred.resolve(()))
    }

    #[test]
    fn test_valid_config() {
        let config = RegistryConfig::new(Arc::new(()))
            .with_extension(noop("a"))
            .with_extension(noop("b"));
        assert!(config.validate().is_ok());
        assert_eq!(config.extensions.len(), 2);
    }

    #[test]
    fn test_missing_base_object() {
        let config = RegistryConfig::<()>::default().with_extension(noop("a"));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("base object"));
    }

    #[test]
    fn test_empty_name_rejected() {
        let config = RegistryConfig::new(Arc::new(())).with_extension(noop(""));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("position 0"));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let config = RegistryConfig::new(Arc::new(()))
            .with_extension(noop("dup"))
            .with_extension(noop("dup"));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("used twice: dup"));
    }

    #[test]
    fn test_with_extensions_keeps_order() {
        let boxed: Vec<Box<dyn Extension<()>>> = vec![Box::new(noop("x")), Box::new(noop("y"))];
        let config = RegistryConfig::new(Arc::new(())).with_extensions(boxed);
        let names: Vec<_> = config.extensions.iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["x", "y"]);
    }
}
