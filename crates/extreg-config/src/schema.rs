//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub registry: RegistrySettings,
}

/// Tunables of an extension registry.
///
/// `checks × check_interval_ms` is the budget a readiness lookup waits for a
/// name that has not been registered yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySettings {
    /// Maximum number of readiness checks.
    #[serde(default = "default_checks")]
    pub checks: u32,

    /// Period between readiness checks, in milliseconds.
    #[serde(default = "default_check_interval_ms")]
    pub check_interval_ms: u64,

    /// Fulfill the aggregate handle immediately when no extensions are given.
    /// When false it stays pending forever.
    #[serde(default)]
    pub empty_is_ready: bool,
}

impl RegistrySettings {
    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }

    /// Total time a readiness lookup waits for a registration.
    pub fn lookup_budget(&self) -> Duration {
        self.check_interval()
            .saturating_mul(self.checks)
    }
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            checks: default_checks(),
            check_interval_ms: default_check_interval_ms(),
            empty_is_ready: false,
        }
    }
}

fn default_checks() -> u32 {
    10
}

fn default_check_interval_ms() -> u64 {
    100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_settings_defaults() {
        let settings = RegistrySettings::default();
        assert_eq!(settings.checks, 10);
        assert_eq!(settings.check_interval_ms, 100);
        assert!(!settings.empty_is_ready);
        assert_eq!(settings.lookup_budget(), Duration::from_secs(1));
    }

    #[test]
    fn test_lookup_budget_saturates() {
        let settings = RegistrySettings {
            checks: u32::MAX,
            check_interval_ms: u64::MAX,
            empty_is_ready: false,
        };
        assert_eq!(settings.lookup_budget(), Duration::MAX);
    }

    #[test]
    fn test_partial_table_uses_defaults() {
        let config: Config = toml::from_str("[registry]\nchecks = 3\n").unwrap();
        assert_eq!(config.registry.checks, 3);
        assert_eq!(config.registry.check_interval_ms, 100);
    }
}
