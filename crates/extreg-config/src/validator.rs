//! Configuration validation.

use crate::error::ConfigError;
use crate::schema::Config;

/// Lookup budgets above this many milliseconds draw a warning.
const LONG_LOOKUP_BUDGET_MS: u128 = 60_000;

/// Outcome of validating a [`Config`].
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Turn the first error, if any, into a [`ConfigError`].
    pub fn into_result(self) -> Result<Vec<ValidationIssue>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(ConfigError::InvalidValue {
                field: error.path,
                message: error.message,
            }),
            None => Ok(self.warnings),
        }
    }
}

/// One validation finding, keyed by its dotted config path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

fn issue(path: &str, message: &str) -> ValidationIssue {
    ValidationIssue {
        path: path.to_string(),
        message: message.to_string(),
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();
        Self::validate_registry(config, &mut result);
        result
    }

    fn validate_registry(config: &Config, result: &mut ValidationResult) {
        let registry = &config.registry;

        if registry.check_interval_ms == 0 {
            result.errors.push(issue(
                "registry.check_interval_ms",
                "check_interval_ms must be greater than 0",
            ));
        }

        if registry.checks == 0 {
            result.warnings.push(issue(
                "registry.checks",
                "checks is 0, lookups for unregistered extensions fail immediately",
            ));
        }

        if registry.lookup_budget().as_millis() > LONG_LOOKUP_BUDGET_MS {
            result.warnings.push(issue(
                "registry",
                "checks * check_interval_ms exceeds 60s, readiness lookups may stall callers",
            ));
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
