//! Extension-related errors.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtensionError {
    #[error("Invalid registry config: {0}")]
    InvalidConfig(String),

    #[error("Invalid extension name: {0:?}")]
    InvalidName(String),

    #[error("Extension {name} was not registered within {waited_ms}ms")]
    Timeout { name: String, waited_ms: u64 },

    #[error("Extension rejected: {0}")]
    Rejected(Value),

    #[error("Extension dropped its completion handle without settling it")]
    Abandoned,
}

impl ExtensionError {
    /// Converts the error into the payload carried by a rejected handle.
    ///
    /// A [`ExtensionError::Rejected`] yields its original payload; every other
    /// variant is rendered as a JSON string.
    pub fn into_payload(self) -> Value {
        match self {
            Self::Rejected(payload) => payload,
            other => Value::String(other.to_string()),
        }
    }
}
