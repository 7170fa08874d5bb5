//! Load outcome records.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Numeric outcome code of a [`LoadMessage`].
///
/// Serialized as `0` for [`MessageCode::Loaded`] and `1` for
/// [`MessageCode::Failed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageCode {
    Loaded = 0,
    Failed = 1,
}

impl MessageCode {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for MessageCode {
    type Error = u8;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            0 => Ok(MessageCode::Loaded),
            1 => Ok(MessageCode::Failed),
            other => Err(other),
        }
    }
}

impl Serialize for MessageCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.as_u8())
    }
}

impl<'de> Deserialize<'de> for MessageCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u8::deserialize(deserializer)?;
        MessageCode::try_from(code)
            .map_err(|other| D::Error::custom(format!("unknown message code: {other}")))
    }
}

/// Informational record of one extension outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadMessage {
    pub code: MessageCode,
    pub description: String,
    pub data: Value,
}

impl LoadMessage {
    /// Record for an extension whose handle fulfilled.
    pub fn loaded(name: &str, data: Value) -> Self {
        Self {
            code: MessageCode::Loaded,
            description: format!("{name} loaded"),
            data,
        }
    }

    /// Record for an extension whose handle rejected.
    pub fn failed(name: &str, data: Value) -> Self {
        Self {
            code: MessageCode::Failed,
            description: format!("{name} failed to load"),
            data,
        }
    }

    pub fn is_success(&self) -> bool {
        self.code == MessageCode::Loaded
    }
}
