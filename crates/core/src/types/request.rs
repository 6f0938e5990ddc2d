use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Collection used when a lookup names none.
pub const DEFAULT_COLLECTION: &str = "default";

// =============================================================================
// Request Envelope
// =============================================================================

/// A parsed JSON request body with free-form fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestEnvelope {
    fields: Map<String, Value>,
}

impl RequestEnvelope {
    /// Parse a raw body. Anything that is not a JSON object is rejected as
    /// `Invalid JSON`.
    pub fn parse(body: &[u8]) -> Result<Self> {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(fields)) => Ok(Self { fields }),
            _ => Err(Error::malformed("Invalid JSON")),
        }
    }

    /// Raw field access.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// A required field: present, a string, and non-empty.
    pub fn required_str(&self, key: &str) -> Option<&str> {
        self.optional_str(key).filter(|s| !s.is_empty())
    }

    /// An optional string field. Non-string values read as absent.
    pub fn optional_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

// =============================================================================
// Safety Check Mode
// =============================================================================

/// Which direction a safety check inspects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckMode {
    /// User input heading to the model.
    #[default]
    Input,
    /// Model output heading to the user.
    Output,
}

impl CheckMode {
    /// Resolve the `mode` field: absent means input, the literal `"input"`
    /// means input, and any other present value means output.
    pub fn from_field(value: Option<&Value>) -> Self {
        match value {
            None => Self::Input,
            Some(Value::String(s)) if s == "input" => Self::Input,
            Some(_) => Self::Output,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Output => "output",
        }
    }
}

impl std::fmt::Display for CheckMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
