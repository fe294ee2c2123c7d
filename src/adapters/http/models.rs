//! Wire shapes used only by the HTTP adapter.

use serde::Deserialize;
use serde_json::Value;

/// Error body returned by the token endpoint, e.g.
/// `{"detail": "Incorrect username or password"}`.
///
/// Validation failures carry a list of problems instead of a string.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    /// Either a message string or a list of validation errors.
    pub detail: Value,
}

impl ErrorDetail {
    /// Detail text as the server phrased it.
    pub fn message(&self) -> String {
        match &self.detail {
            Value::String(text) => text.clone(),
            Value::Array(items) => items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("; "),
            other => other.to_string(),
        }
    }
}
