//! Response body parsing.

use serde_json::Value;
use tracing::trace;

/// Converts raw response text into a structured body.
///
/// - empty or whitespace-only text becomes `Value::Null`
/// - valid JSON is parsed
/// - anything else is kept verbatim as `Value::String`, so plain-text
///   endpoints can still be stashed and compared
pub fn parse_response_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    match serde_json::from_str::<Value>(text) {
        Ok(value) => value,
        Err(error) => {
            trace!(%error, bytes = text.len(), "response body is not json; keeping raw text");
            Value::String(text.to_string())
        }
    }
}
