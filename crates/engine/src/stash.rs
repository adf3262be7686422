//! # Stash
//!
//! Named variables captured from earlier responses and substituted into later
//! requests.
//!
//! ## Reference syntax
//!
//! - `$name` — the whole token is replaced by the stashed value, keeping its
//!   type (string, number, object, ...). `$name.a.b` reads a nested value.
//! - `${name}` — interpolation inside a larger string; the stashed value is
//!   rendered as text.
//!
//! ## Usage
//!
//! ```rust
//! use serde_json::json;
//! use yamlrest_engine::Stash;
//!
//! let mut stash = Stash::new();
//! stash.set("id", json!("42"));
//! stash.set("body", json!({"hits": {"total": 3}}));
//!
//! let request = json!({"doc": {"id": "$id", "label": "doc-${id}"}, "total": "$body.hits.total"});
//! let resolved = stash.resolve(&request).unwrap();
//! assert_eq!(resolved, json!({"doc": {"id": "42", "label": "doc-42"}, "total": 3}));
//! ```

use std::collections::HashMap;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::object_path::{evaluate, split_path};

/// Stash key holding the body of the most recent response.
pub const BODY_KEY: &str = "body";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StashError {
    #[error("stashed value not found for key [{name}]")]
    UndefinedVariable { name: String },
}

/// Mapping from variable name to the last value captured under that name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stash {
    values: HashMap<String, Value>,
}

impl Stash {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `name`, replacing any previous value.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// True iff `token` denotes a stash lookup: a `$name` token or a string
    /// containing a `${name}` placeholder.
    pub fn is_reference(token: &str) -> bool {
        if let Some(rest) = token.strip_prefix('$')
            && !rest.is_empty()
            && !rest.starts_with('{')
        {
            return true;
        }
        match token.find("${") {
            Some(start) => token[start + 2..].contains('}'),
            None => false,
        }
    }

    /// Reference predicate over structured values; only strings can be references.
    pub fn is_reference_value(value: &Value) -> bool {
        matches!(value, Value::String(token) if Self::is_reference(token))
    }

    /// Returns the value `token` refers to. Non-reference tokens come back
    /// unchanged as strings.
    pub fn get(&self, token: &str) -> Result<Value, StashError> {
        if let Some(name) = token.strip_prefix('$')
            && !name.is_empty()
            && !name.starts_with('{')
        {
            return self.lookup(name).cloned();
        }
        if Self::is_reference(token) {
            return self.interpolate(token).map(Value::String);
        }
        Ok(Value::String(token.to_string()))
    }

    /// Like [`Stash::get`], rendered as text for params, headers, and paths.
    pub fn get_string(&self, token: &str) -> Result<String, StashError> {
        self.get(token).map(|value| render_text(&value))
    }

    /// Deep substitution: every reference in `value`, at any depth, is replaced
    /// by its stashed value. Mapping keys are kept as they are.
    pub fn resolve(&self, value: &Value) -> Result<Value, StashError> {
        match value {
            Value::String(token) if Self::is_reference(token) => self.get(token),
            Value::Array(items) => items.iter().map(|item| self.resolve(item)).collect::<Result<Vec<_>, _>>().map(Value::Array),
            Value::Object(entries) => {
                let mut resolved = Map::with_capacity(entries.len());
                for (key, entry) in entries {
                    resolved.insert(key.clone(), self.resolve(entry)?);
                }
                Ok(Value::Object(resolved))
            }
            other => Ok(other.clone()),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Snapshot of every stashed entry as a JSON object.
    pub fn to_value(&self) -> Value {
        let mut names: Vec<&String> = self.values.keys().collect();
        names.sort();
        Value::Object(names.into_iter().map(|name| (name.clone(), self.values[name].clone())).collect())
    }

    /// Looks up `name`, falling back to a dotted path whose first segment is
    /// the stash key (`body.hits.total`).
    fn lookup(&self, name: &str) -> Result<&Value, StashError> {
        if let Some(value) = self.values.get(name) {
            return Ok(value);
        }
        let undefined = || StashError::UndefinedVariable { name: name.to_string() };
        let segments = split_path(name);
        let (key, rest) = segments.split_first().ok_or_else(undefined)?;
        let root = self.values.get(key).ok_or_else(undefined)?;
        evaluate(root, rest).ok_or_else(undefined)
    }

    fn interpolate(&self, input: &str) -> Result<String, StashError> {
        let mut output = String::with_capacity(input.len());
        let mut remaining = input;

        while let Some(start) = remaining.find("${") {
            let (before, after) = remaining.split_at(start);
            output.push_str(before);

            let Some(end) = after.find('}') else {
                // Unterminated placeholder: keep the rest verbatim.
                output.push_str(after);
                return Ok(output);
            };
            let name = after[2..end].trim();
            output.push_str(&render_text(self.lookup(name)?));
            remaining = &after[end + 1..];
        }

        output.push_str(remaining);
        Ok(output)
    }
}

/// Strings render as-is, everything else as compact JSON.
pub fn render_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stash_with_x() -> Stash {
        let mut stash = Stash::new();
        stash.set("x", json!("42"));
        stash
    }

    #[test]
    fn detects_references() {
        assert!(Stash::is_reference("$x"));
        assert!(Stash::is_reference("$body.hits.total"));
        assert!(Stash::is_reference("prefix-${x}-suffix"));
        assert!(!Stash::is_reference("$"));
        assert!(!Stash::is_reference("plain"));
        assert!(!Stash::is_reference("costs 5$"));
        assert!(!Stash::is_reference("${unterminated"));
        assert!(Stash::is_reference_value(&json!("$x")));
        assert!(!Stash::is_reference_value(&json!(42)));
    }

    #[test]
    fn resolves_flat_and_nested_references() {
        let stash = stash_with_x();
        assert_eq!(stash.resolve(&json!({"id": "$x"})).unwrap(), json!({"id": "42"}));
        assert_eq!(stash.resolve(&json!({"a": {"b": "$x"}})).unwrap(), json!({"a": {"b": "42"}}));
        assert_eq!(stash.resolve(&json!([["$x"], {"c": ["$x"]}])).unwrap(), json!([["42"], {"c": ["42"]}]));
    }

    #[test]
    fn resolve_is_identity_without_references() {
        let stash = stash_with_x();
        let value = json!({"n": 1, "f": 1.5, "t": true, "z": null, "s": "text", "l": [1, "two", {"k": "v"}]});
        assert_eq!(stash.resolve(&value).unwrap(), value);
    }

    #[test]
    fn mapping_keys_are_not_substituted() {
        let stash = stash_with_x();
        assert_eq!(stash.resolve(&json!({"$x": "$x"})).unwrap(), json!({"$x": "42"}));
    }

    #[test]
    fn full_value_substitution_keeps_type() {
        let mut stash = Stash::new();
        stash.set("doc", json!({"tags": ["a", "b"]}));
        assert_eq!(stash.resolve(&json!({"copy": "$doc"})).unwrap(), json!({"copy": {"tags": ["a", "b"]}}));
    }

    #[test]
    fn interpolation_renders_text() {
        let mut stash = stash_with_x();
        stash.set("count", json!(3));
        assert_eq!(stash.get("id-${x}/${count}").unwrap(), json!("id-42/3"));
        assert_eq!(stash.get_string("${ x }").unwrap(), "42");
    }

    #[test]
    fn nested_lookup_through_stashed_values() {
        let mut stash = Stash::new();
        stash.set(BODY_KEY, json!({"hits": {"hits": [{"_id": "abc"}]}}));
        assert_eq!(stash.get("$body.hits.hits.0._id").unwrap(), json!("abc"));
    }

    #[test]
    fn undefined_references_fail() {
        let stash = stash_with_x();
        assert_eq!(
            stash.get("$missing"),
            Err(StashError::UndefinedVariable { name: "missing".to_string() })
        );
        assert!(stash.get("${missing}").is_err());
        assert!(stash.resolve(&json!({"deep": ["$missing"]})).is_err());
        assert!(stash.get("$x.not.there").is_err());
    }

    #[test]
    fn literal_tokens_pass_through_get() {
        let stash = Stash::new();
        assert_eq!(stash.get("plain").unwrap(), json!("plain"));
    }

    #[test]
    fn set_overwrites_and_clear_empties() {
        let mut stash = stash_with_x();
        stash.set("x", json!(7));
        assert_eq!(stash.get("$x").unwrap(), json!(7));
        stash.clear();
        assert!(stash.is_empty());
        assert!(!stash.contains("x"));
    }

    #[test]
    fn snapshot_lists_entries() {
        let mut stash = stash_with_x();
        stash.set("a", json!(null));
        assert_eq!(stash.to_value(), json!({"a": null, "x": "42"}));
    }
}
