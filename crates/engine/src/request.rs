//! Turns raw call inputs into a resolved parameter map and a serialized payload.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;
use yamlrest_types::{DefaultParam, RequestEntity, Version};

use crate::{ContextError, Stash, stash::StashError};

/// Parameters injected into every call that does not set them explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultParams {
    rules: Vec<DefaultParam>,
}

impl Default for DefaultParams {
    /// `error_trace=true`, except for `*put_settings` on services older than 5.2.0
    /// which reject the parameter.
    fn default() -> Self {
        Self::new(vec![DefaultParam::new("error_trace", "true").exempt("put_settings", Version::new(5, 2, 0))])
    }
}

impl DefaultParams {
    pub fn new(rules: Vec<DefaultParam>) -> Self {
        Self { rules }
    }

    pub fn none() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn rules(&self) -> &[DefaultParam] {
        &self.rules
    }

    /// Inserts every applicable default not already present in `params`.
    pub fn apply(&self, api_name: &str, version: &Version, params: &mut IndexMap<String, String>) {
        for rule in &self.rules {
            if params.contains_key(&rule.name) || !rule.applies_to(api_name, version) {
                continue;
            }
            params.insert(rule.name.clone(), rule.value.clone());
        }
    }
}

/// Resolved params and optional payload for one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltRequest {
    pub params: IndexMap<String, String>,
    pub entity: Option<RequestEntity>,
}

/// Builds requests against a stash snapshot without mutating it.
pub struct RequestBuilder<'a> {
    stash: &'a Stash,
    defaults: &'a DefaultParams,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(stash: &'a Stash, defaults: &'a DefaultParams) -> Self {
        Self { stash, defaults }
    }

    /// Copies `params`, injects defaults, resolves references, and serializes `bodies`.
    ///
    /// ```rust
    /// use indexmap::IndexMap;
    /// use serde_json::json;
    /// use yamlrest_engine::{DefaultParams, RequestBuilder, Stash};
    /// use yamlrest_types::Version;
    ///
    /// let mut stash = Stash::new();
    /// stash.set("id", json!("7"));
    /// let defaults = DefaultParams::default();
    ///
    /// let mut params = IndexMap::new();
    /// params.insert("id".to_string(), "$id".to_string());
    ///
    /// let built = RequestBuilder::new(&stash, &defaults)
    ///     .build("get", &Version::new(8, 0, 0), &params, &[])
    ///     .unwrap();
    /// assert_eq!(built.params["id"], "7");
    /// assert_eq!(built.params["error_trace"], "true");
    /// assert!(built.entity.is_none());
    /// ```
    pub fn build(
        &self,
        api_name: &str,
        version: &Version,
        params: &IndexMap<String, String>,
        bodies: &[Value],
    ) -> Result<BuiltRequest, ContextError> {
        let mut requested = params.clone();
        self.defaults.apply(api_name, version, &mut requested);
        let params = self.resolve_strings(&requested)?;
        let entity = self.create_entity(bodies)?;
        debug!(api = %api_name, params = params.len(), has_entity = entity.is_some(), "built request");
        Ok(BuiltRequest { params, entity })
    }

    /// Resolves each value of a string map through the stash.
    pub fn resolve_strings(&self, values: &IndexMap<String, String>) -> Result<IndexMap<String, String>, StashError> {
        values
            .iter()
            .map(|(name, value)| {
                let resolved = if Stash::is_reference(value) {
                    self.stash.get_string(value)?
                } else {
                    value.clone()
                };
                Ok((name.clone(), resolved))
            })
            .collect()
    }

    /// No bodies yield no entity; one body yields one document; several
    /// bodies yield newline-terminated documents in order.
    pub fn create_entity(&self, bodies: &[Value]) -> Result<Option<RequestEntity>, ContextError> {
        match bodies {
            [] => Ok(None),
            [body] => Ok(Some(RequestEntity::json(self.serialize_body(body)?))),
            many => {
                let mut payload = String::new();
                for body in many {
                    payload.push_str(&self.serialize_body(body)?);
                    payload.push('\n');
                }
                Ok(Some(RequestEntity::json(payload)))
            }
        }
    }

    fn serialize_body(&self, body: &Value) -> Result<String, ContextError> {
        match self.stash.resolve(body)? {
            // Pre-serialized bodies are sent as written.
            Value::String(raw) => Ok(raw),
            other => Ok(serde_json::to_string(&other)?),
        }
    }
}
