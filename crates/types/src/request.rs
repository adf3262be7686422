//! Request descriptors handed to a transport.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Content type used for single and newline-delimited JSON payloads.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Serialized request payload with its content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestEntity {
    pub content_type: String,
    pub body: String,
}

impl RequestEntity {
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            content_type: JSON_CONTENT_TYPE.to_string(),
            body: body.into(),
        }
    }
}

/// A fully resolved API call. Built per call and not retained by the context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiRequest {
    /// Logical API name, e.g. `index` or `cluster.put_settings`.
    pub api_name: String,
    /// Parameters with every stash reference already substituted.
    #[serde(default)]
    pub params: IndexMap<String, String>,
    /// Optional serialized payload.
    #[serde(default)]
    pub entity: Option<RequestEntity>,
    /// Extra request headers.
    #[serde(default)]
    pub headers: IndexMap<String, String>,
}
