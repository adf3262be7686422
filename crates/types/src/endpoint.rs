//! API endpoint definitions consumed by the registry.

use serde::{Deserialize, Serialize};

/// HTTP surface of one logical API.
///
/// ```yaml
/// index:
///   methods: [PUT, POST]
///   paths: ["/{index}/_doc/{id}", "/{index}/_doc"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEndpoint {
    /// API name; filled from the map key when loaded from a definition file.
    #[serde(default)]
    pub name: String,
    /// Supported HTTP methods in order of preference.
    #[serde(default = "default_methods")]
    pub methods: Vec<String>,
    /// Path templates with `{part}` placeholders.
    pub paths: Vec<String>,
}

fn default_methods() -> Vec<String> {
    vec!["GET".to_string()]
}

impl ApiEndpoint {
    pub fn new(name: impl Into<String>, methods: &[&str], paths: &[&str]) -> Self {
        Self {
            name: name.into(),
            methods: methods.iter().map(|method| method.to_string()).collect(),
            paths: paths.iter().map(|path| path.to_string()).collect(),
        }
    }

    /// Method used when the call has no body: the first declared method.
    /// With a body the first non-GET method wins, falling back to the first one.
    pub fn method_for(&self, has_body: bool) -> Option<&str> {
        if has_body
            && let Some(method) = self.methods.iter().find(|method| !method.eq_ignore_ascii_case("GET"))
        {
            return Some(method.as_str());
        }
        self.methods.first().map(String::as_str)
    }
}

/// Placeholder names of a path template, in order of appearance.
pub fn path_parts(template: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut remaining = template;
    while let Some(open) = remaining.find('{') {
        let after_open = &remaining[open + 1..];
        let Some(close) = after_open.find('}') else {
            break;
        };
        let name = &after_open[..close];
        if !name.is_empty() {
            parts.push(name);
        }
        remaining = &after_open[close + 1..];
    }
    parts
}
