use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use tracing::{debug, warn};
use yamlrest_types::ApiEndpoint;
use yamlrest_util::expand_tilde;

use crate::RegistryError;

const BUILTIN_DEFINITIONS: &str = include_str!("../data/builtin_apis.yaml");

/// Definition files are either a map keyed by API name or a list of
/// endpoints carrying their own `name`.
#[derive(Deserialize)]
#[serde(untagged)]
enum DefinitionDocument {
    Keyed(IndexMap<String, ApiEndpoint>),
    Listed(Vec<ApiEndpoint>),
}

/// All API endpoints known to the harness, keyed by API name.
#[derive(Debug, Clone, Default)]
pub struct ApiRegistry {
    endpoints: IndexMap<String, ApiEndpoint>,
}

impl ApiRegistry {
    /// Creates a registry from the definitions embedded at build time.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use yamlrest_registry::ApiRegistry;
    ///
    /// let registry = ApiRegistry::builtin().expect("embedded definitions parse");
    /// assert!(registry.find("cluster.put_settings").is_some());
    /// ```
    pub fn builtin() -> Result<Self, RegistryError> {
        Self::from_definition_str(BUILTIN_DEFINITIONS)
    }

    /// Parses a YAML or JSON definition document.
    pub fn from_definition_str(content: &str) -> Result<Self, RegistryError> {
        let document: DefinitionDocument = serde_yaml::from_str(content)?;
        let mut registry = ApiRegistry::default();
        match document {
            DefinitionDocument::Keyed(entries) => {
                for (name, mut endpoint) in entries {
                    endpoint.name = name;
                    registry.insert(endpoint);
                }
            }
            DefinitionDocument::Listed(entries) => {
                for endpoint in entries {
                    registry.insert(endpoint);
                }
            }
        }
        Ok(registry)
    }

    /// Loads a single definition file.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = expand_tilde(path);
        let content = std::fs::read_to_string(&path).map_err(|source| RegistryError::Io {
            path: path.clone(),
            source,
        })?;
        let registry = Self::from_definition_str(&content)?;
        debug!(path = %path.display(), endpoints = registry.len(), "loaded api definitions");
        Ok(registry)
    }

    /// Merges the definitions of several files into `self`. Later files
    /// replace earlier endpoints with the same name.
    pub fn extend_from_files<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<(), RegistryError> {
        for path in paths {
            let loaded = Self::load_file(path)?;
            for endpoint in loaded.endpoints.into_values() {
                self.insert(endpoint);
            }
        }
        Ok(())
    }

    /// Adds or replaces an endpoint.
    pub fn insert(&mut self, endpoint: ApiEndpoint) {
        if self.endpoints.contains_key(&endpoint.name) {
            warn!(api = %endpoint.name, "replacing existing api definition");
        }
        self.endpoints.insert(endpoint.name.clone(), endpoint);
    }

    pub fn find(&self, name: &str) -> Option<&ApiEndpoint> {
        self.endpoints.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.endpoints.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_definitions_are_named_and_unique() {
        let registry = ApiRegistry::builtin().expect("load builtin definitions");
        assert!(!registry.is_empty());
        for name in registry.names() {
            let endpoint = registry.find(name).expect("endpoint present");
            assert_eq!(endpoint.name, name);
            assert!(!endpoint.paths.is_empty(), "{name} has no paths");
        }
    }

    #[test]
    fn parses_listed_definitions() {
        let json = r#"[{"name": "ping", "methods": ["HEAD"], "paths": ["/"]}]"#;
        let registry = ApiRegistry::from_definition_str(json).expect("parse list document");
        assert_eq!(registry.find("ping").map(|e| e.methods.clone()), Some(vec!["HEAD".to_string()]));
    }

    #[test]
    fn rejects_malformed_documents() {
        let result = ApiRegistry::from_definition_str("ping: 42");
        assert!(matches!(result, Err(RegistryError::InvalidDefinition(_))));
    }
}
