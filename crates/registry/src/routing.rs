//! Route selection for a resolved API call.

use indexmap::IndexMap;
use yamlrest_types::path_parts;
use yamlrest_util::build_path;

use crate::{ApiRegistry, RegistryError};

/// Concrete HTTP route for one call: method, encoded path, and the params
/// left over for the query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub method: String,
    pub path: String,
    pub query: IndexMap<String, String>,
}

impl ApiRegistry {
    /// Resolves `api_name` against `params`.
    ///
    /// The path template whose placeholders are all present in `params` and
    /// which uses the most of them wins; ties keep declaration order. Params
    /// consumed by the path are removed from the query string.
    ///
    /// ```rust
    /// use indexmap::IndexMap;
    /// use yamlrest_registry::ApiRegistry;
    ///
    /// let registry = ApiRegistry::builtin().unwrap();
    /// let mut params = IndexMap::new();
    /// params.insert("index".to_string(), "test".to_string());
    /// params.insert("id".to_string(), "1".to_string());
    /// params.insert("refresh".to_string(), "true".to_string());
    ///
    /// let route = registry.route("index", &params, true).unwrap();
    /// assert_eq!(route.method, "PUT");
    /// assert_eq!(route.path, "/test/_doc/1");
    /// assert_eq!(route.query.get("refresh").map(String::as_str), Some("true"));
    /// ```
    pub fn route(
        &self,
        api_name: &str,
        params: &IndexMap<String, String>,
        has_body: bool,
    ) -> Result<ResolvedRoute, RegistryError> {
        let endpoint = self.find(api_name).ok_or_else(|| RegistryError::UnknownApi {
            name: api_name.to_string(),
        })?;

        let method = endpoint.method_for(has_body).ok_or_else(|| RegistryError::NoMethod {
            api: api_name.to_string(),
        })?;

        let mut best: Option<(&str, Vec<&str>)> = None;
        for template in &endpoint.paths {
            let parts = path_parts(template);
            if !parts.iter().all(|part| params.contains_key(*part)) {
                continue;
            }
            let better = match &best {
                Some((_, best_parts)) => parts.len() > best_parts.len(),
                None => true,
            };
            if better {
                best = Some((template.as_str(), parts));
            }
        }

        let Some((template, parts)) = best else {
            return Err(RegistryError::NoMatchingPath {
                api: api_name.to_string(),
                params: params.keys().cloned().collect::<Vec<_>>().join(", "),
            });
        };

        let mut path_values = IndexMap::new();
        let mut query = IndexMap::new();
        for (name, value) in params {
            if parts.contains(&name.as_str()) {
                path_values.insert(name.clone(), value.clone());
            } else {
                query.insert(name.clone(), value.clone());
            }
        }

        Ok(ResolvedRoute {
            method: method.to_string(),
            path: build_path(template, &path_values),
            query,
        })
    }
}
