//! Default request parameter rules.

use serde::{Deserialize, Serialize};

use crate::Version;

/// A parameter added to every request that does not already carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultParam {
    pub name: String,
    pub value: String,
    /// APIs and versions that must not receive this parameter.
    #[serde(default)]
    pub exemptions: Vec<DefaultParamExemption>,
}

/// Skips a default for APIs whose name ends with `api_suffix` on services
/// older than `before`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultParamExemption {
    pub api_suffix: String,
    pub before: Version,
}

impl DefaultParamExemption {
    pub fn matches(&self, api_name: &str, version: &Version) -> bool {
        api_name.ends_with(&self.api_suffix) && version.before(&self.before)
    }
}

impl DefaultParam {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            exemptions: Vec::new(),
        }
    }

    pub fn exempt(mut self, api_suffix: impl Into<String>, before: Version) -> Self {
        self.exemptions.push(DefaultParamExemption {
            api_suffix: api_suffix.into(),
            before,
        });
        self
    }

    /// True when this default should be injected for `api_name` on `version`.
    pub fn applies_to(&self, api_name: &str, version: &Version) -> bool {
        !self.exemptions.iter().any(|exemption| exemption.matches(api_name, version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exemption_requires_suffix_and_older_version() {
        let rule = DefaultParam::new("error_trace", "true").exempt("put_settings", Version::new(5, 2, 0));
        assert!(!rule.applies_to("cluster.put_settings", &Version::new(5, 1, 1)));
        assert!(rule.applies_to("cluster.put_settings", &Version::new(5, 2, 0)));
        assert!(rule.applies_to("index", &Version::new(5, 1, 1)));
    }

    #[test]
    fn loads_from_yaml() {
        let yaml = r#"
name: error_trace
value: "true"
exemptions:
  - api_suffix: put_settings
    before: "5.2.0"
"#;
        let rule: DefaultParam = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(rule.exemptions.len(), 1);
        assert_eq!(rule.exemptions[0].before, Version::new(5, 2, 0));
    }
}
