//! Harness configuration: where the service lives and how calls are shaped.

use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use dirs_next::config_dir;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;
use yamlrest_registry::ApiRegistry;
use yamlrest_types::{DefaultParam, Version};
use yamlrest_util::expand_tilde;

use crate::DefaultParams;

pub const CONFIG_PATH_ENV: &str = "YAMLREST_CONFIG_PATH";
pub const BASE_URL_ENV: &str = "YAMLREST_BASE_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Headers sent with every request.
    pub headers: IndexMap<String, String>,
    /// Pins the service version instead of probing it at connect time.
    pub server_version: Option<Version>,
    pub version_probe_path: String,
    /// Dotted path to the version string in the probe response.
    pub version_field: String,
    /// Extra API definition files merged over the built-in ones.
    pub api_specs: Vec<PathBuf>,
    pub default_params: Vec<DefaultParam>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9200".to_string(),
            timeout_secs: 30,
            headers: IndexMap::new(),
            server_version: None,
            version_probe_path: "/".to_string(),
            version_field: "version.number".to_string(),
            api_specs: Vec::new(),
            default_params: DefaultParams::default().rules().to_vec(),
        }
    }
}

impl HarnessConfig {
    /// Loads configuration from `explicit`, then `YAMLREST_CONFIG_PATH`, then the
    /// user config directory, falling back to defaults when no file exists.
    /// `YAMLREST_BASE_URL` overrides the base URL in every case.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match config_path(explicit) {
            Some(path) => Self::from_file(&path)?,
            None => HarnessConfig::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parses a YAML or JSON configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).with_context(|| format!("read config file {}", path.display()))?;
        let config: HarnessConfig =
            serde_yaml::from_str(&content).with_context(|| format!("parse config file {}", path.display()))?;
        debug!(path = %path.display(), base_url = %config.base_url, "loaded harness config");
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(base_url) = env::var(BASE_URL_ENV)
            && !base_url.trim().is_empty()
        {
            self.base_url = base_url.trim().to_string();
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn default_param_policy(&self) -> DefaultParams {
        DefaultParams::new(self.default_params.clone())
    }

    /// Built-in API definitions merged with every configured `api_specs` file.
    pub fn load_registry(&self) -> Result<ApiRegistry> {
        let mut registry = ApiRegistry::builtin().context("load built-in api definitions")?;
        registry.extend_from_files(&self.api_specs).context("load api definition files")?;
        Ok(registry)
    }
}

fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(expand_tilde(path));
    }
    if let Ok(path) = env::var(CONFIG_PATH_ENV)
        && !path.trim().is_empty()
    {
        return Some(expand_tilde(path.trim()));
    }
    let default = config_dir()?.join("yamlrest").join("config.yaml");
    default.exists().then_some(default)
}
