//! Step scripts driving an execution context.

use std::path::Path;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::stash::render_text;

/// An ordered list of steps run against one context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestScript {
    #[serde(default)]
    pub name: Option<String>,
    /// Steps are single-key maps (`- do: {...}`) or bare names (`- clear`).
    #[serde(with = "serde_yaml::with::singleton_map_recursive")]
    pub steps: Vec<ScriptStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptStep {
    /// Calls an API.
    Do(DoStep),
    /// Response path to stash name.
    Set(IndexMap<String, String>),
    /// Resets the stash and the last response.
    Clear,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DoStep {
    pub api: String,
    #[serde(default)]
    pub params: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Several documents sent newline-delimited; takes precedence over `body`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bodies: Vec<Value>,
    #[serde(default)]
    pub headers: IndexMap<String, String>,
    /// Tolerate an error response from the service.
    #[serde(default)]
    pub catch: bool,
}

impl DoStep {
    /// Params rendered as strings; scalars such as `size: 10` become `"10"`
    /// and lists such as `index: [a, b]` become `"a,b"`.
    pub fn string_params(&self) -> IndexMap<String, String> {
        self.params.iter().map(|(name, value)| (name.clone(), param_text(value))).collect()
    }

    pub fn request_bodies(&self) -> Vec<Value> {
        if !self.bodies.is_empty() {
            return self.bodies.clone();
        }
        self.body.iter().cloned().collect()
    }
}

impl ScriptStep {
    pub fn describe(&self) -> String {
        match self {
            ScriptStep::Do(step) => format!("do {}", step.api),
            ScriptStep::Set(pairs) => {
                let targets: Vec<String> = pairs.iter().map(|(path, name)| format!("{path} -> {name}")).collect();
                format!("set {}", targets.join(", "))
            }
            ScriptStep::Clear => "clear".to_string(),
        }
    }
}

fn param_text(value: &Value) -> String {
    match value {
        Value::Array(items) => items.iter().map(render_text).collect::<Vec<_>>().join(","),
        other => render_text(other),
    }
}

/// Parses a YAML or JSON script.
pub fn parse_script_str(content: &str) -> Result<TestScript> {
    serde_yaml::from_str(content).context("parse test script")
}

pub fn parse_script_file(path: &Path) -> Result<TestScript> {
    let content = std::fs::read_to_string(path).with_context(|| format!("read script {}", path.display()))?;
    let mut script = parse_script_str(&content).with_context(|| format!("in {}", path.display()))?;
    if script.name.is_none() {
        script.name = path.file_stem().map(|stem| stem.to_string_lossy().into_owned());
    }
    Ok(script)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SCRIPT: &str = r#"
name: index then get
steps:
  - do:
      api: index
      params: { index: test, id: 1, refresh: true }
      body: { title: hi }
  - set: { _id: doc_id }
  - do:
      api: get
      params: { index: test, id: "$doc_id" }
      catch: true
  - clear
"#;

    #[test]
    fn parses_all_step_kinds() {
        let script = parse_script_str(SCRIPT).unwrap();
        assert_eq!(script.name.as_deref(), Some("index then get"));
        assert_eq!(script.steps.len(), 4);

        let ScriptStep::Do(index) = &script.steps[0] else {
            panic!("expected do step, got {:?}", script.steps[0]);
        };
        assert_eq!(index.string_params()["id"], "1");
        assert_eq!(index.string_params()["refresh"], "true");
        assert_eq!(index.request_bodies(), vec![json!({"title": "hi"})]);

        assert_eq!(script.steps[1].describe(), "set _id -> doc_id");
        assert!(matches!(&script.steps[2], ScriptStep::Do(step) if step.catch));
        assert_eq!(script.steps[3], ScriptStep::Clear);
    }

    #[test]
    fn parses_flow_style_steps() {
        let script = parse_script_str("steps:\n  - do: { api: info }\n  - set: { a: b }\n").unwrap();
        assert_eq!(script.steps.len(), 2);
        assert!(matches!(&script.steps[0], ScriptStep::Do(step) if step.api == "info"));
        assert_eq!(script.steps[1].describe(), "set a -> b");
    }

    #[test]
    fn list_params_are_comma_joined() {
        let script = parse_script_str("steps:\n  - do: { api: search, params: { index: [a, b], size: 5 } }\n").unwrap();
        let ScriptStep::Do(search) = &script.steps[0] else {
            panic!("expected do step, got {:?}", script.steps[0]);
        };
        let params = search.string_params();
        assert_eq!(params["index"], "a,b");
        assert_eq!(params["size"], "5");
    }

    #[test]
    fn bodies_take_precedence() {
        let step = DoStep {
            api: "bulk".into(),
            body: Some(json!({"ignored": true})),
            bodies: vec![json!({"a": 1}), json!({"b": 2})],
            ..DoStep::default()
        };
        assert_eq!(step.request_bodies().len(), 2);
    }

    #[test]
    fn file_name_becomes_default_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("smoke.yaml");
        std::fs::write(&path, "steps:\n  - clear\n").unwrap();
        let script = parse_script_file(&path).unwrap();
        assert_eq!(script.name.as_deref(), Some("smoke"));
    }

    #[test]
    fn unknown_step_kind_is_rejected() {
        assert!(parse_script_str("steps:\n  - match: { a: 1 }\n").is_err());
    }
}
