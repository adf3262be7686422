use anyhow::{Result, anyhow};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    ContextError, ExecutionContext,
    model::{DoStep, ScriptStep, TestScript},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Succeeded,
    /// An expected error response was captured.
    Caught,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub description: String,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    /// Values stashed by a `set` step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captured: Option<Value>,
}

/// Runs every step of `script` in order, stopping at the first failure.
///
/// A `do` step marked `catch` must end with an error response; any other
/// outcome, including a transport failure, fails the run.
pub fn run_script(context: &mut ExecutionContext, script: &TestScript) -> Result<Vec<StepReport>> {
    let name = script.name.as_deref().unwrap_or("<unnamed>");
    info!(script = %name, steps = script.steps.len(), "running script");

    let mut reports = Vec::with_capacity(script.steps.len());
    for (index, step) in script.steps.iter().enumerate() {
        let description = step.describe();
        debug!(index, step = %description, "running step");
        let report = match step {
            ScriptStep::Do(call) => run_call(context, call, index, description)?,
            ScriptStep::Set(pairs) => {
                let mut captured = serde_json::Map::new();
                for (path, stash_name) in pairs {
                    let value = context
                        .set_from_response(path, stash_name)
                        .map_err(|error| anyhow!("step {index} ({description}): {error}"))?;
                    captured.insert(stash_name.clone(), value);
                }
                StepReport {
                    index,
                    description,
                    status: StepStatus::Succeeded,
                    http_status: None,
                    captured: Some(Value::Object(captured)),
                }
            }
            ScriptStep::Clear => {
                context.clear();
                StepReport {
                    index,
                    description,
                    status: StepStatus::Succeeded,
                    http_status: None,
                    captured: None,
                }
            }
        };
        reports.push(report);
    }
    Ok(reports)
}

fn run_call(context: &mut ExecutionContext, call: &DoStep, index: usize, description: String) -> Result<StepReport> {
    let outcome = context.call_api(&call.api, &call.string_params(), &call.request_bodies(), &call.headers);
    let (status, http_status) = match (outcome, call.catch) {
        (Ok(response), false) => (StepStatus::Succeeded, Some(response.status)),
        (Ok(response), true) => {
            return Err(anyhow!(
                "step {index} ({description}): expected an error response but got status {}",
                response.status
            ));
        }
        (Err(ContextError::RemoteError { status, .. }), true) => (StepStatus::Caught, Some(status)),
        (Err(error), _) => return Err(anyhow!("step {index} ({description}): {error}")),
    };
    Ok(StepReport {
        index,
        description,
        status,
        http_status,
        captured: None,
    })
}
