//! The execution context: stash, last response, and call sequencing.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use indexmap::IndexMap;
use serde_json::Value;
use yamlrest_types::{ApiRequest, ApiResponse, Version};

use crate::{
    ContextError, DefaultParams, RequestBuilder, Stash,
    object_path::{evaluate, split_path},
    stash::BODY_KEY,
    telemetry::{CallStatus, ContextObserver, TracingObserver},
    transport::{Transport, TransportError},
};

/// The response of the most recent completed call.
#[derive(Debug, Clone, PartialEq)]
pub enum LastResponse {
    Success(ApiResponse),
    /// Error response captured from a remote failure.
    Failure(ApiResponse),
}

impl LastResponse {
    pub fn response(&self) -> &ApiResponse {
        match self {
            LastResponse::Success(response) | LastResponse::Failure(response) => response,
        }
    }

    pub fn body(&self) -> &Value {
        &self.response().body
    }

    pub fn status(&self) -> u16 {
        self.response().status
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, LastResponse::Failure(_))
    }
}

/// Result of the transport call, before state is recorded.
enum CallOutcome {
    Success(ApiResponse),
    Remote(ApiResponse),
    Failed(String),
}

/// Runs API calls for one test, threading stashed values between them.
///
/// A context is owned by a single caller; parallel tests use separate contexts.
pub struct ExecutionContext {
    transport: Box<dyn Transport>,
    observer: Arc<dyn ContextObserver>,
    defaults: DefaultParams,
    stash: Stash,
    last_response: Option<LastResponse>,
}

impl ExecutionContext {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Box::new(transport),
            observer: Arc::new(TracingObserver),
            defaults: DefaultParams::default(),
            stash: Stash::new(),
            last_response: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn ContextObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_default_params(mut self, defaults: DefaultParams) -> Self {
        self.defaults = defaults;
        self
    }

    /// Resolves and dispatches one call.
    ///
    /// Whatever the outcome, the last response is replaced (cleared on a
    /// transport failure) and its body, or `null`, is stashed as `body`
    /// before this returns. Unresolvable references fail before dispatch and
    /// leave the context untouched.
    pub fn call_api(
        &mut self,
        api_name: &str,
        params: &IndexMap<String, String>,
        bodies: &[Value],
        headers: &IndexMap<String, String>,
    ) -> Result<ApiResponse, ContextError> {
        let version = self.transport.server_version();
        let builder = RequestBuilder::new(&self.stash, &self.defaults);
        let built = builder.build(api_name, &version, params, bodies)?;
        let headers = builder.resolve_strings(headers)?;

        let request = ApiRequest {
            api_name: api_name.to_string(),
            params: built.params,
            entity: built.entity,
            headers,
        };

        self.observer.call_started(&request);
        let started = Instant::now();
        let outcome = match self.transport.call_api(&request) {
            Ok(response) => CallOutcome::Success(response),
            Err(TransportError::Remote { response, .. }) => CallOutcome::Remote(*response),
            Err(TransportError::Failed { message, .. }) => CallOutcome::Failed(message),
        };
        self.record(api_name, outcome, started.elapsed())
    }

    fn record(&mut self, api_name: &str, outcome: CallOutcome, elapsed: Duration) -> Result<ApiResponse, ContextError> {
        let (status, result) = match outcome {
            CallOutcome::Success(response) => {
                self.last_response = Some(LastResponse::Success(response.clone()));
                (CallStatus::Succeeded, Ok(response))
            }
            CallOutcome::Remote(response) => {
                self.last_response = Some(LastResponse::Failure(response.clone()));
                let error = ContextError::RemoteError {
                    api: api_name.to_string(),
                    status: response.status,
                    response: Box::new(response),
                };
                (CallStatus::RemoteError, Err(error))
            }
            CallOutcome::Failed(message) => {
                self.last_response = None;
                let error = ContextError::TransportFailure {
                    api: api_name.to_string(),
                    message,
                };
                (CallStatus::TransportFailure, Err(error))
            }
        };

        let http_status = self.last_response.as_ref().map(LastResponse::status);
        self.observer.call_completed(api_name, status, http_status, elapsed);

        let body = self.last_response.as_ref().map(|last| last.body().clone()).unwrap_or(Value::Null);
        self.stash.set(BODY_KEY, body);
        self.observer.stashed(BODY_KEY);
        result
    }

    /// Evaluates a dotted path against the last response body.
    ///
    /// `path` may itself be a stash reference; it is resolved first. An
    /// empty path returns the whole body.
    pub fn response(&self, path: &str) -> Result<Value, ContextError> {
        let last = self.last_response.as_ref().ok_or_else(|| ContextError::NoResponseAvailable {
            path: path.to_string(),
        })?;

        if path.is_empty() || path.strip_prefix('$') == Some(BODY_KEY) {
            return Ok(last.body().clone());
        }

        // A single reference or an interpolated string may expand to a whole
        // dotted path; references inside a dotted path stand for one key each.
        let whole_path = path.contains("${") || (Stash::is_reference(path) && split_path(path).len() == 1);
        let path = if whole_path {
            self.stash.get_string(path)?
        } else {
            path.to_string()
        };

        let segments: Vec<String> = split_path(&path)
            .into_iter()
            .map(|segment| {
                if Stash::is_reference(&segment) {
                    self.stash.get_string(&segment)
                } else {
                    Ok(segment)
                }
            })
            .collect::<Result<_, _>>()?;

        evaluate(last.body(), &segments)
            .cloned()
            .ok_or(ContextError::PathNotFound { path })
    }

    pub fn last_response(&self) -> Option<&LastResponse> {
        self.last_response.as_ref()
    }

    /// Drops the last response and every stashed value.
    pub fn clear(&mut self) {
        self.last_response = None;
        self.stash.clear();
        self.observer.cleared();
    }

    pub fn stash(&self) -> &Stash {
        &self.stash
    }

    pub fn stash_value(&mut self, name: &str, value: Value) {
        self.stash.set(name, value);
        self.observer.stashed(name);
    }

    /// Evaluates `path` against the last response and stashes the result as `name`.
    pub fn set_from_response(&mut self, path: &str, name: &str) -> Result<Value, ContextError> {
        let value = self.response(path)?;
        self.stash_value(name, value.clone());
        Ok(value)
    }

    pub fn server_version(&self) -> Version {
        self.transport.server_version()
    }
}
