//! Observer hooks emitted by the execution context.
//!
//! The context never logs through a global object of its own; it reports to
//! an injected [`ContextObserver`]. [`TracingObserver`] forwards to `tracing`,
//! [`RecordingObserver`] keeps the events for later inspection.

use std::{
    sync::{Mutex, PoisonError},
    time::Duration,
};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use yamlrest_types::ApiRequest;
use yamlrest_util::redact_header_value;

/// How a dispatched call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStatus {
    Succeeded,
    RemoteError,
    TransportFailure,
}

/// Receives context lifecycle events. Every method defaults to a no-op.
pub trait ContextObserver: Send + Sync {
    fn call_started(&self, _request: &ApiRequest) {}

    fn call_completed(&self, _api_name: &str, _status: CallStatus, _http_status: Option<u16>, _elapsed: Duration) {}

    fn stashed(&self, _name: &str) {}

    fn cleared(&self) {}
}

/// Default observer writing `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ContextObserver for TracingObserver {
    fn call_started(&self, request: &ApiRequest) {
        let headers: Vec<String> = request
            .headers
            .iter()
            .map(|(name, value)| format!("{name}: {}", redact_header_value(name, value)))
            .collect();
        info!(
            api = %request.api_name,
            params = ?request.params,
            headers = ?headers,
            has_body = request.entity.is_some(),
            "calling api"
        );
    }

    fn call_completed(&self, api_name: &str, status: CallStatus, http_status: Option<u16>, elapsed: Duration) {
        let elapsed_ms = elapsed.as_millis() as u64;
        match status {
            CallStatus::Succeeded => debug!(api = %api_name, status = ?http_status, elapsed_ms, "call succeeded"),
            CallStatus::RemoteError => {
                warn!(api = %api_name, status = ?http_status, elapsed_ms, "call returned an error response")
            }
            CallStatus::TransportFailure => warn!(api = %api_name, elapsed_ms, "call failed without a response"),
        }
    }

    fn stashed(&self, name: &str) {
        debug!(stash_key = name, "stashed value");
    }

    fn cleared(&self) {
        debug!("execution context cleared");
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextEventKind {
    CallStarted { api_name: String },
    CallCompleted {
        api_name: String,
        status: CallStatus,
        http_status: Option<u16>,
    },
    Stashed { name: String },
    Cleared,
}

/// A recorded event with the time it was observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextEvent {
    pub at: DateTime<Utc>,
    pub kind: ContextEventKind,
}

/// Observer that keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ContextEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events, oldest first.
    pub fn events(&self) -> Vec<ContextEvent> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn kinds(&self) -> Vec<ContextEventKind> {
        self.events().into_iter().map(|event| event.kind).collect()
    }

    fn record(&self, kind: ContextEventKind) {
        let event = ContextEvent { at: Utc::now(), kind };
        self.events.lock().unwrap_or_else(PoisonError::into_inner).push(event);
    }
}

impl ContextObserver for RecordingObserver {
    fn call_started(&self, request: &ApiRequest) {
        self.record(ContextEventKind::CallStarted {
            api_name: request.api_name.clone(),
        });
    }

    fn call_completed(&self, api_name: &str, status: CallStatus, http_status: Option<u16>, _elapsed: Duration) {
        self.record(ContextEventKind::CallCompleted {
            api_name: api_name.to_string(),
            status,
            http_status,
        });
    }

    fn stashed(&self, name: &str) {
        self.record(ContextEventKind::Stashed { name: name.to_string() });
    }

    fn cleared(&self) {
        self.record(ContextEventKind::Cleared);
    }
}
