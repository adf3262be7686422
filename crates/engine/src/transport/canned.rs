use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, PoisonError},
};

use serde_json::{Map, Value};
use yamlrest_types::{ApiRequest, ApiResponse, Version};

use super::{Transport, TransportError};

/// In-memory transport replaying queued outcomes.
///
/// Once the queue is exhausted every call is echoed back as a `200` whose
/// body describes the request, which makes it usable for dry runs.
/// Clones share the queue and the request log.
#[derive(Debug, Clone)]
pub struct CannedTransport {
    outcomes: Arc<Mutex<VecDeque<Result<ApiResponse, TransportError>>>>,
    requests: Arc<Mutex<Vec<ApiRequest>>>,
    version: Version,
}

impl Default for CannedTransport {
    /// Reports a current service version, so no legacy exemptions apply.
    fn default() -> Self {
        Self::new(Version::new(8, 0, 0))
    }
}

impl CannedTransport {
    pub fn new(version: Version) -> Self {
        Self {
            outcomes: Arc::default(),
            requests: Arc::default(),
            version,
        }
    }

    pub fn respond(self, response: ApiResponse) -> Self {
        self.push(Ok(response));
        self
    }

    /// Queues a remote error carrying `response`.
    pub fn respond_error(self, api: &str, response: ApiResponse) -> Self {
        self.push(Err(TransportError::Remote {
            api: api.to_string(),
            response: Box::new(response),
        }));
        self
    }

    /// Queues a failure without any response.
    pub fn fail(self, api: &str, message: &str) -> Self {
        self.push(Err(TransportError::Failed {
            api: api.to_string(),
            message: message.to_string(),
        }));
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn push(&self, outcome: Result<ApiResponse, TransportError>) {
        self.outcomes.lock().unwrap_or_else(PoisonError::into_inner).push_back(outcome);
    }
}

impl Transport for CannedTransport {
    fn call_api(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).push(request.clone());
        let queued = self.outcomes.lock().unwrap_or_else(PoisonError::into_inner).pop_front();
        queued.unwrap_or_else(|| Ok(echo(request)))
    }

    fn server_version(&self) -> Version {
        self.version
    }
}

fn echo(request: &ApiRequest) -> ApiResponse {
    let mut body = Map::new();
    body.insert("api".into(), Value::String(request.api_name.clone()));
    body.insert(
        "params".into(),
        Value::Object(request.params.iter().map(|(k, v)| (k.clone(), Value::String(v.clone()))).collect()),
    );
    if let Some(entity) = &request.entity {
        body.insert("body".into(), Value::String(entity.body.clone()));
    }
    ApiResponse::new(200, Value::Object(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn replays_queue_then_echoes() {
        let transport = CannedTransport::default()
            .respond(ApiResponse::new(201, json!({"result": "created"})))
            .fail("get", "connection refused");
        let request = ApiRequest {
            api_name: "get".into(),
            ..ApiRequest::default()
        };

        assert_eq!(transport.call_api(&request).unwrap().status, 201);
        assert!(matches!(transport.call_api(&request), Err(TransportError::Failed { .. })));
        let echoed = transport.call_api(&request).unwrap();
        assert_eq!(echoed.body, json!({"api": "get", "params": {}}));
        assert_eq!(transport.requests().len(), 3);
    }
}
