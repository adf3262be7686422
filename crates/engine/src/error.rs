use thiserror::Error;
use yamlrest_types::ApiResponse;

use crate::stash::StashError;

/// Errors surfaced by [`crate::ExecutionContext`].
#[derive(Debug, Error)]
pub enum ContextError {
    #[error(transparent)]
    Stash(#[from] StashError),

    #[error("call to [{api}] failed: {message}")]
    TransportFailure { api: String, message: String },

    /// The service answered with an error. The response is already the
    /// context's last response when this is returned.
    #[error("call to [{api}] returned status {status}")]
    RemoteError {
        api: String,
        status: u16,
        response: Box<ApiResponse>,
    },

    #[error("no response available to evaluate path [{path}]")]
    NoResponseAvailable { path: String },

    #[error("path [{path}] not found in last response")]
    PathNotFound { path: String },

    #[error("failed to serialize request body: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ContextError {
    pub fn is_remote(&self) -> bool {
        matches!(self, ContextError::RemoteError { .. })
    }
}
