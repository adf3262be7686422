//! Transport collaborators that actually perform API calls.

mod canned;
mod http;

pub use canned::CannedTransport;
pub use http::HttpTransport;

use thiserror::Error;
use yamlrest_types::{ApiRequest, ApiResponse, Version};

/// Why a call did not produce a successful response.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    /// The service answered with an error status; the response carries its body.
    #[error("api [{api}] returned status {}", response.status)]
    Remote { api: String, response: Box<ApiResponse> },

    /// No response was obtained (connection refused, timeout, unroutable API).
    #[error("api [{api}] failed: {message}")]
    Failed { api: String, message: String },
}

/// Performs a fully resolved API call.
///
/// Implementations block until the call completes.
pub trait Transport {
    fn call_api(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;

    /// Version of the service under test.
    fn server_version(&self) -> Version;
}
