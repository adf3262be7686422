//! Shared type definitions for the yamlrest workspace.
//!
//! These models cross crate boundaries: the engine builds [`ApiRequest`]s,
//! transports answer with [`ApiResponse`]s, the registry describes
//! [`ApiEndpoint`]s and the configuration layer carries [`DefaultParam`] rules.

pub mod defaults;
pub mod endpoint;
pub mod request;
pub mod response;
pub mod version;

pub use defaults::{DefaultParam, DefaultParamExemption};
pub use endpoint::{ApiEndpoint, path_parts};
pub use request::{ApiRequest, JSON_CONTENT_TYPE, RequestEntity};
pub use response::ApiResponse;
pub use version::{Version, VersionParseError};
