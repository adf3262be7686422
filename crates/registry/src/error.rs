use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading definitions or routing a call.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("api [{name}] is not defined in the registry")]
    UnknownApi { name: String },

    #[error("no path of api [{api}] can be built from params [{params}]")]
    NoMatchingPath { api: String, params: String },

    #[error("api [{api}] declares no http methods")]
    NoMethod { api: String },

    #[error("could not read api definitions from {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid api definitions: {0}")]
    InvalidDefinition(#[from] serde_yaml::Error),
}
