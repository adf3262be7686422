//! Registry of API endpoint definitions.
//!
//! Maps logical API names (`index`, `cluster.put_settings`, ...) to the HTTP
//! methods and path templates the service exposes, and selects a concrete
//! route for a set of resolved call parameters.

pub mod error;
pub mod models;
pub mod routing;

pub use error::RegistryError;
pub use models::ApiRegistry;
pub use routing::ResolvedRoute;
