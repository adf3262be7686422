//! # yamlrest Engine
//!
//! Runtime core of a declarative REST test harness. Test authors describe
//! "call this API with these parameters and body, then take this value from
//! the response", and the engine threads values between the steps.
//!
//! ## Key Features
//!
//! - **Stash**: named values captured from responses, referenced as `$name`
//!   or interpolated as `${name}` in later params, headers, and bodies
//! - **Request building**: reference resolution, default params, and
//!   single or newline-delimited JSON payloads
//! - **Call dispatch**: every call replaces the last response and stashes
//!   its body, including captured error responses
//! - **Response access**: dotted paths into the last response body
//!
//! ## Usage
//!
//! ```rust
//! use indexmap::IndexMap;
//! use serde_json::json;
//! use yamlrest_engine::{CannedTransport, ExecutionContext};
//! use yamlrest_types::ApiResponse;
//!
//! let transport = CannedTransport::default().respond(ApiResponse::new(201, json!({"_id": "abc"})));
//! let mut context = ExecutionContext::new(transport);
//!
//! let mut params = IndexMap::new();
//! params.insert("index".to_string(), "test".to_string());
//! context.call_api("index", &params, &[json!({"title": "hi"})], &IndexMap::new())?;
//!
//! context.set_from_response("_id", "doc_id")?;
//! assert_eq!(context.stash().get("$doc_id")?, json!("abc"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - **`stash`** / **`object_path`**: variables and dotted-path navigation
//! - **`request`**: request building and default params
//! - **`context`**: the execution context
//! - **`transport`**: the transport trait, HTTP and in-memory implementations
//! - **`telemetry`**: observer hooks
//! - **`config`**, **`model`**, **`runner`**: configuration and step scripts

pub mod config;
pub mod context;
pub mod error;
pub mod model;
pub mod object_path;
pub mod request;
pub mod runner;
pub mod stash;
pub mod telemetry;
pub mod transport;

pub use config::HarnessConfig;
pub use context::{ExecutionContext, LastResponse};
pub use error::ContextError;
pub use model::{DoStep, ScriptStep, TestScript, parse_script_file, parse_script_str};
pub use request::{BuiltRequest, DefaultParams, RequestBuilder};
pub use runner::{StepReport, StepStatus, run_script};
pub use stash::{BODY_KEY, Stash, StashError};
pub use telemetry::{CallStatus, ContextEvent, ContextEventKind, ContextObserver, RecordingObserver, TracingObserver};
pub use transport::{CannedTransport, HttpTransport, Transport, TransportError};
