//! Async runtime bridge for synchronous callers.
//!
//! The execution context is strictly sequential and blocks on every call, while
//! the HTTP client is async. [`BlockingRuntime`] owns a single current-thread
//! Tokio runtime so pooled connections outlive individual calls.

use std::future::Future;

use anyhow::{Context, Result};
use tokio::runtime::{Builder, Runtime};

/// A dedicated runtime used to drive futures to completion from synchronous code.
///
/// Must not be used from inside another Tokio runtime's worker thread.
#[derive(Debug)]
pub struct BlockingRuntime {
    runtime: Runtime,
}

impl BlockingRuntime {
    pub fn new() -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .context("build blocking tokio runtime")?;
        Ok(Self { runtime })
    }

    /// Runs `future` to completion on the owned runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}
