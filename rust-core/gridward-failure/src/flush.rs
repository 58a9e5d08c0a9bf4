// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Flush-cycle runner.
//!
//! # Lifecycle
//!
//! ```text
//! run() ──> new collector ──> bind to task ──> work ──┬── Ok  ──> drop collector
//!                                                     └── Err ──> handler.on_rollback()
//!                                                                 ──> drop collector
//! ```
//!
//! The collector lives exactly as long as one call to [`FlushCycle::run`].

use std::error::Error;
use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use crate::collector::OperationCollector;
use crate::handler::{ErrorHandler, RollbackContext};
use crate::scope::in_flush_cycle;

/// Runs units of work as flush cycles and reports failures to an
/// [`ErrorHandler`].
#[derive(Debug, Clone)]
pub struct FlushCycle<H: ErrorHandler> {
    handler: H,
}

impl<H: ErrorHandler> FlushCycle<H> {
    pub fn new(handler: H) -> Self {
        Self { handler }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// Run `work` with a fresh collector bound to the current task.
    ///
    /// On `Err` the handler is given the operations applied so far; the error
    /// itself is returned unchanged.
    pub async fn run<F, Fut, T, E>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Error + 'static,
    {
        let collector = Arc::new(OperationCollector::new());
        let flush_id = collector.id();
        debug!(%flush_id, "flush cycle started");

        match in_flush_cycle(Arc::clone(&collector), work()).await {
            Ok(value) => {
                debug!(%flush_id, applied = collector.len().await, "flush cycle completed");
                Ok(value)
            }
            Err(failure) => {
                let context = RollbackContext {
                    flush_id,
                    applied_operations: collector.applied_operations().await,
                    failure: &failure,
                };
                self.handler.on_rollback(&context);
                Err(failure)
            }
        }
    }
}
