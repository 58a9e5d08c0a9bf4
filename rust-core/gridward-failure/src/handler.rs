// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Error handlers notified when a flush cycle fails.
//!
//! A handler receives the operations that were applied before the failure,
//! in order. It observes only: the failure is returned to the caller
//! regardless of what the handler does.

use std::error::Error;
use std::sync::Arc;

use tracing::error;
use uuid::Uuid;

use crate::operation::GridDialectOperation;

/// What an [`ErrorHandler`] learns about a failed flush cycle.
#[derive(Debug)]
pub struct RollbackContext<'a> {
    /// Id of the collector that gathered the operations.
    pub flush_id: Uuid,
    /// Operations applied before the failure, oldest first.
    pub applied_operations: Vec<GridDialectOperation>,
    /// The error that ended the flush cycle.
    pub failure: &'a dyn Error,
}

/// Receives the applied operations of a failed flush cycle.
pub trait ErrorHandler: Send + Sync {
    fn on_rollback(&self, context: &RollbackContext<'_>);
}

impl<H: ErrorHandler + ?Sized> ErrorHandler for Arc<H> {
    fn on_rollback(&self, context: &RollbackContext<'_>) {
        (**self).on_rollback(context)
    }
}

/// Logs every applied operation of a failed flush cycle at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingErrorHandler;

impl ErrorHandler for LoggingErrorHandler {
    fn on_rollback(&self, context: &RollbackContext<'_>) {
        error!(
            flush_id = %context.flush_id,
            failure = %context.failure,
            applied = context.applied_operations.len(),
            "flush cycle failed"
        );
        for (index, operation) in context.applied_operations.iter().enumerate() {
            error!(
                flush_id = %context.flush_id,
                index,
                %operation,
                "operation applied before failure"
            );
        }
    }
}
