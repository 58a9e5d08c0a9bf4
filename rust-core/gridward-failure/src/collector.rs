// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-flush-cycle accumulator of applied operations.
//
// One collector exists per flush cycle. It is appended to in call order by
// the collecting dialect and read by the error handler when the flush fails.
// It is never reused for another flush cycle.

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::FailureError;
use crate::operation::GridDialectOperation;

/// Ordered, append-only list of the operations applied during one flush
/// cycle.
///
/// Repeated operations on the same key are kept as separate entries; the
/// collector never merges or deduplicates.
///
/// # Example
///
/// ```rust
/// use gridward_dialect::EntityKey;
/// use gridward_failure::{GridDialectOperation, OperationCollector};
///
/// # tokio_test::block_on(async {
/// let collector = OperationCollector::new();
/// collector
///     .add_applied_operation(GridDialectOperation::RemoveTuple {
///         entity_key: EntityKey::single("users", "id", 1_i64),
///     })
///     .await;
///
/// assert_eq!(collector.len().await, 1);
/// # });
/// ```
#[derive(Debug)]
pub struct OperationCollector {
    /// Identifies the flush cycle in logs.
    id: Uuid,
    applied: RwLock<Vec<GridDialectOperation>>,
}

impl OperationCollector {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            applied: RwLock::new(Vec::new()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Append an applied operation to the end of the list.
    pub async fn add_applied_operation(&self, operation: GridDialectOperation) {
        self.applied.write().await.push(operation);
    }

    /// Snapshot of the applied operations, in the order they were applied.
    pub async fn applied_operations(&self) -> Vec<GridDialectOperation> {
        self.applied.read().await.clone()
    }

    /// The most recently applied operation.
    pub async fn last_applied(&self) -> Option<GridDialectOperation> {
        self.applied.read().await.last().cloned()
    }

    pub async fn len(&self) -> usize {
        self.applied.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.applied.read().await.is_empty()
    }

    /// Render the applied operations as a JSON array for diagnostics.
    pub async fn to_json(&self) -> Result<String, FailureError> {
        let applied = self.applied.read().await;
        Ok(serde_json::to_string_pretty(&*applied)?)
    }
}

impl Default for OperationCollector {
    fn default() -> Self {
        Self::new()
    }
}
