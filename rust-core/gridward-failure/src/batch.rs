// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Translation of a pending-operations queue into applied-operation records.
//!
//! A queue can only be consumed once, so recording a batch means draining it
//! into a replacement queue that is then handed to the real dialect. Both the
//! replacement queue and the record list are built in the same pass and keep
//! the original order.
//!
//! Rebuilding costs one extra allocation per queued operation.

use gridward_dialect::{DialectError, Operation, OperationsQueue};

use crate::operation::GridDialectOperation;

/// Result of [`normalize_batch`].
#[derive(Debug)]
pub struct NormalizedBatch {
    /// Holds the drained operations unchanged and in order.
    pub queue: OperationsQueue,
    /// One record per recordable operation, in queue order.
    pub operations: Vec<GridDialectOperation>,
}

/// The record describing `operation`, or `None` for kinds that are forwarded
/// without being recorded.
pub fn applied_operation_for(operation: &Operation) -> Option<GridDialectOperation> {
    match operation {
        Operation::InsertOrUpdateTuple {
            entity_key, tuple, ..
        } => Some(GridDialectOperation::InsertOrUpdateTuple {
            entity_key: entity_key.clone(),
            tuple: tuple.clone(),
        }),
        Operation::RemoveTuple { entity_key, .. } => Some(GridDialectOperation::RemoveTuple {
            entity_key: entity_key.clone(),
        }),
        Operation::InsertOrUpdateAssociation {
            association_key,
            association,
            ..
        } => Some(GridDialectOperation::InsertOrUpdateAssociation {
            association_key: association_key.clone(),
            association: association.clone(),
        }),
        Operation::RemoveAssociation {
            association_key, ..
        } => Some(GridDialectOperation::RemoveAssociation {
            association_key: association_key.clone(),
        }),
        Operation::GroupedChangesToEntity { .. } => None,
    }
}

/// Drain `queue` into a new queue while recording its operations.
///
/// `queue` is left empty. A closed queue yields nothing, so the result is an
/// empty, open queue; callers that must forward a closed queue as-is check
/// [`OperationsQueue::is_closed`] first.
pub fn normalize_batch(queue: &mut OperationsQueue) -> Result<NormalizedBatch, DialectError> {
    let mut rebuilt = OperationsQueue::new();
    let mut operations = Vec::with_capacity(queue.len());

    for pending in queue.drain() {
        if let Some(applied) = applied_operation_for(&pending) {
            operations.push(applied);
        }
        rebuilt.add(pending)?;
    }

    Ok(NormalizedBatch {
        queue: rebuilt,
        operations,
    })
}
