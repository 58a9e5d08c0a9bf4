// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pending operations and the queue that carries them to `execute_batch`.
//
// A queue is filled during a flush, handed to the dialect once, and consumed
// by polling. Once closed it accepts no further operations and yields
// nothing.

use std::collections::VecDeque;

use crate::context::{AssociationContext, TupleContext};
use crate::error::DialectError;
use crate::model::{Association, AssociationKey, EntityKey, Tuple};

/// A mutation waiting in an [`OperationsQueue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    InsertOrUpdateTuple {
        entity_key: EntityKey,
        tuple: Tuple,
        tuple_context: TupleContext,
    },
    RemoveTuple {
        entity_key: EntityKey,
        tuple_context: TupleContext,
    },
    InsertOrUpdateAssociation {
        association_key: AssociationKey,
        association: Association,
        association_context: AssociationContext,
    },
    RemoveAssociation {
        association_key: AssociationKey,
        association_context: AssociationContext,
    },
    /// Several changes to one entity that a document-oriented store applies
    /// as a single write.
    GroupedChangesToEntity {
        entity_key: EntityKey,
        operations: Vec<Operation>,
    },
}

impl Operation {
    pub fn insert_or_update_tuple(entity_key: EntityKey, tuple: Tuple) -> Self {
        Self::InsertOrUpdateTuple {
            entity_key,
            tuple,
            tuple_context: TupleContext::default(),
        }
    }

    pub fn remove_tuple(entity_key: EntityKey) -> Self {
        Self::RemoveTuple {
            entity_key,
            tuple_context: TupleContext::default(),
        }
    }

    pub fn insert_or_update_association(
        association_key: AssociationKey,
        association: Association,
    ) -> Self {
        Self::InsertOrUpdateAssociation {
            association_key,
            association,
            association_context: AssociationContext::default(),
        }
    }

    pub fn remove_association(association_key: AssociationKey) -> Self {
        Self::RemoveAssociation {
            association_key,
            association_context: AssociationContext::default(),
        }
    }

    /// The entity this operation targets, if it is an entity operation.
    pub fn entity_key(&self) -> Option<&EntityKey> {
        match self {
            Self::InsertOrUpdateTuple { entity_key, .. }
            | Self::RemoveTuple { entity_key, .. }
            | Self::GroupedChangesToEntity { entity_key, .. } => Some(entity_key),
            Self::InsertOrUpdateAssociation { .. } | Self::RemoveAssociation { .. } => None,
        }
    }
}

/// FIFO queue of pending operations.
#[derive(Debug, Default)]
pub struct OperationsQueue {
    operations: VecDeque<Operation>,
    closed: bool,
}

impl OperationsQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an operation. Fails with [`DialectError::QueueClosed`] once the
    /// queue has been closed.
    pub fn add(&mut self, operation: Operation) -> Result<(), DialectError> {
        if self.closed {
            return Err(DialectError::QueueClosed);
        }
        self.operations.push_back(operation);
        Ok(())
    }

    /// Remove and return the oldest pending operation.
    ///
    /// A closed queue yields nothing.
    pub fn poll(&mut self) -> Option<Operation> {
        if self.closed {
            return None;
        }
        self.operations.pop_front()
    }

    /// Close the queue, discarding anything still pending.
    pub fn close(&mut self) {
        self.operations.clear();
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Whether any pending operation targets `key`.
    pub fn contains(&self, key: &EntityKey) -> bool {
        self.operations
            .iter()
            .any(|op| op.entity_key() == Some(key))
    }

    /// Consume the pending operations in order by polling.
    ///
    /// The iterator is single-pass: every item it yields has left the queue.
    pub fn drain(&mut self) -> Drain<'_> {
        Drain { queue: self }
    }
}

/// Pull iterator returned by [`OperationsQueue::drain`].
#[derive(Debug)]
pub struct Drain<'a> {
    queue: &'a mut OperationsQueue,
}

impl Iterator for Drain<'_> {
    type Item = Operation;

    fn next(&mut self) -> Option<Operation> {
        self.queue.poll()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.queue.closed { 0 } else { self.queue.len() };
        (remaining, Some(remaining))
    }
}
