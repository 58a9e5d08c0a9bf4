// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core grid dialect trait.
//
// A grid dialect adapts one datastore technology to the tuple/association
// model. The trait covers reads, single-item mutations, the optional
// identity-column and optimistic-locking capabilities, and batch execution.
// Dialects are expected to be thread-safe (`Send + Sync`) and fully
// asynchronous.

use async_trait::async_trait;

use crate::batch::{Operation, OperationsQueue};
use crate::context::{AssociationContext, TupleContext};
use crate::error::DialectError;
use crate::model::{Association, AssociationKey, EntityKey, EntityKeyMetadata, Tuple};

fn unsupported(dialect: &str, operation: &'static str) -> DialectError {
    DialectError::Unsupported {
        dialect: dialect.to_string(),
        operation,
    }
}

/// A pluggable datastore adapter.
///
/// Optional capabilities return [`DialectError::Unsupported`] unless the
/// implementation overrides them. Implementations must be safe to share
/// across threads and tokio tasks.
#[async_trait]
pub trait GridDialect: Send + Sync {
    /// A human-readable name for this dialect, used in logging and errors.
    fn name(&self) -> &str;

    /// Load the tuple stored under `key`.
    ///
    /// Returns `Ok(None)` if nothing is stored, rather than an error.
    async fn get_tuple(
        &self,
        key: &EntityKey,
        tuple_context: &TupleContext,
    ) -> Result<Option<Tuple>, DialectError>;

    /// Create a new, not yet stored tuple for `key`.
    async fn create_tuple(
        &self,
        key: &EntityKey,
        tuple_context: &TupleContext,
    ) -> Result<Tuple, DialectError>;

    /// Store `tuple` under `key`, replacing any previous tuple.
    async fn insert_or_update_tuple(
        &self,
        key: &EntityKey,
        tuple: &Tuple,
        tuple_context: &TupleContext,
    ) -> Result<(), DialectError>;

    /// Remove the tuple stored under `key`. Removing a missing tuple is not
    /// an error.
    async fn remove_tuple(
        &self,
        key: &EntityKey,
        tuple_context: &TupleContext,
    ) -> Result<(), DialectError>;

    async fn get_association(
        &self,
        key: &AssociationKey,
        association_context: &AssociationContext,
    ) -> Result<Option<Association>, DialectError>;

    async fn create_association(
        &self,
        key: &AssociationKey,
        association_context: &AssociationContext,
    ) -> Result<Association, DialectError>;

    async fn insert_or_update_association(
        &self,
        key: &AssociationKey,
        association: &Association,
        association_context: &AssociationContext,
    ) -> Result<(), DialectError>;

    async fn remove_association(
        &self,
        key: &AssociationKey,
        association_context: &AssociationContext,
    ) -> Result<(), DialectError>;

    // -- Identity columns ---------------------------------------------------

    /// Create a new tuple for an entity whose key the datastore generates.
    async fn create_tuple_for_metadata(
        &self,
        _metadata: &EntityKeyMetadata,
        _tuple_context: &TupleContext,
    ) -> Result<Tuple, DialectError> {
        Err(unsupported(self.name(), "create_tuple_for_metadata"))
    }

    /// Insert a tuple whose key is generated by the datastore. The generated
    /// key column is written back into `tuple`.
    async fn insert_tuple(
        &self,
        _metadata: &EntityKeyMetadata,
        _tuple: &mut Tuple,
        _tuple_context: &TupleContext,
    ) -> Result<(), DialectError> {
        Err(unsupported(self.name(), "insert_tuple"))
    }

    // -- Optimistic locking -------------------------------------------------

    /// Replace the tuple under `key` with `tuple` if its current columns still
    /// match `old_lock_state`. Returns `Ok(false)` when the check fails.
    async fn update_tuple_with_optimistic_lock(
        &self,
        _key: &EntityKey,
        _old_lock_state: &Tuple,
        _tuple: &Tuple,
        _tuple_context: &TupleContext,
    ) -> Result<bool, DialectError> {
        Err(unsupported(self.name(), "update_tuple_with_optimistic_lock"))
    }

    /// Remove the tuple under `key` if its current columns still match
    /// `old_lock_state`. Returns `Ok(false)` when the check fails.
    async fn remove_tuple_with_optimistic_lock(
        &self,
        _key: &EntityKey,
        _old_lock_state: &Tuple,
        _tuple_context: &TupleContext,
    ) -> Result<bool, DialectError> {
        Err(unsupported(self.name(), "remove_tuple_with_optimistic_lock"))
    }

    // -- Batching -----------------------------------------------------------

    /// Execute every operation pending in `queue`.
    ///
    /// The default applies the operations one at a time through the
    /// single-item methods and stops at the first error. Dialects with a
    /// native batch API should override this.
    async fn execute_batch(&self, queue: &mut OperationsQueue) -> Result<(), DialectError> {
        while let Some(operation) = queue.poll() {
            let mut stack = vec![operation];
            while let Some(operation) = stack.pop() {
                match operation {
                    Operation::InsertOrUpdateTuple {
                        entity_key,
                        tuple,
                        tuple_context,
                    } => {
                        self.insert_or_update_tuple(&entity_key, &tuple, &tuple_context)
                            .await?
                    }
                    Operation::RemoveTuple {
                        entity_key,
                        tuple_context,
                    } => self.remove_tuple(&entity_key, &tuple_context).await?,
                    Operation::InsertOrUpdateAssociation {
                        association_key,
                        association,
                        association_context,
                    } => {
                        self.insert_or_update_association(
                            &association_key,
                            &association,
                            &association_context,
                        )
                        .await?
                    }
                    Operation::RemoveAssociation {
                        association_key,
                        association_context,
                    } => {
                        self.remove_association(&association_key, &association_context)
                            .await?
                    }
                    Operation::GroupedChangesToEntity { operations, .. } => {
                        stack.extend(operations.into_iter().rev())
                    }
                }
            }
        }
        Ok(())
    }
}
