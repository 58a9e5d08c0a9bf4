// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Operation-collecting wrapper for grid dialects.
//
// Wraps any `GridDialect` and forwards every call unchanged. After a
// mutating call returns successfully, the matching applied-operation record
// is appended to the collector of the current flush cycle. Errors are
// returned as-is and leave the collector untouched, so on failure the
// collector lists exactly the operations that were applied before it.

use async_trait::async_trait;
use tracing::{debug, warn};

use gridward_dialect::{
    Association, AssociationContext, AssociationKey, DialectError, EntityKey, EntityKeyMetadata,
    GridDialect, OperationsQueue, Tuple, TupleContext,
};

use crate::batch::{normalize_batch, NormalizedBatch};
use crate::operation::GridDialectOperation;
use crate::scope::CollectorResolver;

/// A grid dialect wrapper that records applied operations.
///
/// The collector is looked up through the resolver on every mutating call
/// and never stored, because it belongs to a single flush cycle.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use gridward_dialect::{EntityKey, GridDialect, InMemoryDialect, Tuple, TupleContext};
/// use gridward_failure::{in_flush_cycle, FlushCycleRegistry, InvocationCollectingDialect, OperationCollector};
///
/// # tokio_test::block_on(async {
/// let dialect = InvocationCollectingDialect::new(InMemoryDialect::new(), FlushCycleRegistry);
/// let collector = Arc::new(OperationCollector::new());
/// let key = EntityKey::single("users", "id", 1_i64);
///
/// in_flush_cycle(Arc::clone(&collector), async {
///     dialect
///         .insert_or_update_tuple(&key, &Tuple::new(), &TupleContext::default())
///         .await
///         .unwrap();
/// })
/// .await;
///
/// assert_eq!(collector.len().await, 1);
/// # });
/// ```
pub struct InvocationCollectingDialect<D: GridDialect, R: CollectorResolver> {
    /// The wrapped dialect that performs the actual datastore operations.
    inner: D,
    /// Consulted for the current collector on every mutating call.
    resolver: R,
}

impl<D: GridDialect, R: CollectorResolver> InvocationCollectingDialect<D, R> {
    pub fn new(inner: D, resolver: R) -> Self {
        Self { inner, resolver }
    }

    /// Return a reference to the inner dialect.
    pub fn inner(&self) -> &D {
        &self.inner
    }

    async fn handle_applied_operation(&self, operation: GridDialectOperation) {
        match self.resolver.current_collector() {
            Some(collector) => {
                debug!(
                    flush_id = %collector.id(),
                    operation = %operation.operation_type(),
                    "collected applied operation"
                );
                collector.add_applied_operation(operation).await;
            }
            None => warn!(
                dialect = self.inner.name(),
                operation = %operation.operation_type(),
                "operation applied outside of a flush cycle; not collected"
            ),
        }
    }
}

#[async_trait]
impl<D: GridDialect, R: CollectorResolver> GridDialect for InvocationCollectingDialect<D, R> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn get_tuple(
        &self,
        key: &EntityKey,
        tuple_context: &TupleContext,
    ) -> Result<Option<Tuple>, DialectError> {
        self.inner.get_tuple(key, tuple_context).await
    }

    async fn create_tuple(
        &self,
        key: &EntityKey,
        tuple_context: &TupleContext,
    ) -> Result<Tuple, DialectError> {
        let tuple = self.inner.create_tuple(key, tuple_context).await?;
        self.handle_applied_operation(GridDialectOperation::CreateTupleWithKey {
            entity_key: key.clone(),
        })
        .await;
        Ok(tuple)
    }

    async fn insert_or_update_tuple(
        &self,
        key: &EntityKey,
        tuple: &Tuple,
        tuple_context: &TupleContext,
    ) -> Result<(), DialectError> {
        self.inner
            .insert_or_update_tuple(key, tuple, tuple_context)
            .await?;
        self.handle_applied_operation(GridDialectOperation::InsertOrUpdateTuple {
            entity_key: key.clone(),
            tuple: tuple.clone(),
        })
        .await;
        Ok(())
    }

    async fn remove_tuple(
        &self,
        key: &EntityKey,
        tuple_context: &TupleContext,
    ) -> Result<(), DialectError> {
        self.inner.remove_tuple(key, tuple_context).await?;
        self.handle_applied_operation(GridDialectOperation::RemoveTuple {
            entity_key: key.clone(),
        })
        .await;
        Ok(())
    }

    async fn get_association(
        &self,
        key: &AssociationKey,
        association_context: &AssociationContext,
    ) -> Result<Option<Association>, DialectError> {
        self.inner.get_association(key, association_context).await
    }

    async fn create_association(
        &self,
        key: &AssociationKey,
        association_context: &AssociationContext,
    ) -> Result<Association, DialectError> {
        let association = self
            .inner
            .create_association(key, association_context)
            .await?;
        self.handle_applied_operation(GridDialectOperation::CreateAssociationWithKey {
            association_key: key.clone(),
        })
        .await;
        Ok(association)
    }

    async fn insert_or_update_association(
        &self,
        key: &AssociationKey,
        association: &Association,
        association_context: &AssociationContext,
    ) -> Result<(), DialectError> {
        self.inner
            .insert_or_update_association(key, association, association_context)
            .await?;
        self.handle_applied_operation(GridDialectOperation::InsertOrUpdateAssociation {
            association_key: key.clone(),
            association: association.clone(),
        })
        .await;
        Ok(())
    }

    async fn remove_association(
        &self,
        key: &AssociationKey,
        association_context: &AssociationContext,
    ) -> Result<(), DialectError> {
        self.inner
            .remove_association(key, association_context)
            .await?;
        self.handle_applied_operation(GridDialectOperation::RemoveAssociation {
            association_key: key.clone(),
        })
        .await;
        Ok(())
    }

    async fn create_tuple_for_metadata(
        &self,
        metadata: &EntityKeyMetadata,
        tuple_context: &TupleContext,
    ) -> Result<Tuple, DialectError> {
        let tuple = self
            .inner
            .create_tuple_for_metadata(metadata, tuple_context)
            .await?;
        self.handle_applied_operation(GridDialectOperation::CreateTuple {
            entity_key_metadata: metadata.clone(),
        })
        .await;
        Ok(tuple)
    }

    async fn insert_tuple(
        &self,
        metadata: &EntityKeyMetadata,
        tuple: &mut Tuple,
        tuple_context: &TupleContext,
    ) -> Result<(), DialectError> {
        self.inner
            .insert_tuple(metadata, tuple, tuple_context)
            .await?;
        // Recorded after the call so the generated key column is included.
        self.handle_applied_operation(GridDialectOperation::InsertTuple {
            entity_key_metadata: metadata.clone(),
            tuple: tuple.clone(),
        })
        .await;
        Ok(())
    }

    async fn update_tuple_with_optimistic_lock(
        &self,
        key: &EntityKey,
        old_lock_state: &Tuple,
        tuple: &Tuple,
        tuple_context: &TupleContext,
    ) -> Result<bool, DialectError> {
        let success = self
            .inner
            .update_tuple_with_optimistic_lock(key, old_lock_state, tuple, tuple_context)
            .await?;

        if success {
            self.handle_applied_operation(GridDialectOperation::UpdateTupleWithOptimisticLock {
                entity_key: key.clone(),
                old_lock_state: old_lock_state.clone(),
                tuple: tuple.clone(),
            })
            .await;
        }

        Ok(success)
    }

    async fn remove_tuple_with_optimistic_lock(
        &self,
        key: &EntityKey,
        old_lock_state: &Tuple,
        tuple_context: &TupleContext,
    ) -> Result<bool, DialectError> {
        let success = self
            .inner
            .remove_tuple_with_optimistic_lock(key, old_lock_state, tuple_context)
            .await?;

        if success {
            self.handle_applied_operation(GridDialectOperation::RemoveTupleWithOptimisticLock {
                entity_key: key.clone(),
                old_lock_state: old_lock_state.clone(),
            })
            .await;
        }

        Ok(success)
    }

    async fn execute_batch(&self, queue: &mut OperationsQueue) -> Result<(), DialectError> {
        // A closed queue has already been executed; hand it over untouched.
        if queue.is_closed() {
            self.inner.execute_batch(queue).await?;
            self.handle_applied_operation(GridDialectOperation::ExecuteBatch {
                operations: Vec::new(),
            })
            .await;
            return Ok(());
        }

        let NormalizedBatch {
            queue: mut rebuilt,
            operations,
        } = normalize_batch(queue)?;

        // Whatever the dialect leaves in the forwarded queue is handed back
        // to the caller, on success and on failure alike.
        let result = self.inner.execute_batch(&mut rebuilt).await;
        std::mem::swap(queue, &mut rebuilt);
        result?;
        self.handle_applied_operation(GridDialectOperation::ExecuteBatch { operations })
            .await;
        Ok(())
    }
}
