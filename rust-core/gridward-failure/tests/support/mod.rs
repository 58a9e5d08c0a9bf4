// SPDX-License-Identifier: PMPL-1.0-or-later
//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use gridward_dialect::{
    Association, AssociationContext, AssociationKey, AssociationKeyMetadata, DialectError,
    EntityKey, EntityKeyMetadata, GridDialect, InMemoryDialect, KeyValue, Operation,
    OperationsQueue, Tuple, TupleContext,
};

/// What the probe saw arrive at `execute_batch`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceivedBatch {
    pub closed: bool,
    pub operations: Vec<Operation>,
}

/// An in-memory dialect that fails on poisoned keys and remembers every
/// batch it was handed.
#[derive(Default)]
pub struct ProbeDialect {
    pub inner: InMemoryDialect,
    poisoned: Mutex<HashSet<String>>,
    batches: Mutex<Vec<ReceivedBatch>>,
}

impl ProbeDialect {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every mutation of `key` fail with `BackendUnavailable`.
    pub fn poison(&self, key: impl ToString) {
        self.poisoned.lock().unwrap().insert(key.to_string());
    }

    pub fn received_batches(&self) -> Vec<ReceivedBatch> {
        self.batches.lock().unwrap().clone()
    }

    fn check(&self, key: &impl ToString) -> Result<(), DialectError> {
        let key = key.to_string();
        if self.poisoned.lock().unwrap().contains(&key) {
            return Err(DialectError::BackendUnavailable(format!("write to {key} failed")));
        }
        Ok(())
    }

    fn check_operation(&self, operation: &Operation) -> Result<(), DialectError> {
        match operation {
            Operation::InsertOrUpdateTuple { entity_key, .. }
            | Operation::RemoveTuple { entity_key, .. }
            | Operation::GroupedChangesToEntity { entity_key, .. } => self.check(entity_key),
            Operation::InsertOrUpdateAssociation {
                association_key, ..
            }
            | Operation::RemoveAssociation {
                association_key, ..
            } => self.check(association_key),
        }
    }
}

#[async_trait]
impl GridDialect for ProbeDialect {
    fn name(&self) -> &str {
        "probe"
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
        self.check(key)?;
        self.inner.create_tuple(key, tuple_context).await
    }

    async fn insert_or_update_tuple(
        &self,
        key: &EntityKey,
        tuple: &Tuple,
        tuple_context: &TupleContext,
    ) -> Result<(), DialectError> {
        self.check(key)?;
        self.inner
            .insert_or_update_tuple(key, tuple, tuple_context)
            .await
    }

    async fn remove_tuple(
        &self,
        key: &EntityKey,
        tuple_context: &TupleContext,
    ) -> Result<(), DialectError> {
        self.check(key)?;
        self.inner.remove_tuple(key, tuple_context).await
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
        self.check(key)?;
        self.inner.create_association(key, association_context).await
    }

    async fn insert_or_update_association(
        &self,
        key: &AssociationKey,
        association: &Association,
        association_context: &AssociationContext,
    ) -> Result<(), DialectError> {
        self.check(key)?;
        self.inner
            .insert_or_update_association(key, association, association_context)
            .await
    }

    async fn remove_association(
        &self,
        key: &AssociationKey,
        association_context: &AssociationContext,
    ) -> Result<(), DialectError> {
        self.check(key)?;
        self.inner.remove_association(key, association_context).await
    }

    async fn create_tuple_for_metadata(
        &self,
        metadata: &EntityKeyMetadata,
        tuple_context: &TupleContext,
    ) -> Result<Tuple, DialectError> {
        self.inner
            .create_tuple_for_metadata(metadata, tuple_context)
            .await
    }

    async fn insert_tuple(
        &self,
        metadata: &EntityKeyMetadata,
        tuple: &mut Tuple,
        tuple_context: &TupleContext,
    ) -> Result<(), DialectError> {
        self.check(&metadata.table)?;
        self.inner.insert_tuple(metadata, tuple, tuple_context).await
    }

    async fn update_tuple_with_optimistic_lock(
        &self,
        key: &EntityKey,
        old_lock_state: &Tuple,
        tuple: &Tuple,
        tuple_context: &TupleContext,
    ) -> Result<bool, DialectError> {
        self.check(key)?;
        self.inner
            .update_tuple_with_optimistic_lock(key, old_lock_state, tuple, tuple_context)
            .await
    }

    async fn remove_tuple_with_optimistic_lock(
        &self,
        key: &EntityKey,
        old_lock_state: &Tuple,
        tuple_context: &TupleContext,
    ) -> Result<bool, DialectError> {
        self.check(key)?;
        self.inner
            .remove_tuple_with_optimistic_lock(key, old_lock_state, tuple_context)
            .await
    }

    async fn execute_batch(&self, queue: &mut OperationsQueue) -> Result<(), DialectError> {
        if queue.is_closed() {
            self.batches.lock().unwrap().push(ReceivedBatch {
                closed: true,
                operations: Vec::new(),
            });
            return self.inner.execute_batch(queue).await;
        }

        let operations: Vec<Operation> = queue.drain().collect();
        self.batches.lock().unwrap().push(ReceivedBatch {
            closed: false,
            operations: operations.clone(),
        });

        for operation in &operations {
            self.check_operation(operation)?;
        }
        let mut forwarded = OperationsQueue::new();
        for operation in operations {
            forwarded.add(operation)?;
        }
        self.inner.execute_batch(&mut forwarded).await
    }
}

/// A dialect that keeps the trait's default `execute_batch`, so a failing
/// item leaves the rest of the queue pending.
#[derive(Default)]
pub struct SequentialDialect {
    pub inner: InMemoryDialect,
    failing: Mutex<HashSet<String>>,
}

impl SequentialDialect {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(&self, key: impl ToString) {
        self.failing.lock().unwrap().insert(key.to_string());
    }

    fn check(&self, key: &impl ToString) -> Result<(), DialectError> {
        let key = key.to_string();
        if self.failing.lock().unwrap().contains(&key) {
            return Err(DialectError::BackendUnavailable(format!("write to {key} failed")));
        }
        Ok(())
    }
}

#[async_trait]
impl GridDialect for SequentialDialect {
    fn name(&self) -> &str {
        "sequential"
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
        self.inner.create_tuple(key, tuple_context).await
    }

    async fn insert_or_update_tuple(
        &self,
        key: &EntityKey,
        tuple: &Tuple,
        tuple_context: &TupleContext,
    ) -> Result<(), DialectError> {
        self.check(key)?;
        self.inner
            .insert_or_update_tuple(key, tuple, tuple_context)
            .await
    }

    async fn remove_tuple(
        &self,
        key: &EntityKey,
        tuple_context: &TupleContext,
    ) -> Result<(), DialectError> {
        self.check(key)?;
        self.inner.remove_tuple(key, tuple_context).await
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
        self.inner.create_association(key, association_context).await
    }

    async fn insert_or_update_association(
        &self,
        key: &AssociationKey,
        association: &Association,
        association_context: &AssociationContext,
    ) -> Result<(), DialectError> {
        self.check(key)?;
        self.inner
            .insert_or_update_association(key, association, association_context)
            .await
    }

    async fn remove_association(
        &self,
        key: &AssociationKey,
        association_context: &AssociationContext,
    ) -> Result<(), DialectError> {
        self.check(key)?;
        self.inner.remove_association(key, association_context).await
    }
}

pub fn user_key(id: i64) -> EntityKey {
    EntityKey::single("users", "id", id)
}

pub fn role_key(user: i64) -> AssociationKey {
    AssociationKey::new(
        AssociationKeyMetadata::new("user_roles", ["user_id"], ["user_id", "role"]),
        vec![KeyValue::Long(user)],
        Some(user_key(user)),
    )
}
