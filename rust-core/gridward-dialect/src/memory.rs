// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory grid dialect.
//
// Uses `BTreeMap`s wrapped in a tokio `RwLock` for thread-safe, ordered
// storage of tuples and associations. Supports every optional capability:
// identity columns through per-table sequences, optimistic locking by
// comparing the columns of the expected lock state, and batches applied under
// a single write lock. Intended for testing, development, and small ephemeral
// datasets.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::trace;

use crate::batch::{Operation, OperationsQueue};
use crate::context::{AssociationContext, TupleContext};
use crate::dialect::GridDialect;
use crate::error::DialectError;
use crate::model::{
    Association, AssociationKey, EntityKey, EntityKeyMetadata, KeyValue, Tuple,
};

#[derive(Debug, Default)]
struct State {
    tuples: BTreeMap<EntityKey, Tuple>,
    associations: BTreeMap<AssociationKey, Association>,
    /// Last generated identity value per table.
    sequences: HashMap<String, i64>,
}

impl State {
    fn lock_state_matches(&self, key: &EntityKey, old_lock_state: &Tuple) -> bool {
        match self.tuples.get(key) {
            Some(current) => old_lock_state
                .columns()
                .all(|(column, value)| current.get(column) == Some(value)),
            None => false,
        }
    }

    fn apply(&mut self, operation: Operation) {
        let mut stack = vec![operation];
        while let Some(operation) = stack.pop() {
            match operation {
                Operation::InsertOrUpdateTuple {
                    entity_key, tuple, ..
                } => {
                    self.tuples.insert(entity_key, tuple);
                }
                Operation::RemoveTuple { entity_key, .. } => {
                    self.tuples.remove(&entity_key);
                }
                Operation::InsertOrUpdateAssociation {
                    association_key,
                    association,
                    ..
                } => {
                    self.associations.insert(association_key, association);
                }
                Operation::RemoveAssociation {
                    association_key, ..
                } => {
                    self.associations.remove(&association_key);
                }
                Operation::GroupedChangesToEntity { operations, .. } => {
                    stack.extend(operations.into_iter().rev());
                }
            }
        }
    }
}

/// An in-memory dialect backed by sorted maps.
///
/// All data lives in process memory and is lost on drop. Cloning shares the
/// underlying state.
///
/// # Example
///
/// ```rust
/// use gridward_dialect::{EntityKey, GridDialect, InMemoryDialect, Tuple, TupleContext};
///
/// # tokio_test::block_on(async {
/// let dialect = InMemoryDialect::new();
/// let key = EntityKey::single("users", "id", 1_i64);
/// let ctx = TupleContext::default();
///
/// dialect
///     .insert_or_update_tuple(&key, &Tuple::new().with("name", "Alice"), &ctx)
///     .await
///     .unwrap();
/// let stored = dialect.get_tuple(&key, &ctx).await.unwrap().unwrap();
/// assert_eq!(stored.get("name"), Some(&serde_json::json!("Alice")));
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryDialect {
    state: Arc<RwLock<State>>,
}

impl InMemoryDialect {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tuples.
    pub async fn tuple_count(&self) -> usize {
        self.state.read().await.tuples.len()
    }

    /// Number of stored associations.
    pub async fn association_count(&self) -> usize {
        self.state.read().await.associations.len()
    }
}

#[async_trait]
impl GridDialect for InMemoryDialect {
    fn name(&self) -> &str {
        "in-memory"
    }

    async fn get_tuple(
        &self,
        key: &EntityKey,
        _tuple_context: &TupleContext,
    ) -> Result<Option<Tuple>, DialectError> {
        Ok(self.state.read().await.tuples.get(key).cloned())
    }

    async fn create_tuple(
        &self,
        key: &EntityKey,
        _tuple_context: &TupleContext,
    ) -> Result<Tuple, DialectError> {
        let mut tuple = Tuple::new();
        for (column, value) in key.metadata.column_names.iter().zip(&key.column_values) {
            tuple.put(column.clone(), value.to_json());
        }
        Ok(tuple)
    }

    async fn insert_or_update_tuple(
        &self,
        key: &EntityKey,
        tuple: &Tuple,
        _tuple_context: &TupleContext,
    ) -> Result<(), DialectError> {
        trace!(%key, "insert or update tuple");
        self.state
            .write()
            .await
            .tuples
            .insert(key.clone(), tuple.clone());
        Ok(())
    }

    async fn remove_tuple(
        &self,
        key: &EntityKey,
        _tuple_context: &TupleContext,
    ) -> Result<(), DialectError> {
        trace!(%key, "remove tuple");
        self.state.write().await.tuples.remove(key);
        Ok(())
    }

    async fn get_association(
        &self,
        key: &AssociationKey,
        _association_context: &AssociationContext,
    ) -> Result<Option<Association>, DialectError> {
        Ok(self.state.read().await.associations.get(key).cloned())
    }

    async fn create_association(
        &self,
        _key: &AssociationKey,
        _association_context: &AssociationContext,
    ) -> Result<Association, DialectError> {
        Ok(Association::new())
    }

    async fn insert_or_update_association(
        &self,
        key: &AssociationKey,
        association: &Association,
        _association_context: &AssociationContext,
    ) -> Result<(), DialectError> {
        trace!(%key, rows = association.len(), "insert or update association");
        self.state
            .write()
            .await
            .associations
            .insert(key.clone(), association.clone());
        Ok(())
    }

    async fn remove_association(
        &self,
        key: &AssociationKey,
        _association_context: &AssociationContext,
    ) -> Result<(), DialectError> {
        trace!(%key, "remove association");
        self.state.write().await.associations.remove(key);
        Ok(())
    }

    async fn create_tuple_for_metadata(
        &self,
        _metadata: &EntityKeyMetadata,
        _tuple_context: &TupleContext,
    ) -> Result<Tuple, DialectError> {
        Ok(Tuple::new())
    }

    async fn insert_tuple(
        &self,
        metadata: &EntityKeyMetadata,
        tuple: &mut Tuple,
        _tuple_context: &TupleContext,
    ) -> Result<(), DialectError> {
        let [id_column] = metadata.column_names.as_slice() else {
            return Err(DialectError::InvalidKey(format!(
                "identity key of {} must have exactly one column, found {}",
                metadata.table,
                metadata.column_names.len()
            )));
        };

        let mut state = self.state.write().await;
        let next = state.sequences.get(&metadata.table).copied().unwrap_or(0) + 1;
        let key = EntityKey::new(metadata.clone(), vec![KeyValue::Long(next)]);
        if state.tuples.contains_key(&key) {
            return Err(DialectError::DuplicateKey(key.to_string()));
        }

        tuple.put(id_column.clone(), next);
        state.sequences.insert(metadata.table.clone(), next);
        trace!(%key, "insert tuple with generated key");
        state.tuples.insert(key, tuple.clone());
        Ok(())
    }

    async fn update_tuple_with_optimistic_lock(
        &self,
        key: &EntityKey,
        old_lock_state: &Tuple,
        tuple: &Tuple,
        _tuple_context: &TupleContext,
    ) -> Result<bool, DialectError> {
        let mut state = self.state.write().await;
        if !state.lock_state_matches(key, old_lock_state) {
            trace!(%key, "optimistic lock check failed on update");
            return Ok(false);
        }
        state.tuples.insert(key.clone(), tuple.clone());
        Ok(true)
    }

    async fn remove_tuple_with_optimistic_lock(
        &self,
        key: &EntityKey,
        old_lock_state: &Tuple,
        _tuple_context: &TupleContext,
    ) -> Result<bool, DialectError> {
        let mut state = self.state.write().await;
        if !state.lock_state_matches(key, old_lock_state) {
            trace!(%key, "optimistic lock check failed on remove");
            return Ok(false);
        }
        state.tuples.remove(key);
        Ok(true)
    }

    async fn execute_batch(&self, queue: &mut OperationsQueue) -> Result<(), DialectError> {
        let mut state = self.state.write().await;
        let mut applied = 0usize;
        for operation in queue.drain() {
            state.apply(operation);
            applied += 1;
        }
        trace!(applied, "executed batch");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::model::{AssociationKeyMetadata, RowKey};

    fn key(id: i64) -> EntityKey {
        EntityKey::single("users", "id", id)
    }

    fn association_key(order: i64) -> AssociationKey {
        AssociationKey::new(
            AssociationKeyMetadata::new("order_lines", ["order_id"], ["order_id", "line_no"]),
            vec![KeyValue::Long(order)],
            None,
        )
    }

    #[tokio::test]
    async fn test_tuple_crud() {
        let dialect = InMemoryDialect::new();
        let ctx = TupleContext::default();

        assert_eq!(dialect.get_tuple(&key(1), &ctx).await.unwrap(), None);

        let mut tuple = dialect.create_tuple(&key(1), &ctx).await.unwrap();
        assert_eq!(tuple.get("id"), Some(&json!(1)));
        // Creating does not store.
        assert_eq!(dialect.tuple_count().await, 0);

        tuple.put("name", "Alice");
        dialect.insert_or_update_tuple(&key(1), &tuple, &ctx).await.unwrap();
        assert_eq!(dialect.get_tuple(&key(1), &ctx).await.unwrap(), Some(tuple));

        dialect.remove_tuple(&key(1), &ctx).await.unwrap();
        assert_eq!(dialect.get_tuple(&key(1), &ctx).await.unwrap(), None);

        // Removing a missing tuple is a no-op.
        dialect.remove_tuple(&key(1), &ctx).await.unwrap();
    }

    #[tokio::test]
    async fn test_association_crud() {
        let dialect = InMemoryDialect::new();
        let ctx = AssociationContext::for_role("lines");

        let mut association = dialect
            .create_association(&association_key(7), &ctx)
            .await
            .unwrap();
        assert!(association.is_empty());

        association.put(
            RowKey::new(
                vec!["order_id".into(), "line_no".into()],
                vec![KeyValue::Long(7), KeyValue::Long(1)],
            ),
            Tuple::new().with("sku", "A-1"),
        );
        dialect
            .insert_or_update_association(&association_key(7), &association, &ctx)
            .await
            .unwrap();
        assert_eq!(dialect.association_count().await, 1);
        assert_eq!(
            dialect
                .get_association(&association_key(7), &ctx)
                .await
                .unwrap(),
            Some(association)
        );

        dialect
            .remove_association(&association_key(7), &ctx)
            .await
            .unwrap();
        assert_eq!(dialect.association_count().await, 0);
    }

    #[tokio::test]
    async fn test_insert_tuple_generates_sequential_keys() {
        let dialect = InMemoryDialect::new();
        let ctx = TupleContext::default();
        let metadata = EntityKeyMetadata::new("events", ["id"]);

        let mut first = dialect
            .create_tuple_for_metadata(&metadata, &ctx)
            .await
            .unwrap()
            .with("kind", "login");
        dialect.insert_tuple(&metadata, &mut first, &ctx).await.unwrap();
        let mut second = Tuple::new().with("kind", "logout");
        dialect.insert_tuple(&metadata, &mut second, &ctx).await.unwrap();

        assert_eq!(first.get("id"), Some(&json!(1)));
        assert_eq!(second.get("id"), Some(&json!(2)));

        let stored = dialect
            .get_tuple(&EntityKey::single("events", "id", 2_i64), &ctx)
            .await
            .unwrap();
        assert_eq!(stored, Some(second));
    }

    #[tokio::test]
    async fn test_insert_tuple_rejects_composite_identity() {
        let dialect = InMemoryDialect::new();
        let metadata = EntityKeyMetadata::new("events", ["tenant", "id"]);

        let err = dialect
            .insert_tuple(&metadata, &mut Tuple::new(), &TupleContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DialectError::InvalidKey(_)));
        assert_eq!(dialect.tuple_count().await, 0);
    }

    #[tokio::test]
    async fn test_optimistic_update_and_remove() {
        let dialect = InMemoryDialect::new();
        let ctx = TupleContext::default();
        let v1 = Tuple::new().with("name", "Alice").with("version", 1);
        let v2 = Tuple::new().with("name", "Alicia").with("version", 2);
        let lock_v1 = Tuple::new().with("version", 1);
        let lock_v2 = Tuple::new().with("version", 2);

        // No stored tuple: the lock check cannot pass.
        assert!(!dialect
            .update_tuple_with_optimistic_lock(&key(1), &lock_v1, &v2, &ctx)
            .await
            .unwrap());

        dialect.insert_or_update_tuple(&key(1), &v1, &ctx).await.unwrap();
        assert!(dialect
            .update_tuple_with_optimistic_lock(&key(1), &lock_v1, &v2, &ctx)
            .await
            .unwrap());
        // Stale lock state is rejected.
        assert!(!dialect
            .update_tuple_with_optimistic_lock(&key(1), &lock_v1, &v1, &ctx)
            .await
            .unwrap());
        assert_eq!(dialect.get_tuple(&key(1), &ctx).await.unwrap(), Some(v2));

        assert!(!dialect
            .remove_tuple_with_optimistic_lock(&key(1), &lock_v1, &ctx)
            .await
            .unwrap());
        assert!(dialect
            .remove_tuple_with_optimistic_lock(&key(1), &lock_v2, &ctx)
            .await
            .unwrap());
        assert_eq!(dialect.tuple_count().await, 0);
    }

    #[tokio::test]
    async fn test_execute_batch_applies_in_order() {
        let dialect = InMemoryDialect::new();
        let mut queue = OperationsQueue::new();
        queue
            .add(Operation::insert_or_update_tuple(key(1), Tuple::new().with("n", 1)))
            .unwrap();
        queue
            .add(Operation::insert_or_update_tuple(key(1), Tuple::new().with("n", 2)))
            .unwrap();
        queue
            .add(Operation::insert_or_update_association(
                association_key(3),
                Association::new(),
            ))
            .unwrap();
        queue
            .add(Operation::GroupedChangesToEntity {
                entity_key: key(2),
                operations: vec![
                    Operation::insert_or_update_tuple(key(2), Tuple::new()),
                    Operation::remove_tuple(key(2)),
                ],
            })
            .unwrap();

        dialect.execute_batch(&mut queue).await.unwrap();

        let ctx = TupleContext::default();
        assert!(queue.is_empty());
        assert_eq!(
            dialect.get_tuple(&key(1), &ctx).await.unwrap(),
            Some(Tuple::new().with("n", 2))
        );
        assert_eq!(dialect.get_tuple(&key(2), &ctx).await.unwrap(), None);
        assert_eq!(dialect.association_count().await, 1);
    }

    #[tokio::test]
    async fn test_execute_closed_batch_is_noop() {
        let dialect = InMemoryDialect::new();
        let mut queue = OperationsQueue::new();
        queue.add(Operation::remove_tuple(key(1))).unwrap();
        queue.close();

        dialect.execute_batch(&mut queue).await.unwrap();
        assert!(queue.is_closed());
        assert_eq!(dialect.tuple_count().await, 0);
    }

    #[tokio::test]
    async fn test_clone_shares_state() {
        let dialect = InMemoryDialect::new();
        let clone = dialect.clone();

        dialect
            .insert_or_update_tuple(&key(1), &Tuple::new(), &TupleContext::default())
            .await
            .unwrap();
        assert_eq!(clone.tuple_count().await, 1);
    }

    #[tokio::test]
    async fn test_name() {
        assert_eq!(InMemoryDialect::new().name(), "in-memory");
    }
}
