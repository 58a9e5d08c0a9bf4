// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Gridward Dialect Contracts
//
// This crate defines the pluggable datastore interface that Gridward sits in
// front of. The core `GridDialect` trait defines the contract every datastore
// adapter implements; the decorators in `gridward-failure` wrap it without
// changing its behaviour.
//
// # Modules
//
// - [`dialect`] -- The `GridDialect` trait.
// - [`model`] -- Entity keys, association keys, tuples and associations.
// - [`context`] -- Opaque per-call contexts.
// - [`batch`] -- Pending operations and the `OperationsQueue`.
// - [`error`] -- The `DialectError` enum covering all dialect failure modes.
// - [`memory`] -- An in-memory dialect for testing and ephemeral workloads.
//
// # Example
//
// ```rust
// use gridward_dialect::{EntityKey, GridDialect, InMemoryDialect, Operation, OperationsQueue, Tuple};
//
// # tokio_test::block_on(async {
// let dialect = InMemoryDialect::new();
//
// let mut queue = OperationsQueue::new();
// queue
//     .add(Operation::insert_or_update_tuple(
//         EntityKey::single("users", "id", 1_i64),
//         Tuple::new().with("name", "Alice"),
//     ))
//     .unwrap();
// dialect.execute_batch(&mut queue).await.unwrap();
//
// assert_eq!(dialect.tuple_count().await, 1);
// # });
// ```

pub mod batch;
pub mod context;
pub mod dialect;
pub mod error;
pub mod memory;
pub mod model;

// Re-export the most commonly used types at the crate root for convenience.
pub use batch::{Operation, OperationsQueue};
pub use context::{AssociationContext, TupleContext};
pub use dialect::GridDialect;
pub use error::DialectError;
pub use memory::InMemoryDialect;
pub use model::{
    Association, AssociationKey, AssociationKeyMetadata, EntityKey, EntityKeyMetadata, KeyValue,
    RowKey, Tuple,
};
