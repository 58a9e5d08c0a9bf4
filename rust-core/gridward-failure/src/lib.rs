// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Gridward Failure Handling
//
// Tracks which grid dialect operations a flush cycle actually applied, so
// that when the flush fails partway an error handler can tell what was
// written before the failure.
//
// # Modules
//
// - [`operation`] -- `GridDialectOperation`, the immutable record of one
//   applied operation.
// - [`collector`] -- `OperationCollector`, the ordered per-flush list.
// - [`scope`] -- Resolution of the current flush cycle's collector.
// - [`dialect`] -- `InvocationCollectingDialect`, the transparent wrapper
//   that records applied operations.
// - [`batch`] -- Recording of batched operations queues.
// - [`handler`] -- `ErrorHandler` and the rollback context it receives.
// - [`flush`] -- `FlushCycle`, which scopes a collector to one unit of work.
// - [`config`] -- `FailureConfig`.
// - [`error`] -- The `FailureError` enum.
//
// # Example
//
// ```rust
// use gridward_dialect::{DialectError, EntityKey, GridDialect, InMemoryDialect, Tuple, TupleContext};
// use gridward_failure::{FailureConfig, FlushCycle, LoggingErrorHandler};
//
// # tokio_test::block_on(async {
// let dialect = FailureConfig::default().build_dialect(InMemoryDialect::new());
// let flush = FlushCycle::new(LoggingErrorHandler);
// let ctx = TupleContext::default();
//
// let result = flush
//     .run(|| async {
//         dialect
//             .insert_or_update_tuple(&EntityKey::single("users", "id", 1_i64), &Tuple::new(), &ctx)
//             .await?;
//         Err::<(), _>(DialectError::BackendUnavailable("node lost".into()))
//     })
//     .await;
//
// // The failure reaches the caller unchanged; the handler has logged the
// // insert that was applied before it.
// assert!(result.is_err());
// # });
// ```

pub mod batch;
pub mod collector;
pub mod config;
pub mod dialect;
pub mod error;
pub mod flush;
pub mod handler;
pub mod operation;
pub mod scope;

// Re-export the most commonly used types at the crate root for convenience.
pub use batch::{applied_operation_for, normalize_batch, NormalizedBatch};
pub use collector::OperationCollector;
pub use config::{ErrorHandlerSetting, FailureConfig};
pub use dialect::InvocationCollectingDialect;
pub use error::FailureError;
pub use flush::FlushCycle;
pub use handler::{ErrorHandler, LoggingErrorHandler, RollbackContext};
pub use operation::{GridDialectOperation, OperationType};
pub use scope::{in_flush_cycle, CollectorResolver, FlushCycleRegistry};
