// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Resolution of the collector that belongs to the running flush cycle.
//!
//! The collecting dialect asks a [`CollectorResolver`] for the current
//! collector on every mutating call and never keeps the answer. The default
//! resolver, [`FlushCycleRegistry`], reads a tokio task-local slot that
//! [`in_flush_cycle`] binds for the duration of one future. Tasks spawned
//! from inside a flush cycle do not inherit the binding, so concurrent flush
//! cycles can never observe each other's collector.

use std::future::Future;
use std::sync::Arc;

use crate::collector::OperationCollector;

tokio::task_local! {
    static CURRENT_COLLECTOR: Arc<OperationCollector>;
}

/// Looks up the collector of the flush cycle active on the calling task.
pub trait CollectorResolver: Send + Sync {
    /// Returns `None` when no flush cycle is active.
    fn current_collector(&self) -> Option<Arc<OperationCollector>>;
}

impl<F> CollectorResolver for F
where
    F: Fn() -> Option<Arc<OperationCollector>> + Send + Sync,
{
    fn current_collector(&self) -> Option<Arc<OperationCollector>> {
        self()
    }
}

/// Resolver backed by the task-local slot bound by [`in_flush_cycle`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FlushCycleRegistry;

impl CollectorResolver for FlushCycleRegistry {
    fn current_collector(&self) -> Option<Arc<OperationCollector>> {
        CURRENT_COLLECTOR.try_with(Arc::clone).ok()
    }
}

/// Run `work` with `collector` bound as the current flush cycle's collector.
///
/// Bindings nest: an inner call shadows the outer collector until its future
/// completes.
pub async fn in_flush_cycle<F>(collector: Arc<OperationCollector>, work: F) -> F::Output
where
    F: Future,
{
    CURRENT_COLLECTOR.scope(collector, work).await
}
