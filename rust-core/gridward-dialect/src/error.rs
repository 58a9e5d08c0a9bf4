// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Error types for grid dialects.
//
// A single enum covers the failure modes a dialect reports to its caller:
// missing capabilities, closed queues, malformed keys, key collisions and
// backend unavailability. Decorators forward these values untouched.

use thiserror::Error;

/// Errors that can occur when interacting with a grid dialect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DialectError {
    /// The dialect does not implement an optional capability.
    #[error("dialect {dialect} does not support {operation}")]
    Unsupported {
        /// Name of the dialect that rejected the call.
        dialect: String,
        /// The operation that was requested.
        operation: &'static str,
    },

    /// An operation was added to a queue that has already been closed.
    #[error("operations queue is closed")]
    QueueClosed,

    /// A key does not have the shape the dialect expects.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// An insert collided with an existing entry.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// The datastore behind the dialect cannot be reached.
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Failed to serialize or deserialize a value.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for DialectError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
