// SPDX-License-Identifier: PMPL-1.0-or-later
//! Error types for failure handling setup and diagnostics.
//!
//! Dialect errors are never wrapped in these; they travel unchanged as
//! [`gridward_dialect::DialectError`].

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FailureError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
