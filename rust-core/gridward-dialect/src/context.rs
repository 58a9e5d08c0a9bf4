// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-call contexts passed alongside every dialect operation. They carry
// hints for the datastore and are never interpreted by decorators.

use serde::{Deserialize, Serialize};

/// Read-only context for tuple operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TupleContext {
    /// Columns the caller intends to read back, if known.
    pub selectable_columns: Vec<String>,
}

impl TupleContext {
    pub fn new<I, S>(selectable_columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            selectable_columns: selectable_columns.into_iter().map(Into::into).collect(),
        }
    }
}

/// Read-only context for association operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationContext {
    /// Property name of the association on the owning entity.
    pub role: Option<String>,
}

impl AssociationContext {
    pub fn for_role(role: impl Into<String>) -> Self {
        Self {
            role: Some(role.into()),
        }
    }
}
