// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Records of grid dialect operations that were applied.
//!
//! Each variant describes one successful dialect call and owns copies of the
//! keys and payloads that were passed to (or returned by) it. Records carry
//! no timing or flush-cycle information; the [`crate::OperationCollector`]
//! that holds them supplies that context.

use std::fmt;

use serde::{Deserialize, Serialize};

use gridward_dialect::{Association, AssociationKey, EntityKey, EntityKeyMetadata, Tuple};

/// Kind tag for a [`GridDialectOperation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    CreateTupleWithKey,
    CreateTuple,
    InsertTuple,
    InsertOrUpdateTuple,
    RemoveTuple,
    UpdateTupleWithOptimisticLock,
    RemoveTupleWithOptimisticLock,
    CreateAssociationWithKey,
    InsertOrUpdateAssociation,
    RemoveAssociation,
    ExecuteBatch,
}

impl OperationType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateTupleWithKey => "create_tuple_with_key",
            Self::CreateTuple => "create_tuple",
            Self::InsertTuple => "insert_tuple",
            Self::InsertOrUpdateTuple => "insert_or_update_tuple",
            Self::RemoveTuple => "remove_tuple",
            Self::UpdateTupleWithOptimisticLock => "update_tuple_with_optimistic_lock",
            Self::RemoveTupleWithOptimisticLock => "remove_tuple_with_optimistic_lock",
            Self::CreateAssociationWithKey => "create_association_with_key",
            Self::InsertOrUpdateAssociation => "insert_or_update_association",
            Self::RemoveAssociation => "remove_association",
            Self::ExecuteBatch => "execute_batch",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An applied grid dialect operation.
///
/// `ExecuteBatch` holds the operations of one batch in queue order. Its
/// entries are only ever `InsertOrUpdateTuple`, `RemoveTuple`,
/// `InsertOrUpdateAssociation` or `RemoveAssociation`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GridDialectOperation {
    CreateTupleWithKey {
        entity_key: EntityKey,
    },
    /// Tuple created for an entity whose key the datastore generates.
    CreateTuple {
        entity_key_metadata: EntityKeyMetadata,
    },
    /// Tuple inserted with a generated key. `tuple` includes the generated
    /// key column.
    InsertTuple {
        entity_key_metadata: EntityKeyMetadata,
        tuple: Tuple,
    },
    InsertOrUpdateTuple {
        entity_key: EntityKey,
        tuple: Tuple,
    },
    RemoveTuple {
        entity_key: EntityKey,
    },
    UpdateTupleWithOptimisticLock {
        entity_key: EntityKey,
        old_lock_state: Tuple,
        tuple: Tuple,
    },
    RemoveTupleWithOptimisticLock {
        entity_key: EntityKey,
        old_lock_state: Tuple,
    },
    CreateAssociationWithKey {
        association_key: AssociationKey,
    },
    InsertOrUpdateAssociation {
        association_key: AssociationKey,
        association: Association,
    },
    RemoveAssociation {
        association_key: AssociationKey,
    },
    ExecuteBatch {
        operations: Vec<GridDialectOperation>,
    },
}

impl GridDialectOperation {
    pub fn operation_type(&self) -> OperationType {
        match self {
            Self::CreateTupleWithKey { .. } => OperationType::CreateTupleWithKey,
            Self::CreateTuple { .. } => OperationType::CreateTuple,
            Self::InsertTuple { .. } => OperationType::InsertTuple,
            Self::InsertOrUpdateTuple { .. } => OperationType::InsertOrUpdateTuple,
            Self::RemoveTuple { .. } => OperationType::RemoveTuple,
            Self::UpdateTupleWithOptimisticLock { .. } => {
                OperationType::UpdateTupleWithOptimisticLock
            }
            Self::RemoveTupleWithOptimisticLock { .. } => {
                OperationType::RemoveTupleWithOptimisticLock
            }
            Self::CreateAssociationWithKey { .. } => OperationType::CreateAssociationWithKey,
            Self::InsertOrUpdateAssociation { .. } => OperationType::InsertOrUpdateAssociation,
            Self::RemoveAssociation { .. } => OperationType::RemoveAssociation,
            Self::ExecuteBatch { .. } => OperationType::ExecuteBatch,
        }
    }

    pub fn entity_key(&self) -> Option<&EntityKey> {
        match self {
            Self::CreateTupleWithKey { entity_key }
            | Self::InsertOrUpdateTuple { entity_key, .. }
            | Self::RemoveTuple { entity_key }
            | Self::UpdateTupleWithOptimisticLock { entity_key, .. }
            | Self::RemoveTupleWithOptimisticLock { entity_key, .. } => Some(entity_key),
            _ => None,
        }
    }

    pub fn entity_key_metadata(&self) -> Option<&EntityKeyMetadata> {
        match self {
            Self::CreateTuple {
                entity_key_metadata,
            }
            | Self::InsertTuple {
                entity_key_metadata,
                ..
            } => Some(entity_key_metadata),
            _ => self.entity_key().map(|key| &key.metadata),
        }
    }

    pub fn association_key(&self) -> Option<&AssociationKey> {
        match self {
            Self::CreateAssociationWithKey { association_key }
            | Self::InsertOrUpdateAssociation {
                association_key, ..
            }
            | Self::RemoveAssociation { association_key } => Some(association_key),
            _ => None,
        }
    }

    /// The tuple written by this operation.
    pub fn tuple(&self) -> Option<&Tuple> {
        match self {
            Self::InsertTuple { tuple, .. }
            | Self::InsertOrUpdateTuple { tuple, .. }
            | Self::UpdateTupleWithOptimisticLock { tuple, .. } => Some(tuple),
            _ => None,
        }
    }

    pub fn old_lock_state(&self) -> Option<&Tuple> {
        match self {
            Self::UpdateTupleWithOptimisticLock { old_lock_state, .. }
            | Self::RemoveTupleWithOptimisticLock { old_lock_state, .. } => Some(old_lock_state),
            _ => None,
        }
    }

    pub fn association(&self) -> Option<&Association> {
        match self {
            Self::InsertOrUpdateAssociation { association, .. } => Some(association),
            _ => None,
        }
    }

    /// The operations of a batch; empty for every other kind.
    pub fn batched_operations(&self) -> &[GridDialectOperation] {
        match self {
            Self::ExecuteBatch { operations } => operations,
            _ => &[],
        }
    }
}

impl fmt::Display for GridDialectOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.operation_type())?;
        if let Some(key) = self.entity_key() {
            write!(f, " {key}")
        } else if let Some(key) = self.association_key() {
            write!(f, " {key}")
        } else if let Some(metadata) = self.entity_key_metadata() {
            write!(f, " {}", metadata.table)
        } else {
            write!(f, " ({} operations)", self.batched_operations().len())
        }
    }
}
