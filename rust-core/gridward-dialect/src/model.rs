// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Key and payload model shared by every grid dialect.
//
// Entities are stored as tuples (column name -> JSON value) addressed by an
// entity key. Associations are stored as row collections addressed by an
// association key. Dialects treat payloads as opaque; only keys are
// inspected for addressing.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Key values
// ---------------------------------------------------------------------------

/// A single key column value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyValue {
    /// Integral key, typically generated by an identity column.
    Long(i64),
    /// Textual key.
    Text(String),
}

impl KeyValue {
    /// Convert this key value into the JSON value stored in a tuple column.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Long(v) => Value::from(*v),
            Self::Text(v) => Value::from(v.clone()),
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "'{v}'"),
        }
    }
}

impl From<i64> for KeyValue {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<&str> for KeyValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for KeyValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

fn write_columns(
    f: &mut fmt::Formatter<'_>,
    names: &[String],
    values: &[KeyValue],
) -> fmt::Result {
    for (i, (name, value)) in names.iter().zip(values).enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{name}={value}")?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Entity keys
// ---------------------------------------------------------------------------

/// Describes the key columns of an entity table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityKeyMetadata {
    /// Table (or collection) the entity lives in.
    pub table: String,
    /// Names of the key columns, in key order.
    pub column_names: Vec<String>,
}

impl EntityKeyMetadata {
    pub fn new<I, S>(table: impl Into<String>, column_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            table: table.into(),
            column_names: column_names.into_iter().map(Into::into).collect(),
        }
    }
}

/// Identifies one entity tuple.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityKey {
    pub metadata: EntityKeyMetadata,
    /// Key column values, positionally matching `metadata.column_names`.
    pub column_values: Vec<KeyValue>,
}

impl EntityKey {
    pub fn new(metadata: EntityKeyMetadata, column_values: Vec<KeyValue>) -> Self {
        Self {
            metadata,
            column_values,
        }
    }

    /// Shorthand for a single-column key.
    pub fn single(
        table: impl Into<String>,
        column: impl Into<String>,
        value: impl Into<KeyValue>,
    ) -> Self {
        let column: String = column.into();
        Self::new(EntityKeyMetadata::new(table, [column]), vec![value.into()])
    }

    pub fn table(&self) -> &str {
        &self.metadata.table
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.metadata.table)?;
        write_columns(f, &self.metadata.column_names, &self.column_values)?;
        f.write_str(")")
    }
}

// ---------------------------------------------------------------------------
// Association keys
// ---------------------------------------------------------------------------

/// Describes an association table: the columns pointing at the owning entity
/// and the columns that identify one row of the association.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssociationKeyMetadata {
    pub table: String,
    pub column_names: Vec<String>,
    pub row_key_column_names: Vec<String>,
}

impl AssociationKeyMetadata {
    pub fn new<I, S, J, T>(table: impl Into<String>, column_names: I, row_key_column_names: J) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        J: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            table: table.into(),
            column_names: column_names.into_iter().map(Into::into).collect(),
            row_key_column_names: row_key_column_names.into_iter().map(Into::into).collect(),
        }
    }
}

/// Identifies the association of one owning entity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssociationKey {
    pub metadata: AssociationKeyMetadata,
    pub column_values: Vec<KeyValue>,
    /// The owning entity, when known.
    pub entity_key: Option<EntityKey>,
}

impl AssociationKey {
    pub fn new(
        metadata: AssociationKeyMetadata,
        column_values: Vec<KeyValue>,
        entity_key: Option<EntityKey>,
    ) -> Self {
        Self {
            metadata,
            column_values,
            entity_key,
        }
    }

    pub fn table(&self) -> &str {
        &self.metadata.table
    }
}

impl fmt::Display for AssociationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.metadata.table)?;
        write_columns(f, &self.metadata.column_names, &self.column_values)?;
        f.write_str(")")
    }
}

// ---------------------------------------------------------------------------
// Tuples
// ---------------------------------------------------------------------------

/// The column values of one entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tuple {
    columns: BTreeMap<String, Value>,
}

impl Tuple {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`Tuple::put`].
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.put(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    /// Set a column, returning the previous value if there was one.
    pub fn put(&mut self, column: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.columns.insert(column.into(), value.into())
    }

    pub fn remove(&mut self, column: &str) -> Option<Value> {
        self.columns.remove(column)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Associations
// ---------------------------------------------------------------------------

/// Identifies one row inside an association.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowKey {
    pub column_names: Vec<String>,
    pub column_values: Vec<KeyValue>,
}

impl RowKey {
    pub fn new(column_names: Vec<String>, column_values: Vec<KeyValue>) -> Self {
        Self {
            column_names,
            column_values,
        }
    }
}

/// Serialized form of one association row. JSON maps only allow string keys,
/// so rows travel as a list of key/tuple pairs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssociationRow {
    pub key: RowKey,
    pub tuple: Tuple,
}

/// The rows of one association, ordered by row key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<AssociationRow>", from = "Vec<AssociationRow>")]
pub struct Association {
    rows: BTreeMap<RowKey, Tuple>,
}

impl Association {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &RowKey) -> Option<&Tuple> {
        self.rows.get(key)
    }

    pub fn put(&mut self, key: RowKey, tuple: Tuple) -> Option<Tuple> {
        self.rows.insert(key, tuple)
    }

    pub fn remove(&mut self, key: &RowKey) -> Option<Tuple> {
        self.rows.remove(key)
    }

    pub fn row_keys(&self) -> impl Iterator<Item = &RowKey> {
        self.rows.keys()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl From<Association> for Vec<AssociationRow> {
    fn from(association: Association) -> Self {
        association
            .rows
            .into_iter()
            .map(|(key, tuple)| AssociationRow { key, tuple })
            .collect()
    }
}

impl From<Vec<AssociationRow>> for Association {
    fn from(rows: Vec<AssociationRow>) -> Self {
        Self {
            rows: rows.into_iter().map(|row| (row.key, row.tuple)).collect(),
        }
    }
}
