//! Storage-neutral row mutations.
//!
//! A `Mutation` describes one row write in terms of a table, a primary key and
//! a set of typed column values. Repositories build them without touching the
//! database; a committer hands a whole batch to the backend in one atomic
//! apply. Backends translate them into their own dialect.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

/// A typed column value. Nullable columns carry an `Option` so that a NULL
/// still knows its column type.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    /// Text column.
    Text(Option<String>),
    /// 64-bit integer column.
    Int(Option<i64>),
    /// Timestamp column (UTC).
    Timestamp(Option<DateTime<Utc>>),
    /// JSON document column.
    Json(Option<serde_json::Value>),
}

impl ColumnValue {
    /// Returns `true` for a NULL of any type.
    #[must_use]
    pub fn is_null(&self) -> bool {
        match self {
            Self::Text(v) => v.is_none(),
            Self::Int(v) => v.is_none(),
            Self::Timestamp(v) => v.is_none(),
            Self::Json(v) => v.is_none(),
        }
    }

    /// Returns the text value, if this is a non-null text column.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(Some(v)) => Some(v),
            _ => None,
        }
    }

    /// Returns the integer value, if this is a non-null integer column.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => *v,
            _ => None,
        }
    }

    /// Returns the timestamp value, if this is a non-null timestamp column.
    #[must_use]
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(v) => *v,
            _ => None,
        }
    }

    /// Returns the JSON value, if this is a non-null JSON column.
    #[must_use]
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(Some(v)) => Some(v),
            _ => None,
        }
    }
}

impl From<&str> for ColumnValue {
    fn from(value: &str) -> Self {
        Self::Text(Some(value.to_owned()))
    }
}

impl From<String> for ColumnValue {
    fn from(value: String) -> Self {
        Self::Text(Some(value))
    }
}

impl From<i64> for ColumnValue {
    fn from(value: i64) -> Self {
        Self::Int(Some(value))
    }
}

impl From<DateTime<Utc>> for ColumnValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(Some(value))
    }
}

impl From<serde_json::Value> for ColumnValue {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(Some(value))
    }
}

/// A row as read back from storage, keyed by column name.
pub type Row = BTreeMap<String, ColumnValue>;

/// How a mutation writes its row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// Insert the row, or overwrite the listed columns if it already exists.
    InsertOrUpdate,
    /// Overwrite the listed columns of an existing row. Fails the whole
    /// commit if the row does not exist.
    Update,
}

/// A condition the stored row must satisfy for an `Update` to apply.
#[derive(Debug, Clone, PartialEq)]
pub struct Precondition {
    /// Column to compare.
    pub column: &'static str,
    /// Value the column must currently hold.
    pub expected: ColumnValue,
}

/// One row write, staged for an atomic commit.
#[derive(Debug, Clone, PartialEq)]
pub struct Mutation {
    kind: MutationKind,
    table: &'static str,
    key_column: &'static str,
    key: String,
    columns: Vec<(&'static str, ColumnValue)>,
    precondition: Option<Precondition>,
}

impl Mutation {
    /// Builds an insert-or-update (upsert) mutation.
    #[must_use]
    pub fn insert_or_update(
        table: &'static str,
        key_column: &'static str,
        key: impl Into<String>,
        columns: Vec<(&'static str, ColumnValue)>,
    ) -> Self {
        Self {
            kind: MutationKind::InsertOrUpdate,
            table,
            key_column,
            key: key.into(),
            columns,
            precondition: None,
        }
    }

    /// Builds an update mutation for an existing row.
    #[must_use]
    pub fn update(
        table: &'static str,
        key_column: &'static str,
        key: impl Into<String>,
        columns: Vec<(&'static str, ColumnValue)>,
    ) -> Self {
        Self {
            kind: MutationKind::Update,
            table,
            key_column,
            key: key.into(),
            columns,
            precondition: None,
        }
    }

    /// Adds a precondition on the stored row. Only honored for updates.
    #[must_use]
    pub fn with_precondition(mut self, column: &'static str, expected: ColumnValue) -> Self {
        self.precondition = Some(Precondition { column, expected });
        self
    }

    /// How this mutation writes its row.
    #[must_use]
    pub fn kind(&self) -> MutationKind {
        self.kind
    }

    /// Target table.
    #[must_use]
    pub fn table(&self) -> &'static str {
        self.table
    }

    /// Primary key column name.
    #[must_use]
    pub fn key_column(&self) -> &'static str {
        self.key_column
    }

    /// Primary key value.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Non-key columns written by this mutation, in build order.
    #[must_use]
    pub fn columns(&self) -> &[(&'static str, ColumnValue)] {
        &self.columns
    }

    /// Looks up the value written to `column`, if any.
    #[must_use]
    pub fn column(&self, column: &str) -> Option<&ColumnValue> {
        self.columns
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value)
    }

    /// Precondition on the stored row, if any.
    #[must_use]
    pub fn precondition(&self) -> Option<&Precondition> {
        self.precondition.as_ref()
    }
}
