//! In-memory storage doubles implementing `AtomicStore`, `RowReader` and
//! `Committer`.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use catalog_core::commit_plan::CommitPlan;
use catalog_core::committer::{AtomicStore, Committer};
use catalog_core::error::{CommitError, StorageError};
use catalog_core::mutation::{ColumnValue, Mutation, MutationKind, Row};
use catalog_core::row_reader::{RowReader, ScanQuery};

type Tables = HashMap<&'static str, BTreeMap<String, Row>>;

/// A store that keeps rows in memory and applies each batch all-or-nothing:
/// the batch runs against a copy of the tables, which replaces the live
/// tables only if every mutation succeeded.
///
/// `fail_on_table` injects a backend failure for any batch touching the given
/// table, which is how tests observe that nothing else in the batch landed.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
    fail_on: Mutex<Option<&'static str>>,
    applied_batches: Mutex<Vec<Vec<Mutation>>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `row` directly, bypassing mutations. The row must contain the
    /// key column.
    ///
    /// # Panics
    ///
    /// Panics if the row has no text value for `key_column`.
    pub fn seed(&self, table: &'static str, key_column: &'static str, row: Row) {
        let key = row
            .get(key_column)
            .and_then(ColumnValue::as_text)
            .expect("seeded row must carry its key column")
            .to_owned();
        self.tables
            .lock()
            .unwrap()
            .entry(table)
            .or_default()
            .insert(key, row);
    }

    /// Makes every later batch that touches `table` fail with a backend error.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn fail_on_table(&self, table: &'static str) {
        *self.fail_on.lock().unwrap() = Some(table);
    }

    /// Returns a copy of the row stored under `key`, if any.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn row(&self, table: &str, key: &str) -> Option<Row> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .and_then(|rows| rows.get(key))
            .cloned()
    }

    /// Returns every row of `table` in key order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .map(|rows| rows.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Batches that were applied successfully, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn applied_batches(&self) -> Vec<Vec<Mutation>> {
        self.applied_batches.lock().unwrap().clone()
    }
}

fn apply_one(tables: &mut Tables, mutation: &Mutation) -> Result<(), StorageError> {
    let rows = tables.entry(mutation.table()).or_default();
    let existing = rows.get(mutation.key());

    if let Some(precondition) = mutation.precondition() {
        let holds = existing
            .and_then(|row| row.get(precondition.column))
            .is_some_and(|value| *value == precondition.expected);
        if !holds {
            return Err(StorageError::PreconditionFailed {
                table: mutation.table(),
                key: mutation.key().to_owned(),
            });
        }
    }

    let mut row = match (mutation.kind(), existing) {
        (_, Some(row)) => row.clone(),
        (MutationKind::InsertOrUpdate, None) => {
            let mut row = Row::new();
            row.insert(
                mutation.key_column().to_owned(),
                ColumnValue::from(mutation.key()),
            );
            row
        }
        (MutationKind::Update, None) => {
            return Err(StorageError::RowNotFound {
                table: mutation.table(),
                key: mutation.key().to_owned(),
            });
        }
    };
    for (column, value) in mutation.columns() {
        row.insert((*column).to_owned(), value.clone());
    }
    rows.insert(mutation.key().to_owned(), row);
    Ok(())
}

#[async_trait]
impl AtomicStore for InMemoryStore {
    async fn apply_atomically(&self, mutations: &[Mutation]) -> Result<(), StorageError> {
        let fail_on = *self.fail_on.lock().unwrap();
        if let Some(table) = fail_on.filter(|t| mutations.iter().any(|m| m.table() == *t)) {
            return Err(StorageError::Backend(format!("injected failure on {table}")));
        }

        let mut tables = self.tables.lock().unwrap();
        let mut staged = tables.clone();
        for mutation in mutations {
            apply_one(&mut staged, mutation)?;
        }
        *tables = staged;
        self.applied_batches
            .lock()
            .unwrap()
            .push(mutations.to_vec());
        Ok(())
    }
}

#[async_trait]
impl RowReader for InMemoryStore {
    async fn read_row(
        &self,
        table: &'static str,
        _key_column: &'static str,
        key: &str,
    ) -> Result<Option<Row>, StorageError> {
        Ok(self.row(table, key))
    }

    async fn scan_rows(&self, query: &ScanQuery) -> Result<Vec<Row>, StorageError> {
        let tables = self.tables.lock().unwrap();
        let Some(rows) = tables.get(query.table) else {
            return Ok(Vec::new());
        };
        let matching = rows
            .iter()
            .filter(|(key, _)| {
                query
                    .after_key
                    .as_deref()
                    .is_none_or(|after| key.as_str() > after)
            })
            .filter(|(_, row)| {
                query
                    .filters
                    .iter()
                    .all(|(column, expected)| row.get(*column) == Some(expected))
            })
            .take(query.limit)
            .map(|(_, row)| row.clone())
            .collect();
        Ok(matching)
    }
}

/// A committer that rejects every plan with a backend error.
#[derive(Debug)]
pub struct FailingCommitter;

#[async_trait]
impl Committer for FailingCommitter {
    async fn apply(&self, _plan: CommitPlan) -> Result<(), CommitError> {
        Err(CommitError::from(StorageError::Backend(
            "connection refused".into(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> ColumnValue {
        ColumnValue::from(value)
    }

    #[tokio::test]
    async fn test_failed_mutation_rolls_back_whole_batch() {
        // Arrange
        let store = InMemoryStore::new();
        let insert = Mutation::insert_or_update("items", "id", "a", vec![("name", text("A"))]);
        let missing = Mutation::update("items", "id", "zzz", vec![("name", text("Z"))]);

        // Act
        let result = store.apply_atomically(&[insert, missing]).await;

        // Assert
        assert!(matches!(result, Err(StorageError::RowNotFound { .. })));
        assert!(store.rows("items").is_empty());
        assert!(store.applied_batches().is_empty());
    }

    #[tokio::test]
    async fn test_precondition_is_checked_against_stored_value() {
        let store = InMemoryStore::new();
        store
            .apply_atomically(&[Mutation::insert_or_update(
                "items",
                "id",
                "a",
                vec![("version", ColumnValue::from(0_i64))],
            )])
            .await
            .unwrap();

        let stale = Mutation::update("items", "id", "a", vec![("version", ColumnValue::from(2_i64))])
            .with_precondition("version", ColumnValue::from(1_i64));
        let result = store.apply_atomically(&[stale]).await;

        assert!(matches!(result, Err(StorageError::PreconditionFailed { .. })));
        assert_eq!(
            store.row("items", "a").unwrap()["version"],
            ColumnValue::from(0_i64)
        );
    }

    #[tokio::test]
    async fn test_scan_filters_and_resumes_after_key() {
        let store = InMemoryStore::new();
        for (id, colour) in [("a", "red"), ("b", "blue"), ("c", "red"), ("d", "red")] {
            let mut row = Row::new();
            row.insert("id".into(), text(id));
            row.insert("colour".into(), text(colour));
            store.seed("items", "id", row);
        }

        let query = ScanQuery::new("items", "id", 2)
            .filter("colour", text("red"))
            .after(Some("a".into()));
        let rows = store.scan_rows(&query).await.unwrap();

        let ids: Vec<&str> = rows.iter().filter_map(|r| r["id"].as_text()).collect();
        assert_eq!(ids, ["c", "d"]);
    }

    #[tokio::test]
    async fn test_injected_failure_only_hits_batches_touching_table() {
        let store = InMemoryStore::new();
        store.fail_on_table("outbox");

        let other = store
            .apply_atomically(&[Mutation::insert_or_update("items", "id", "a", vec![])])
            .await;
        let outbox = store
            .apply_atomically(&[Mutation::insert_or_update("outbox", "id", "e", vec![])])
            .await;

        assert!(other.is_ok());
        assert!(matches!(outbox, Err(StorageError::Backend(_))));
    }
}
