//! Row reader abstraction used by repositories and read models.

use async_trait::async_trait;

use crate::error::StorageError;
use crate::mutation::{ColumnValue, Row};

/// A keyset-paginated scan over one table.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanQuery {
    /// Table to scan.
    pub table: &'static str,
    /// Primary key column; rows are returned in ascending key order.
    pub key_column: &'static str,
    /// Equality filters, all of which must match.
    pub filters: Vec<(&'static str, ColumnValue)>,
    /// Only rows whose key sorts strictly after this one are returned.
    pub after_key: Option<String>,
    /// Maximum number of rows to return.
    pub limit: usize,
}

impl ScanQuery {
    /// Starts a scan of `table` ordered by `key_column`.
    #[must_use]
    pub fn new(table: &'static str, key_column: &'static str, limit: usize) -> Self {
        Self {
            table,
            key_column,
            filters: Vec::new(),
            after_key: None,
            limit,
        }
    }

    /// Adds an equality filter.
    #[must_use]
    pub fn filter(mut self, column: &'static str, value: ColumnValue) -> Self {
        self.filters.push((column, value));
        self
    }

    /// Resumes the scan after `key`.
    #[must_use]
    pub fn after(mut self, key: Option<String>) -> Self {
        self.after_key = key;
        self
    }
}

/// Read access to stored rows.
#[async_trait]
pub trait RowReader: Send + Sync {
    /// Reads the row of `table` whose `key_column` equals `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails. A missing row is
    /// `Ok(None)`, not an error.
    async fn read_row(
        &self,
        table: &'static str,
        key_column: &'static str,
        key: &str,
    ) -> Result<Option<Row>, StorageError>;

    /// Runs a keyset-paginated scan.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails.
    async fn scan_rows(&self, query: &ScanQuery) -> Result<Vec<Row>, StorageError>;
}
