//! `PostgreSQL` implementation of `AtomicStore` and `RowReader`.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use catalog_core::committer::AtomicStore;
use catalog_core::error::StorageError;
use catalog_core::mutation::{ColumnValue, Mutation, MutationKind, Row};
use catalog_core::row_reader::{RowReader, ScanQuery};
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Column, PgPool, Postgres, QueryBuilder, Row as _, TypeInfo};
use tracing::instrument;

/// Bound applied to every read and every commit unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// PostgreSQL-backed store. Each batch of mutations runs in a single
/// transaction that is rolled back on the first failure.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgStore {
    /// Creates a store over `pool` with the default timeout.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Replaces the per-operation timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        work: impl Future<Output = Result<T, StorageError>>,
    ) -> Result<T, StorageError> {
        tokio::time::timeout(self.timeout, work)
            .await
            .map_err(|_| StorageError::Timeout(operation))?
    }

    async fn apply_in_transaction(&self, mutations: &[Mutation]) -> Result<(), StorageError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin transaction", &e))?;

        for mutation in mutations {
            let mut query = build_mutation(mutation);
            let result = query
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error(mutation.table(), &e))?;

            if result.rows_affected() == 0 {
                // Dropping `tx` rolls the transaction back.
                return Err(if mutation.precondition().is_some() {
                    StorageError::PreconditionFailed {
                        table: mutation.table(),
                        key: mutation.key().to_owned(),
                    }
                } else {
                    StorageError::RowNotFound {
                        table: mutation.table(),
                        key: mutation.key().to_owned(),
                    }
                });
            }
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit transaction", &e))
    }
}

fn map_sqlx_error(operation: &str, error: &sqlx::Error) -> StorageError {
    StorageError::Backend(format!("{operation}: {error}"))
}

fn push_value(query: &mut QueryBuilder<'_, Postgres>, value: &ColumnValue) {
    match value {
        ColumnValue::Text(v) => query.push_bind(v.clone()),
        ColumnValue::Int(v) => query.push_bind(*v),
        ColumnValue::Timestamp(v) => query.push_bind(*v),
        ColumnValue::Json(v) => query.push_bind(v.clone()),
    };
}

/// Translates a mutation into one SQL statement. Table and column names come
/// from code, never from input; values are always bound.
fn build_mutation(mutation: &Mutation) -> QueryBuilder<'static, Postgres> {
    let table = mutation.table();
    let key_column = mutation.key_column();
    let columns = mutation.columns();

    match mutation.kind() {
        MutationKind::InsertOrUpdate => {
            let mut query = QueryBuilder::new(format!("INSERT INTO {table} ({key_column}"));
            for (name, _) in columns {
                query.push(", ").push(*name);
            }
            query.push(") VALUES (");
            query.push_bind(mutation.key().to_owned());
            for (_, value) in columns {
                query.push(", ");
                push_value(&mut query, value);
            }
            query.push(format!(") ON CONFLICT ({key_column}) DO "));
            if columns.is_empty() {
                // Touch the row so an existing key still counts as affected.
                query.push(format!("UPDATE SET {key_column} = EXCLUDED.{key_column}"));
            } else {
                query.push("UPDATE SET ");
                let mut set = query.separated(", ");
                for (name, _) in columns {
                    set.push(format!("{name} = EXCLUDED.{name}"));
                }
            }
            query
        }
        MutationKind::Update => {
            let mut query = QueryBuilder::new(format!("UPDATE {table} SET "));
            if columns.is_empty() {
                query.push(format!("{key_column} = {key_column}"));
            } else {
                for (i, (name, value)) in columns.iter().enumerate() {
                    if i > 0 {
                        query.push(", ");
                    }
                    query.push(format!("{name} = "));
                    push_value(&mut query, value);
                }
            }
            query.push(format!(" WHERE {key_column} = "));
            query.push_bind(mutation.key().to_owned());
            if let Some(precondition) = mutation.precondition() {
                query.push(format!(" AND {} = ", precondition.column));
                push_value(&mut query, &precondition.expected);
            }
            query
        }
    }
}

fn decode_row(table: &'static str, row: &PgRow) -> Result<Row, StorageError> {
    let malformed = |column: &str, error: &sqlx::Error| StorageError::MalformedRow {
        table,
        reason: format!("{column}: {error}"),
    };

    let mut decoded = Row::new();
    for column in row.columns() {
        let name = column.name();
        let index = column.ordinal();
        let value = match column.type_info().name() {
            "TEXT" | "VARCHAR" | "BPCHAR" => ColumnValue::Text(
                row.try_get::<Option<String>, _>(index)
                    .map_err(|e| malformed(name, &e))?,
            ),
            "INT8" => ColumnValue::Int(
                row.try_get::<Option<i64>, _>(index)
                    .map_err(|e| malformed(name, &e))?,
            ),
            "INT4" => ColumnValue::Int(
                row.try_get::<Option<i32>, _>(index)
                    .map_err(|e| malformed(name, &e))?
                    .map(i64::from),
            ),
            "TIMESTAMPTZ" => ColumnValue::Timestamp(
                row.try_get::<Option<DateTime<Utc>>, _>(index)
                    .map_err(|e| malformed(name, &e))?,
            ),
            "JSONB" | "JSON" => ColumnValue::Json(
                row.try_get::<Option<serde_json::Value>, _>(index)
                    .map_err(|e| malformed(name, &e))?,
            ),
            other => {
                return Err(StorageError::MalformedRow {
                    table,
                    reason: format!("{name}: unsupported column type {other}"),
                });
            }
        };
        decoded.insert(name.to_owned(), value);
    }
    Ok(decoded)
}

#[async_trait]
impl AtomicStore for PgStore {
    #[instrument(skip(self, mutations), fields(mutations = mutations.len()), err)]
    async fn apply_atomically(&self, mutations: &[Mutation]) -> Result<(), StorageError> {
        self.bounded("apply commit plan", self.apply_in_transaction(mutations))
            .await
    }
}

#[async_trait]
impl RowReader for PgStore {
    #[instrument(skip(self), err)]
    async fn read_row(
        &self,
        table: &'static str,
        key_column: &'static str,
        key: &str,
    ) -> Result<Option<Row>, StorageError> {
        self.bounded("read row", async {
            let mut query =
                QueryBuilder::<Postgres>::new(format!("SELECT * FROM {table} WHERE {key_column} = "));
            query.push_bind(key.to_owned());
            let row = query
                .build()
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| map_sqlx_error(table, &e))?;
            row.map(|row| decode_row(table, &row)).transpose()
        })
        .await
    }

    #[instrument(skip(self, query), fields(table = query.table, limit = query.limit), err)]
    async fn scan_rows(&self, query: &ScanQuery) -> Result<Vec<Row>, StorageError> {
        let table = query.table;
        let limit = i64::try_from(query.limit).unwrap_or(i64::MAX);

        self.bounded("scan rows", async {
            let mut sql = QueryBuilder::<Postgres>::new(format!("SELECT * FROM {table} WHERE TRUE"));
            for (column, value) in &query.filters {
                sql.push(format!(" AND {column} = "));
                push_value(&mut sql, value);
            }
            if let Some(after) = &query.after_key {
                sql.push(format!(" AND {} > ", query.key_column));
                sql.push_bind(after.clone());
            }
            sql.push(format!(" ORDER BY {} LIMIT ", query.key_column));
            sql.push_bind(limit);

            let rows = sql
                .build()
                .fetch_all(&self.pool)
                .await
                .map_err(|e| map_sqlx_error(table, &e))?;
            rows.iter().map(|row| decode_row(table, row)).collect()
        })
        .await
    }
}
