//! Product catalog: PostgreSQL storage.
//!
//! Implements the storage-neutral `AtomicStore` and `RowReader` contracts
//! over a `sqlx` connection pool. Every commit plan runs in one transaction.

pub mod pg_store;

pub use pg_store::PgStore;
