//! Use cases for the Product context.

pub mod command_handlers;
pub mod query_handlers;

use catalog_core::error::{CommitError, StorageError};
use thiserror::Error;

use crate::domain::errors::ProductError;

/// Error returned by the Product use cases.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No product is stored under the requested id.
    #[error("product not found: {0}")]
    ProductNotFound(String),

    /// The domain rejected the operation.
    #[error(transparent)]
    Domain(#[from] ProductError),

    /// Loading state failed.
    #[error("failed to load product: {0}")]
    Storage(#[from] StorageError),

    /// The commit plan could not be applied; nothing was written.
    #[error("{operation}: {source}")]
    Commit {
        /// The use case whose commit failed.
        operation: &'static str,
        /// The underlying commit failure.
        #[source]
        source: CommitError,
    },

    /// The product changed between load and commit.
    #[error("product {0} was modified concurrently")]
    ConcurrentModification(String),

    /// A list page token could not be decoded.
    #[error("invalid page token")]
    InvalidPageToken,
}
