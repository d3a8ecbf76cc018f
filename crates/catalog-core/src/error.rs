//! Storage and commit error types.

use thiserror::Error;

/// Failure reported by a storage backend while reading rows or applying
/// mutations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An update targeted a row that does not exist.
    #[error("row not found: {table}/{key}")]
    RowNotFound {
        /// Table the mutation targeted.
        table: &'static str,
        /// Primary key of the missing row.
        key: String,
    },

    /// A mutation precondition (e.g. the expected version) did not hold.
    #[error("precondition failed on {table}/{key}")]
    PreconditionFailed {
        /// Table the mutation targeted.
        table: &'static str,
        /// Primary key of the row.
        key: String,
    },

    /// A stored row could not be mapped back into domain values.
    #[error("malformed row in {table}: {reason}")]
    MalformedRow {
        /// Table the row was read from.
        table: &'static str,
        /// What was wrong with it.
        reason: String,
    },

    /// The backend did not answer within the configured bound.
    #[error("storage operation timed out: {0}")]
    Timeout(&'static str),

    /// Any other backend failure (connection, constraint violation, ...).
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Failure to apply a commit plan. Nothing from the plan was applied.
#[derive(Debug, Error)]
#[error("failed to apply commit plan: {source}")]
pub struct CommitError {
    /// The storage failure that aborted the atomic apply.
    #[from]
    pub source: StorageError,
}

impl CommitError {
    /// Returns `true` if the plan was rejected because a precondition, such as
    /// an expected aggregate version, did not hold.
    #[must_use]
    pub fn is_precondition_failure(&self) -> bool {
        matches!(self.source, StorageError::PreconditionFailed { .. })
    }
}
