//! Committer: the single point where staged mutations become durable.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::commit_plan::CommitPlan;
use crate::error::{CommitError, StorageError};
use crate::mutation::Mutation;

/// A storage backend able to apply a batch of mutations atomically: either
/// every mutation is durably applied or none is.
#[async_trait]
pub trait AtomicStore: Send + Sync {
    /// Applies `mutations` in order as one atomic unit.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if any mutation fails; in that case nothing from
    /// the batch was applied.
    async fn apply_atomically(&self, mutations: &[Mutation]) -> Result<(), StorageError>;
}

#[async_trait]
impl<S: AtomicStore + ?Sized> AtomicStore for Arc<S> {
    async fn apply_atomically(&self, mutations: &[Mutation]) -> Result<(), StorageError> {
        (**self).apply_atomically(mutations).await
    }
}

#[async_trait]
impl<S: AtomicStore + ?Sized> AtomicStore for &S {
    async fn apply_atomically(&self, mutations: &[Mutation]) -> Result<(), StorageError> {
        (**self).apply_atomically(mutations).await
    }
}

/// Applies commit plans.
#[async_trait]
pub trait Committer: Send + Sync {
    /// Applies `plan` atomically. An empty plan succeeds without contacting
    /// storage.
    ///
    /// # Errors
    ///
    /// Returns `CommitError` if the backend rejected the plan.
    async fn apply(&self, plan: CommitPlan) -> Result<(), CommitError>;
}

/// `Committer` over any `AtomicStore`.
#[derive(Debug, Clone)]
pub struct StoreCommitter<S> {
    store: S,
}

impl<S> StoreCommitter<S> {
    /// Creates a committer writing to `store`.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }
}

#[async_trait]
impl<S: AtomicStore> Committer for StoreCommitter<S> {
    async fn apply(&self, plan: CommitPlan) -> Result<(), CommitError> {
        if plan.is_empty() {
            debug!("commit plan is empty, skipping storage round trip");
            return Ok(());
        }

        let size = plan.len();
        debug!(mutations = size, "applying commit plan");
        self.store
            .apply_atomically(plan.mutations())
            .await
            .map_err(|source| {
                warn!(mutations = size, error = %source, "commit plan rejected");
                CommitError::from(source)
            })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Default)]
    struct RecordingStore {
        batches: Mutex<Vec<Vec<Mutation>>>,
        fail: bool,
    }

    #[async_trait]
    impl AtomicStore for RecordingStore {
        async fn apply_atomically(&self, mutations: &[Mutation]) -> Result<(), StorageError> {
            if self.fail {
                return Err(StorageError::Backend("unavailable".into()));
            }
            self.batches.lock().unwrap().push(mutations.to_vec());
            Ok(())
        }
    }

    fn plan_with(keys: &[&str]) -> CommitPlan {
        let mut plan = CommitPlan::new();
        for key in keys {
            plan.add(Some(Mutation::insert_or_update("t", "id", *key, Vec::new())));
        }
        plan
    }

    #[tokio::test]
    async fn test_empty_plan_does_not_contact_store() {
        // Arrange
        let committer = StoreCommitter::new(RecordingStore::default());

        // Act
        committer.apply(CommitPlan::new()).await.unwrap();

        // Assert
        assert!(committer.store().batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_plan_is_submitted_as_one_batch_in_order() {
        // Arrange
        let committer = StoreCommitter::new(RecordingStore::default());

        // Act
        committer.apply(plan_with(&["a", "b"])).await.unwrap();

        // Assert
        let batches = committer.store().batches.lock().unwrap();
        assert_eq!(batches.len(), 1);
        let keys: Vec<&str> = batches[0].iter().map(Mutation::key).collect();
        assert_eq!(keys, ["a", "b"]);
    }

    #[tokio::test]
    async fn test_store_failure_becomes_commit_error() {
        // Arrange
        let committer = StoreCommitter::new(RecordingStore {
            fail: true,
            ..RecordingStore::default()
        });

        // Act
        let result = committer.apply(plan_with(&["a"])).await;

        // Assert
        match result {
            Err(CommitError {
                source: StorageError::Backend(msg),
            }) => assert_eq!(msg, "unavailable"),
            other => panic!("expected backend commit error, got {other:?}"),
        }
    }
}
