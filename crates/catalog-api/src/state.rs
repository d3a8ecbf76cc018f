//! Shared application state.

use std::sync::Arc;

use catalog_core::clock::Clock;
use catalog_core::committer::{Committer, StoreCommitter};
use catalog_core::id::IdGenerator;
use catalog_core::row_reader::RowReader;
use catalog_store::PgStore;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Source of the current time.
    pub clock: Arc<dyn Clock>,
    /// Source of product and event ids.
    pub ids: Arc<dyn IdGenerator>,
    /// Row access for loads and queries.
    pub reader: Arc<dyn RowReader>,
    /// Atomic commit of plans.
    pub committer: Arc<dyn Committer>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        reader: Arc<dyn RowReader>,
        committer: Arc<dyn Committer>,
    ) -> Self {
        Self {
            clock,
            ids,
            reader,
            committer,
        }
    }

    /// State backed by PostgreSQL: reads and commits both go through `store`.
    #[must_use]
    pub fn with_postgres(
        store: PgStore,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        let store = Arc::new(store);
        let committer = Arc::new(StoreCommitter::new(Arc::clone(&store)));
        Self::new(clock, ids, store, committer)
    }
}
