//! Commit plan: the batch of mutations staged for one atomic apply.

use crate::mutation::Mutation;

/// Ordered, append-only collection of mutations. Pure data; building a plan
/// never touches storage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitPlan {
    mutations: Vec<Mutation>,
}

impl CommitPlan {
    /// Creates an empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a mutation. `None` means the repository had nothing to write
    /// and is ignored.
    pub fn add(&mut self, mutation: Option<Mutation>) {
        if let Some(mutation) = mutation {
            self.mutations.push(mutation);
        }
    }

    /// Staged mutations in the order they were added.
    #[must_use]
    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    /// Consumes the plan, returning its mutations in order.
    #[must_use]
    pub fn into_mutations(self) -> Vec<Mutation> {
        self.mutations
    }

    /// Number of staged mutations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    /// Returns `true` if nothing has been staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(key: &str) -> Mutation {
        Mutation::insert_or_update("t", "id", key, Vec::new())
    }

    #[test]
    fn test_add_ignores_none() {
        let mut plan = CommitPlan::new();

        plan.add(None);
        plan.add(Some(row("a")));
        plan.add(None);

        assert_eq!(plan.len(), 1);
        assert!(!plan.is_empty());
    }

    #[test]
    fn test_mutations_keep_append_order() {
        let mut plan = CommitPlan::new();

        plan.add(Some(row("first")));
        plan.add(Some(row("second")));
        plan.add(Some(row("third")));

        let keys: Vec<&str> = plan.mutations().iter().map(Mutation::key).collect();
        assert_eq!(keys, ["first", "second", "third"]);
    }

    #[test]
    fn test_new_plan_is_empty() {
        assert!(CommitPlan::new().is_empty());
    }
}
