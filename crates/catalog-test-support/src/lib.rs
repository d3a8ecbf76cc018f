//! Shared test doubles for the product catalog.

mod clock;
mod ids;
mod store;

pub use clock::FixedClock;
pub use ids::SequenceIdGenerator;
pub use store::{FailingCommitter, InMemoryStore};
