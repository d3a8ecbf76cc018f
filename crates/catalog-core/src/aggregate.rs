//! Aggregate root abstraction.

use crate::event::DomainEvent;

/// Trait for aggregate roots that buffer the events raised by their business
/// methods until the surrounding use case has committed them.
pub trait AggregateRoot: Send + Sync {
    /// The event type this aggregate raises.
    type Event: DomainEvent;

    /// Returns the aggregate identifier.
    fn aggregate_id(&self) -> &str;

    /// Returns the version loaded from storage (optimistic concurrency token).
    fn version(&self) -> i64;

    /// Returns events raised since the aggregate was created or loaded, in
    /// the order they were raised.
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Clears uncommitted events after persistence.
    fn clear_uncommitted_events(&mut self);
}
