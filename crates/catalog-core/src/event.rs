//! Domain event abstractions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Envelope fields shared by every domain event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Aggregate this event belongs to.
    pub aggregate_id: String,
    /// Type name used for routing (e.g. `product.created`).
    pub event_type: String,
    /// When the business method that raised the event ran.
    pub occurred_at: DateTime<Utc>,
}

/// Trait that all domain events implement.
pub trait DomainEvent: Send + Sync + std::fmt::Debug {
    /// Returns the event type name.
    fn event_type(&self) -> &'static str;

    /// Returns the metadata for this event.
    fn metadata(&self) -> &EventMetadata;

    /// Returns the variant-specific payload fields. The envelope fields are
    /// added by the enricher and must not be repeated here.
    fn payload_fields(&self) -> serde_json::Map<String, serde_json::Value>;
}
