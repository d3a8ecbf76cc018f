//! Transactional outbox records and the enricher that produces them.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::clock::Clock;
use crate::event::DomainEvent;
use crate::id::IdGenerator;

/// Dispatch state of an outbox record. Records are written `Pending`; only
/// the external dispatcher moves them to `Processed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboxStatus {
    /// Waiting for dispatch.
    Pending,
    /// Dispatched.
    Processed,
}

impl OutboxStatus {
    /// Stored representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processed => "processed",
        }
    }
}

/// Persistable form of a raised domain event.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboxRecord {
    /// Globally unique id assigned at enrichment time.
    pub event_id: Uuid,
    /// Event type name.
    pub event_type: String,
    /// Aggregate that raised the event.
    pub aggregate_id: String,
    /// Envelope plus variant-specific fields, as a JSON object.
    pub payload: Value,
    /// Dispatch state.
    pub status: OutboxStatus,
    /// When the record was enriched.
    pub created_at: DateTime<Utc>,
    /// When the dispatcher processed it.
    pub processed_at: Option<DateTime<Utc>>,
}

/// Maps raised domain events to outbox records.
pub struct EventEnricher<'a> {
    clock: &'a dyn Clock,
    ids: &'a dyn IdGenerator,
}

impl<'a> EventEnricher<'a> {
    /// Creates an enricher drawing timestamps from `clock` and event ids from
    /// `ids`.
    #[must_use]
    pub fn new(clock: &'a dyn Clock, ids: &'a dyn IdGenerator) -> Self {
        Self { clock, ids }
    }

    /// Builds the outbox record for `event`: a fresh event id, the envelope
    /// (`aggregate_id`, `event_type`, `occurred_at` as epoch seconds) and the
    /// event's own payload fields.
    pub fn enrich<E: DomainEvent>(&self, event: &E) -> OutboxRecord {
        let metadata = event.metadata();

        let mut payload = Map::new();
        payload.insert(
            "aggregate_id".to_owned(),
            Value::from(metadata.aggregate_id.clone()),
        );
        payload.insert("event_type".to_owned(), Value::from(event.event_type()));
        payload.insert(
            "occurred_at".to_owned(),
            Value::from(metadata.occurred_at.timestamp()),
        );
        payload.extend(event.payload_fields());

        OutboxRecord {
            event_id: self.ids.next_id(),
            event_type: event.event_type().to_owned(),
            aggregate_id: metadata.aggregate_id.clone(),
            payload: Value::Object(payload),
            status: OutboxStatus::Pending,
            created_at: self.clock.now(),
            processed_at: None,
        }
    }
}

impl std::fmt::Debug for EventEnricher<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEnricher").finish_non_exhaustive()
    }
}
