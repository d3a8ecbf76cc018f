//! Outbox persistence.

use catalog_core::mutation::{ColumnValue, Mutation};
use catalog_core::outbox::OutboxRecord;

use super::tables::{OUTBOX_EVENTS, outbox_events as col};

/// Turns enriched outbox records into mutations.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutboxRepository;

impl OutboxRepository {
    /// Upsert of the outbox row keyed by `event_id`. Always `Some`; the
    /// option mirrors the other repositories so plans can add it directly.
    #[must_use]
    pub fn insert_mutation(record: &OutboxRecord) -> Option<Mutation> {
        Some(Mutation::insert_or_update(
            OUTBOX_EVENTS,
            col::EVENT_ID,
            record.event_id.to_string(),
            vec![
                (col::EVENT_TYPE, ColumnValue::from(record.event_type.as_str())),
                (col::AGGREGATE_ID, ColumnValue::from(record.aggregate_id.as_str())),
                (col::PAYLOAD, ColumnValue::from(record.payload.clone())),
                (col::STATUS, ColumnValue::from(record.status.as_str())),
                (col::CREATED_AT, ColumnValue::from(record.created_at)),
                (col::PROCESSED_AT, ColumnValue::Timestamp(record.processed_at)),
            ],
        ))
    }
}

#[cfg(test)]
mod tests {
    use catalog_core::mutation::MutationKind;
    use catalog_core::outbox::OutboxStatus;
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use uuid::Uuid;

    use super::*;

    #[test]
    fn test_insert_mutation_writes_pending_row() {
        // Arrange
        let created_at = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let record = OutboxRecord {
            event_id: Uuid::from_u128(7),
            event_type: "product.archived".into(),
            aggregate_id: "p-1".into(),
            payload: json!({"aggregate_id": "p-1"}),
            status: OutboxStatus::Pending,
            created_at,
            processed_at: None,
        };

        // Act
        let mutation = OutboxRepository::insert_mutation(&record).unwrap();

        // Assert
        assert_eq!(mutation.kind(), MutationKind::InsertOrUpdate);
        assert_eq!(mutation.table(), "outbox_events");
        assert_eq!(mutation.key(), Uuid::from_u128(7).to_string());
        assert_eq!(mutation.column(col::STATUS), Some(&ColumnValue::from("pending")));
        assert_eq!(
            mutation.column(col::PROCESSED_AT),
            Some(&ColumnValue::Timestamp(None))
        );
        assert_eq!(
            mutation.column(col::PAYLOAD),
            Some(&ColumnValue::from(json!({"aggregate_id": "p-1"})))
        );
    }
}
