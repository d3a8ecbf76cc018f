//! Domain events for the Product context.

use catalog_core::event::{DomainEvent, EventMetadata};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Event type name for `ProductCreated`.
pub const PRODUCT_CREATED_EVENT_TYPE: &str = "product.created";
/// Event type name for `ProductUpdated`.
pub const PRODUCT_UPDATED_EVENT_TYPE: &str = "product.updated";
/// Event type name for `ProductActivated`.
pub const PRODUCT_ACTIVATED_EVENT_TYPE: &str = "product.activated";
/// Event type name for `ProductDeactivated`.
pub const PRODUCT_DEACTIVATED_EVENT_TYPE: &str = "product.deactivated";
/// Event type name for `ProductArchived`.
pub const PRODUCT_ARCHIVED_EVENT_TYPE: &str = "product.archived";
/// Event type name for `DiscountApplied`.
pub const DISCOUNT_APPLIED_EVENT_TYPE: &str = "discount.applied";
/// Event type name for `DiscountRemoved`.
pub const DISCOUNT_REMOVED_EVENT_TYPE: &str = "discount.removed";

/// Emitted when a product is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCreated {
    /// Product name.
    pub name: String,
    /// Product category.
    pub category: String,
    /// Base price numerator (lowest terms).
    pub base_price_numerator: i64,
    /// Base price denominator (lowest terms).
    pub base_price_denominator: i64,
}

/// Emitted when a discount is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountApplied {
    /// Discount percentage in `[0, 100]`.
    pub discount_percent: i64,
    /// Window start, epoch seconds.
    pub start_date: i64,
    /// Window end, epoch seconds.
    pub end_date: i64,
}

/// Event payload variants for the Product context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductEventKind {
    /// A product has been created.
    ProductCreated(ProductCreated),
    /// Name, description or category changed.
    ProductUpdated,
    /// The product became active.
    ProductActivated,
    /// The product became inactive.
    ProductDeactivated,
    /// The product was archived.
    ProductArchived,
    /// A discount was applied.
    DiscountApplied(DiscountApplied),
    /// The discount was removed.
    DiscountRemoved,
}

impl ProductEventKind {
    /// Event type name for this variant.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ProductCreated(_) => PRODUCT_CREATED_EVENT_TYPE,
            Self::ProductUpdated => PRODUCT_UPDATED_EVENT_TYPE,
            Self::ProductActivated => PRODUCT_ACTIVATED_EVENT_TYPE,
            Self::ProductDeactivated => PRODUCT_DEACTIVATED_EVENT_TYPE,
            Self::ProductArchived => PRODUCT_ARCHIVED_EVENT_TYPE,
            Self::DiscountApplied(_) => DISCOUNT_APPLIED_EVENT_TYPE,
            Self::DiscountRemoved => DISCOUNT_REMOVED_EVENT_TYPE,
        }
    }
}

/// Domain event envelope for the Product context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: ProductEventKind,
}

impl DomainEvent for ProductEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }

    fn payload_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        match &self.kind {
            ProductEventKind::ProductCreated(created) => {
                fields.insert("name".to_owned(), Value::from(created.name.clone()));
                fields.insert("category".to_owned(), Value::from(created.category.clone()));
                fields.insert(
                    "base_price_numerator".to_owned(),
                    Value::from(created.base_price_numerator),
                );
                fields.insert(
                    "base_price_denominator".to_owned(),
                    Value::from(created.base_price_denominator),
                );
            }
            ProductEventKind::DiscountApplied(applied) => {
                fields.insert(
                    "discount_percent".to_owned(),
                    Value::from(applied.discount_percent),
                );
                fields.insert("start_date".to_owned(), Value::from(applied.start_date));
                fields.insert("end_date".to_owned(), Value::from(applied.end_date));
            }
            ProductEventKind::ProductUpdated
            | ProductEventKind::ProductActivated
            | ProductEventKind::ProductDeactivated
            | ProductEventKind::ProductArchived
            | ProductEventKind::DiscountRemoved => {}
        }
        fields
    }
}
