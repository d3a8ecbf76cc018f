//! Table and column names shared with the SQL migrations.

/// Product state table.
pub const PRODUCTS: &str = "products";
/// Transactional outbox table.
pub const OUTBOX_EVENTS: &str = "outbox_events";

/// Columns of `products`.
pub mod products {
    pub const PRODUCT_ID: &str = "product_id";
    pub const NAME: &str = "name";
    pub const DESCRIPTION: &str = "description";
    pub const CATEGORY: &str = "category";
    pub const BASE_PRICE_NUMERATOR: &str = "base_price_numerator";
    pub const BASE_PRICE_DENOMINATOR: &str = "base_price_denominator";
    pub const DISCOUNT_PERCENT: &str = "discount_percent";
    pub const DISCOUNT_START_DATE: &str = "discount_start_date";
    pub const DISCOUNT_END_DATE: &str = "discount_end_date";
    pub const STATUS: &str = "status";
    pub const CREATED_AT: &str = "created_at";
    pub const UPDATED_AT: &str = "updated_at";
    pub const ARCHIVED_AT: &str = "archived_at";
    /// Optimistic concurrency counter.
    pub const VERSION: &str = "version";
}

/// Columns of `outbox_events`.
pub mod outbox_events {
    pub const EVENT_ID: &str = "event_id";
    pub const EVENT_TYPE: &str = "event_type";
    pub const AGGREGATE_ID: &str = "aggregate_id";
    pub const PAYLOAD: &str = "payload";
    pub const STATUS: &str = "status";
    pub const CREATED_AT: &str = "created_at";
    pub const PROCESSED_AT: &str = "processed_at";
}
