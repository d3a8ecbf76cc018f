//! Product persistence: row mapping and mutation building.

use catalog_core::aggregate::AggregateRoot;
use catalog_core::error::StorageError;
use catalog_core::mutation::{ColumnValue, Mutation, Row};
use catalog_core::row_reader::RowReader;
use chrono::{DateTime, Utc};

use super::tables::{PRODUCTS, products as col};
use crate::domain::aggregates::{Product, ProductSnapshot, ProductStatus};
use crate::domain::change_tracker::Field;
use crate::domain::discount::Discount;
use crate::domain::money::Money;

/// Loads products through a `RowReader` and turns product state into
/// mutations.
#[derive(Clone, Copy)]
pub struct ProductRepository<'a> {
    reader: &'a dyn RowReader,
}

impl std::fmt::Debug for ProductRepository<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductRepository").finish_non_exhaustive()
    }
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub fn new(reader: &'a dyn RowReader) -> Self {
        Self { reader }
    }

    /// Loads the product with `id`, or `None` if there is no such row.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the read fails or the stored row cannot be
    /// mapped back to a product.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Product>, StorageError> {
        self.reader
            .read_row(PRODUCTS, col::PRODUCT_ID, id)
            .await?
            .map(|row| product_from_row(&row))
            .transpose()
    }

    /// Whether a product with `id` is stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the read fails.
    pub async fn exists(&self, id: &str) -> Result<bool, StorageError> {
        Ok(self
            .reader
            .read_row(PRODUCTS, col::PRODUCT_ID, id)
            .await?
            .is_some())
    }

    /// Upsert of every column, for a product that has never been stored.
    /// `None` if the product carries no changes.
    #[must_use]
    pub fn insert_mutation(product: &Product) -> Option<Mutation> {
        if !product.changes().has_changes() {
            return None;
        }
        let mut columns = vec![
            (col::NAME, ColumnValue::from(product.name())),
            (col::DESCRIPTION, ColumnValue::from(product.description())),
            (col::CATEGORY, ColumnValue::from(product.category())),
            (col::CREATED_AT, ColumnValue::from(product.created_at())),
            (col::VERSION, ColumnValue::from(product.version())),
        ];
        push_price(&mut columns, product.base_price());
        push_discount(&mut columns, product.discount());
        columns.push((col::STATUS, ColumnValue::from(product.status().as_str())));
        columns.push((col::UPDATED_AT, ColumnValue::from(product.updated_at())));
        columns.push((col::ARCHIVED_AT, ColumnValue::Timestamp(product.archived_at())));

        Some(Mutation::insert_or_update(
            PRODUCTS,
            col::PRODUCT_ID,
            product.id(),
            columns,
        ))
    }

    /// Update of the dirty columns plus `updated_at`, guarded by the loaded
    /// version and bumping it by one. `None` if nothing is dirty.
    #[must_use]
    pub fn update_mutation(product: &Product) -> Option<Mutation> {
        let changes = product.changes();
        if !changes.has_changes() {
            return None;
        }

        let mut columns = Vec::new();
        for field in changes.dirty_fields() {
            match field {
                Field::Name => columns.push((col::NAME, ColumnValue::from(product.name()))),
                Field::Description => {
                    columns.push((col::DESCRIPTION, ColumnValue::from(product.description())));
                }
                Field::Category => {
                    columns.push((col::CATEGORY, ColumnValue::from(product.category())));
                }
                Field::BasePrice => push_price(&mut columns, product.base_price()),
                Field::Discount => push_discount(&mut columns, product.discount()),
                Field::Status => {
                    columns.push((col::STATUS, ColumnValue::from(product.status().as_str())));
                }
                Field::ArchivedAt => {
                    columns.push((col::ARCHIVED_AT, ColumnValue::Timestamp(product.archived_at())));
                }
                // Written unconditionally below; id and creation time never change.
                Field::UpdatedAt | Field::Id | Field::CreatedAt => {}
            }
        }
        columns.push((col::UPDATED_AT, ColumnValue::from(product.updated_at())));
        columns.push((col::VERSION, ColumnValue::from(product.version() + 1)));

        Some(
            Mutation::update(PRODUCTS, col::PRODUCT_ID, product.id(), columns)
                .with_precondition(col::VERSION, ColumnValue::from(product.version())),
        )
    }
}

fn push_price(columns: &mut Vec<(&'static str, ColumnValue)>, price: Money) {
    columns.push((col::BASE_PRICE_NUMERATOR, ColumnValue::from(price.numerator())));
    columns.push((col::BASE_PRICE_DENOMINATOR, ColumnValue::from(price.denominator())));
}

fn push_discount(columns: &mut Vec<(&'static str, ColumnValue)>, discount: Option<&Discount>) {
    columns.push((
        col::DISCOUNT_PERCENT,
        ColumnValue::Int(discount.map(Discount::percentage)),
    ));
    columns.push((
        col::DISCOUNT_START_DATE,
        ColumnValue::Timestamp(discount.map(Discount::start_date)),
    ));
    columns.push((
        col::DISCOUNT_END_DATE,
        ColumnValue::Timestamp(discount.map(Discount::end_date)),
    ));
}

fn malformed(reason: impl Into<String>) -> StorageError {
    StorageError::MalformedRow {
        table: PRODUCTS,
        reason: reason.into(),
    }
}

fn required<'r>(row: &'r Row, column: &str) -> Result<&'r ColumnValue, StorageError> {
    row.get(column)
        .ok_or_else(|| malformed(format!("missing column {column}")))
}

fn text(row: &Row, column: &str) -> Result<String, StorageError> {
    required(row, column)?
        .as_text()
        .map(str::to_owned)
        .ok_or_else(|| malformed(format!("{column} is not text")))
}

fn int(row: &Row, column: &str) -> Result<i64, StorageError> {
    required(row, column)?
        .as_int()
        .ok_or_else(|| malformed(format!("{column} is not an integer")))
}

fn timestamp(row: &Row, column: &str) -> Result<DateTime<Utc>, StorageError> {
    required(row, column)?
        .as_timestamp()
        .ok_or_else(|| malformed(format!("{column} is not a timestamp")))
}

fn optional_int(row: &Row, column: &str) -> Option<i64> {
    row.get(column).and_then(ColumnValue::as_int)
}

fn optional_timestamp(row: &Row, column: &str) -> Option<DateTime<Utc>> {
    row.get(column).and_then(ColumnValue::as_timestamp)
}

/// Rebuilds a product from a `products` row. A discount is only restored
/// when its percentage and both dates are present.
///
/// # Errors
///
/// Returns `StorageError::MalformedRow` if a column is missing, has the wrong
/// type, or holds a value the domain rejects.
pub(crate) fn product_from_row(row: &Row) -> Result<Product, StorageError> {
    let base_price = Money::new(
        int(row, col::BASE_PRICE_NUMERATOR)?,
        int(row, col::BASE_PRICE_DENOMINATOR)?,
    )
    .map_err(|e| malformed(format!("base price: {e}")))?;

    let discount = match (
        optional_int(row, col::DISCOUNT_PERCENT),
        optional_timestamp(row, col::DISCOUNT_START_DATE),
        optional_timestamp(row, col::DISCOUNT_END_DATE),
    ) {
        (Some(percent), Some(start), Some(end)) => Some(
            Discount::new(percent, start, end)
                .map_err(|e| malformed(format!("discount: {e}")))?,
        ),
        _ => None,
    };

    let status: ProductStatus = text(row, col::STATUS)?
        .parse()
        .map_err(|e| malformed(format!("{e}")))?;

    Ok(Product::reconstruct(ProductSnapshot {
        id: text(row, col::PRODUCT_ID)?,
        name: text(row, col::NAME)?,
        description: text(row, col::DESCRIPTION)?,
        category: text(row, col::CATEGORY)?,
        base_price,
        discount,
        status,
        created_at: timestamp(row, col::CREATED_AT)?,
        updated_at: timestamp(row, col::UPDATED_AT)?,
        archived_at: optional_timestamp(row, col::ARCHIVED_AT),
        version: int(row, col::VERSION)?,
    }))
}

#[cfg(test)]
mod tests {
    use catalog_core::committer::AtomicStore;
    use catalog_test_support::{FixedClock, InMemoryStore};
    use chrono::{Duration, TimeZone};

    use super::*;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    fn created(clock: &FixedClock) -> Product {
        Product::create(
            "p-1",
            "Lamp",
            "Brass desk lamp",
            "lighting",
            Money::new(4999, 100).unwrap(),
            clock,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_insert_then_find_round_trips_state() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let store = InMemoryStore::new();
        let product = created(&clock);
        let mutation = ProductRepository::insert_mutation(&product).unwrap();
        store.apply_atomically(&[mutation]).await.unwrap();

        // Act
        let repo = ProductRepository::new(&store);
        let loaded = repo.find_by_id("p-1").await.unwrap().unwrap();

        // Assert
        assert_eq!(loaded.name(), "Lamp");
        assert_eq!(loaded.description(), "Brass desk lamp");
        assert_eq!(loaded.base_price(), Money::new(4999, 100).unwrap());
        assert_eq!(loaded.status(), ProductStatus::Active);
        assert!(loaded.discount().is_none());
        assert_eq!(loaded.archived_at(), None);
        assert_eq!(loaded.version(), 0);
        assert!(!loaded.changes().has_changes());
        assert!(repo.exists("p-1").await.unwrap());
        assert!(!repo.exists("p-2").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_by_id_missing_row_is_none() {
        let store = InMemoryStore::new();

        let found = ProductRepository::new(&store).find_by_id("nope").await.unwrap();

        assert!(found.is_none());
    }

    #[test]
    fn test_update_mutation_is_none_without_changes() {
        let clock = FixedClock(fixed_now());
        let mut product = created(&clock);
        product.clear_changes();

        assert!(ProductRepository::update_mutation(&product).is_none());
        assert!(ProductRepository::insert_mutation(&product).is_none());
    }

    #[test]
    fn test_update_mutation_writes_only_dirty_columns_and_bumps_version() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let mut product = created(&clock);
        product.clear_changes();
        let later = FixedClock(fixed_now() + Duration::hours(1));
        product.deactivate(&later).unwrap();

        // Act
        let mutation = ProductRepository::update_mutation(&product).unwrap();

        // Assert
        let names: Vec<&str> = mutation.columns().iter().map(|(name, _)| *name).collect();
        assert_eq!(names, [col::STATUS, col::UPDATED_AT, col::VERSION]);
        assert_eq!(mutation.column(col::STATUS), Some(&ColumnValue::from("inactive")));
        assert_eq!(mutation.column(col::UPDATED_AT), Some(&ColumnValue::from(later.0)));
        assert_eq!(mutation.column(col::VERSION), Some(&ColumnValue::from(1_i64)));
        let precondition = mutation.precondition().unwrap();
        assert_eq!(precondition.column, col::VERSION);
        assert_eq!(precondition.expected, ColumnValue::from(0_i64));
    }

    #[test]
    fn test_removed_discount_writes_nulls() {
        let clock = FixedClock(fixed_now());
        let mut product = created(&clock);
        let discount =
            Discount::new(15, fixed_now(), fixed_now() + Duration::days(3)).unwrap();
        product.apply_discount(discount, &clock).unwrap();
        product.clear_changes();

        product.remove_discount(&clock).unwrap();
        let mutation = ProductRepository::update_mutation(&product).unwrap();

        assert_eq!(
            mutation.column(col::DISCOUNT_PERCENT),
            Some(&ColumnValue::Int(None))
        );
        assert_eq!(
            mutation.column(col::DISCOUNT_END_DATE),
            Some(&ColumnValue::Timestamp(None))
        );
    }

    #[tokio::test]
    async fn test_discount_survives_round_trip() {
        let clock = FixedClock(fixed_now());
        let store = InMemoryStore::new();
        let mut product = created(&clock);
        let discount =
            Discount::new(30, fixed_now(), fixed_now() + Duration::days(7)).unwrap();
        product.apply_discount(discount, &clock).unwrap();
        store
            .apply_atomically(&[ProductRepository::insert_mutation(&product).unwrap()])
            .await
            .unwrap();

        let loaded = ProductRepository::new(&store)
            .find_by_id("p-1")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(loaded.discount(), Some(&discount));
    }

    #[test]
    fn test_malformed_status_is_reported() {
        let clock = FixedClock(fixed_now());
        let product = created(&clock);
        let mutation = ProductRepository::insert_mutation(&product).unwrap();
        let mut row: Row = mutation
            .columns()
            .iter()
            .map(|(name, value)| ((*name).to_owned(), value.clone()))
            .collect();
        row.insert(col::PRODUCT_ID.to_owned(), ColumnValue::from("p-1"));
        row.insert(col::STATUS.to_owned(), ColumnValue::from("deleted"));

        let result = product_from_row(&row);

        assert!(matches!(result, Err(StorageError::MalformedRow { .. })));
    }
}
