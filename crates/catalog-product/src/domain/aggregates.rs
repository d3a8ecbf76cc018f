//! Aggregate roots for the Product context.

use std::fmt;
use std::str::FromStr;

use catalog_core::aggregate::AggregateRoot;
use catalog_core::clock::Clock;
use catalog_core::event::EventMetadata;
use chrono::{DateTime, Utc};

use super::change_tracker::{ChangeTracker, Field};
use super::discount::Discount;
use super::errors::ProductError;
use super::events::{DiscountApplied, ProductCreated, ProductEvent, ProductEventKind};
use super::money::Money;

/// Lifecycle status. `Archived` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductStatus {
    Active,
    Inactive,
    Archived,
}

impl ProductStatus {
    /// Stored representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Archived => "archived",
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown product status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for ProductStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "archived" => Ok(Self::Archived),
            other => Err(UnknownStatus(other.to_owned())),
        }
    }
}

/// Persisted state of a product, as handed to `Product::reconstruct`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSnapshot {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub base_price: Money,
    pub discount: Option<Discount>,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
    pub version: i64,
}

/// The aggregate root for a catalog product.
///
/// State changes only happen through the business methods below. Each one
/// validates first and then, as one step, updates the fields, marks them
/// dirty and raises at most one event; a failed call leaves the product
/// untouched.
#[derive(Debug, Clone)]
pub struct Product {
    id: String,
    name: String,
    description: String,
    category: String,
    base_price: Money,
    discount: Option<Discount>,
    status: ProductStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    archived_at: Option<DateTime<Utc>>,
    /// Version loaded from storage; compared on update.
    version: i64,
    changes: ChangeTracker,
    /// Uncommitted events pending persistence.
    uncommitted_events: Vec<ProductEvent>,
}

fn require_name(name: &str) -> Result<(), ProductError> {
    if name.trim().is_empty() {
        return Err(ProductError::InvalidName);
    }
    Ok(())
}

fn require_category(category: &str) -> Result<(), ProductError> {
    if category.trim().is_empty() {
        return Err(ProductError::InvalidCategory);
    }
    Ok(())
}

impl Product {
    /// Creates a new, active product. Every field starts dirty and a
    /// `ProductCreated` event is raised.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::InvalidName` or `ProductError::InvalidCategory`
    /// if either is empty.
    pub fn create(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        base_price: Money,
        clock: &dyn Clock,
    ) -> Result<Self, ProductError> {
        let name = name.into();
        let category = category.into();
        require_name(&name)?;
        require_category(&category)?;

        let now = clock.now();
        let mut product = Self {
            id: id.into(),
            name,
            description: description.into(),
            category,
            base_price,
            discount: None,
            status: ProductStatus::Active,
            created_at: now,
            updated_at: now,
            archived_at: None,
            version: 0,
            changes: ChangeTracker::new(),
            uncommitted_events: Vec::new(),
        };

        let created = ProductCreated {
            name: product.name.clone(),
            category: product.category.clone(),
            base_price_numerator: base_price.numerator(),
            base_price_denominator: base_price.denominator(),
        };
        product.record(
            &Field::ALL,
            ProductEventKind::ProductCreated(created),
            now,
        );
        Ok(product)
    }

    /// Rebuilds a product from storage with a clean tracker and no events.
    #[must_use]
    pub fn reconstruct(snapshot: ProductSnapshot) -> Self {
        Self {
            id: snapshot.id,
            name: snapshot.name,
            description: snapshot.description,
            category: snapshot.category,
            base_price: snapshot.base_price,
            discount: snapshot.discount,
            status: snapshot.status,
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
            archived_at: snapshot.archived_at,
            version: snapshot.version,
            changes: ChangeTracker::new(),
            uncommitted_events: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn base_price(&self) -> Money {
        self.base_price
    }

    #[must_use]
    pub fn discount(&self) -> Option<&Discount> {
        self.discount.as_ref()
    }

    #[must_use]
    pub fn status(&self) -> ProductStatus {
        self.status
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    #[must_use]
    pub fn archived_at(&self) -> Option<DateTime<Utc>> {
        self.archived_at
    }

    /// Fields changed since the product was created or loaded.
    #[must_use]
    pub fn changes(&self) -> &ChangeTracker {
        &self.changes
    }

    /// Drains the uncommitted events.
    pub fn take_events(&mut self) -> Vec<ProductEvent> {
        std::mem::take(&mut self.uncommitted_events)
    }

    /// Forgets tracked changes, e.g. after a successful commit.
    pub fn clear_changes(&mut self) {
        self.changes.clear();
    }

    /// Updates name, description and category. Only fields that actually
    /// differ are marked dirty; if nothing differs no event is raised and
    /// `updated_at` is left alone.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::ProductIsArchived`, `ProductError::InvalidName`
    /// or `ProductError::InvalidCategory`.
    pub fn update_details(
        &mut self,
        name: &str,
        description: &str,
        category: &str,
        clock: &dyn Clock,
    ) -> Result<(), ProductError> {
        self.ensure_not_archived()?;
        require_name(name)?;
        require_category(category)?;

        let mut changed = Vec::with_capacity(3);
        if self.name != name {
            changed.push(Field::Name);
        }
        if self.description != description {
            changed.push(Field::Description);
        }
        if self.category != category {
            changed.push(Field::Category);
        }
        if changed.is_empty() {
            return Ok(());
        }

        name.clone_into(&mut self.name);
        description.clone_into(&mut self.description);
        category.clone_into(&mut self.category);
        self.record(&changed, ProductEventKind::ProductUpdated, clock.now());
        Ok(())
    }

    /// Makes an inactive product active.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::ProductIsArchived` or
    /// `ProductError::ProductAlreadyActive`.
    pub fn activate(&mut self, clock: &dyn Clock) -> Result<(), ProductError> {
        self.ensure_not_archived()?;
        if self.status == ProductStatus::Active {
            return Err(ProductError::ProductAlreadyActive);
        }

        self.status = ProductStatus::Active;
        self.record(&[Field::Status], ProductEventKind::ProductActivated, clock.now());
        Ok(())
    }

    /// Makes the product inactive. Deactivating an inactive product is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::ProductIsArchived`.
    pub fn deactivate(&mut self, clock: &dyn Clock) -> Result<(), ProductError> {
        self.ensure_not_archived()?;
        if self.status == ProductStatus::Inactive {
            return Ok(());
        }

        self.status = ProductStatus::Inactive;
        self.record(
            &[Field::Status],
            ProductEventKind::ProductDeactivated,
            clock.now(),
        );
        Ok(())
    }

    /// Sets `discount`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::ProductIsArchived`,
    /// `ProductError::ProductNotActive`, or
    /// `ProductError::InvalidDiscountPeriod` if the window has already ended.
    pub fn apply_discount(
        &mut self,
        discount: Discount,
        clock: &dyn Clock,
    ) -> Result<(), ProductError> {
        self.ensure_not_archived()?;
        if self.status != ProductStatus::Active {
            return Err(ProductError::ProductNotActive);
        }
        let now = clock.now();
        if !discount.is_valid_at(now) {
            return Err(ProductError::InvalidDiscountPeriod);
        }

        self.discount = Some(discount);
        let applied = DiscountApplied {
            discount_percent: discount.percentage(),
            start_date: discount.start_date().timestamp(),
            end_date: discount.end_date().timestamp(),
        };
        self.record(
            &[Field::Discount],
            ProductEventKind::DiscountApplied(applied),
            now,
        );
        Ok(())
    }

    /// Clears the discount.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::ProductIsArchived` or
    /// `ProductError::NoActiveDiscount`.
    pub fn remove_discount(&mut self, clock: &dyn Clock) -> Result<(), ProductError> {
        self.ensure_not_archived()?;
        if self.discount.is_none() {
            return Err(ProductError::NoActiveDiscount);
        }

        self.discount = None;
        self.record(
            &[Field::Discount],
            ProductEventKind::DiscountRemoved,
            clock.now(),
        );
        Ok(())
    }

    /// Archives the product. Archiving an archived product is a no-op.
    ///
    /// # Errors
    ///
    /// Never fails today; the `Result` keeps the signature uniform with the
    /// other business methods.
    pub fn archive(&mut self, clock: &dyn Clock) -> Result<(), ProductError> {
        if self.status == ProductStatus::Archived {
            return Ok(());
        }

        let now = clock.now();
        self.status = ProductStatus::Archived;
        self.archived_at = Some(now);
        self.record(
            &[Field::Status, Field::ArchivedAt],
            ProductEventKind::ProductArchived,
            now,
        );
        Ok(())
    }

    /// Price after the discount in effect at `now`, if any. Derived on every
    /// call, never stored.
    ///
    /// # Errors
    ///
    /// Returns `ProductError::InvalidPrice` if the discounted amount does not
    /// fit.
    pub fn effective_price(&self, now: DateTime<Utc>) -> Result<Money, ProductError> {
        match &self.discount {
            Some(discount) if discount.is_active_at(now) => {
                self.base_price.apply_percentage(discount.percentage())
            }
            _ => Ok(self.base_price),
        }
    }

    fn ensure_not_archived(&self) -> Result<(), ProductError> {
        if self.status == ProductStatus::Archived {
            return Err(ProductError::ProductIsArchived);
        }
        Ok(())
    }

    /// Bumps `updated_at`, marks `fields` dirty and raises `kind`.
    fn record(&mut self, fields: &[Field], kind: ProductEventKind, now: DateTime<Utc>) {
        self.updated_at = now;
        for field in fields {
            self.changes.mark_dirty(*field);
        }
        self.changes.mark_dirty(Field::UpdatedAt);
        self.uncommitted_events.push(ProductEvent {
            metadata: EventMetadata {
                aggregate_id: self.id.clone(),
                event_type: kind.event_type().to_owned(),
                occurred_at: now,
            },
            kind,
        });
    }
}

impl AggregateRoot for Product {
    type Event = ProductEvent;

    fn aggregate_id(&self) -> &str {
        &self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn clear_uncommitted_events(&mut self) {
        self.uncommitted_events.clear();
    }
}
