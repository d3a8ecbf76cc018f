//! Command handlers for the Product context.
//!
//! Every handler follows the same shape: load the product, invoke exactly one
//! business method, then stage the product mutation and one outbox mutation
//! per raised event in a single commit plan and apply it atomically. A domain
//! rejection returns before any plan is built.

use catalog_core::clock::Clock;
use catalog_core::command::Command;
use catalog_core::commit_plan::CommitPlan;
use catalog_core::committer::Committer;
use catalog_core::id::IdGenerator;
use catalog_core::outbox::EventEnricher;
use catalog_core::row_reader::RowReader;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::CatalogError;
use crate::domain::aggregates::Product;
use crate::domain::commands::{
    ActivateProduct, ApplyDiscount, ArchiveProduct, CreateProduct, DeactivateProduct,
    RemoveDiscount, UpdateProduct,
};
use crate::domain::discount::Discount;
use crate::domain::errors::ProductError;
use crate::domain::money::Money;
use crate::persistence::{OutboxRepository, ProductRepository};

/// Outcome of a successful command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductCommandResult {
    /// The product the command acted on.
    pub product_id: String,
    /// Ids of the outbox records written, in raise order. Empty for no-ops.
    pub event_ids: Vec<Uuid>,
}

/// Whether the plan should insert the product or update its dirty columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Persist {
    Insert,
    Update,
}

async fn load(reader: &dyn RowReader, product_id: &str) -> Result<Product, CatalogError> {
    ProductRepository::new(reader)
        .find_by_id(product_id)
        .await?
        .ok_or_else(|| CatalogError::ProductNotFound(product_id.to_owned()))
}

/// Builds the commit plan for `product` and applies it. Raised events are
/// drained up front, so they are gone whether or not the commit succeeds;
/// tracked changes are cleared only once it has.
async fn commit(
    product: &mut Product,
    persist: Persist,
    operation: &'static str,
    clock: &dyn Clock,
    ids: &dyn IdGenerator,
    committer: &dyn Committer,
) -> Result<ProductCommandResult, CatalogError> {
    let mut plan = CommitPlan::new();
    plan.add(match persist {
        Persist::Insert => ProductRepository::insert_mutation(product),
        Persist::Update => ProductRepository::update_mutation(product),
    });

    let events = product.take_events();
    let enricher = EventEnricher::new(clock, ids);
    let mut event_ids = Vec::with_capacity(events.len());
    for event in &events {
        let record = enricher.enrich(event);
        event_ids.push(record.event_id);
        plan.add(OutboxRepository::insert_mutation(&record));
    }

    debug!(
        product_id = product.id(),
        operation,
        mutations = plan.len(),
        events = event_ids.len(),
        "committing product changes"
    );

    committer.apply(plan).await.map_err(|source| {
        if source.is_precondition_failure() {
            CatalogError::ConcurrentModification(product.id().to_owned())
        } else {
            CatalogError::Commit { operation, source }
        }
    })?;
    product.clear_changes();

    Ok(ProductCommandResult {
        product_id: product.id().to_owned(),
        event_ids,
    })
}

fn instant(epoch_seconds: i64) -> Result<DateTime<Utc>, ProductError> {
    DateTime::from_timestamp(epoch_seconds, 0).ok_or(ProductError::InvalidDateRange)
}

/// Handles the `CreateProduct` command: validates the price, creates the
/// product under a fresh id and inserts it.
///
/// # Errors
///
/// Returns `CatalogError::Domain` for invalid input, or a commit error.
#[instrument(skip_all, fields(category = %command.category))]
pub async fn handle_create_product(
    command: &CreateProduct,
    clock: &dyn Clock,
    ids: &dyn IdGenerator,
    committer: &dyn Committer,
) -> Result<ProductCommandResult, CatalogError> {
    let base_price = Money::new(command.base_price_numerator, command.base_price_denominator)?;
    let mut product = Product::create(
        ids.next_id().to_string(),
        command.name.as_str(),
        command.description.as_str(),
        command.category.as_str(),
        base_price,
        clock,
    )?;

    let operation = command.command_type();
    commit(&mut product, Persist::Insert, operation, clock, ids, committer).await
}

/// Handles the `UpdateProduct` command.
///
/// # Errors
///
/// Returns `CatalogError::ProductNotFound`, `CatalogError::Domain`, or a
/// storage/commit error.
#[instrument(skip_all, fields(product_id = %command.product_id))]
pub async fn handle_update_product(
    command: &UpdateProduct,
    clock: &dyn Clock,
    ids: &dyn IdGenerator,
    reader: &dyn RowReader,
    committer: &dyn Committer,
) -> Result<ProductCommandResult, CatalogError> {
    let mut product = load(reader, &command.product_id).await?;
    product.update_details(&command.name, &command.description, &command.category, clock)?;

    let operation = command.command_type();
    commit(&mut product, Persist::Update, operation, clock, ids, committer).await
}

/// Handles the `ActivateProduct` command.
///
/// # Errors
///
/// Returns `CatalogError::ProductNotFound`, `CatalogError::Domain`, or a
/// storage/commit error.
#[instrument(skip_all, fields(product_id = %command.product_id))]
pub async fn handle_activate_product(
    command: &ActivateProduct,
    clock: &dyn Clock,
    ids: &dyn IdGenerator,
    reader: &dyn RowReader,
    committer: &dyn Committer,
) -> Result<ProductCommandResult, CatalogError> {
    let mut product = load(reader, &command.product_id).await?;
    product.activate(clock)?;

    let operation = command.command_type();
    commit(&mut product, Persist::Update, operation, clock, ids, committer).await
}

/// Handles the `DeactivateProduct` command. Deactivating an inactive product
/// succeeds without writing anything.
///
/// # Errors
///
/// Returns `CatalogError::ProductNotFound`, `CatalogError::Domain`, or a
/// storage/commit error.
#[instrument(skip_all, fields(product_id = %command.product_id))]
pub async fn handle_deactivate_product(
    command: &DeactivateProduct,
    clock: &dyn Clock,
    ids: &dyn IdGenerator,
    reader: &dyn RowReader,
    committer: &dyn Committer,
) -> Result<ProductCommandResult, CatalogError> {
    let mut product = load(reader, &command.product_id).await?;
    product.deactivate(clock)?;

    let operation = command.command_type();
    commit(&mut product, Persist::Update, operation, clock, ids, committer).await
}

/// Handles the `ApplyDiscount` command. The window arrives as epoch seconds
/// and is validated after the product is loaded, so an unknown id reports
/// `ProductNotFound` even when the window is also invalid.
///
/// # Errors
///
/// Returns `CatalogError::ProductNotFound`, `CatalogError::Domain`, or a
/// storage/commit error.
#[instrument(skip_all, fields(product_id = %command.product_id))]
pub async fn handle_apply_discount(
    command: &ApplyDiscount,
    clock: &dyn Clock,
    ids: &dyn IdGenerator,
    reader: &dyn RowReader,
    committer: &dyn Committer,
) -> Result<ProductCommandResult, CatalogError> {
    let mut product = load(reader, &command.product_id).await?;
    let discount = Discount::new(
        command.percentage,
        instant(command.start_date)?,
        instant(command.end_date)?,
    )?;
    product.apply_discount(discount, clock)?;

    let operation = command.command_type();
    commit(&mut product, Persist::Update, operation, clock, ids, committer).await
}

/// Handles the `RemoveDiscount` command.
///
/// # Errors
///
/// Returns `CatalogError::ProductNotFound`, `CatalogError::Domain`, or a
/// storage/commit error.
#[instrument(skip_all, fields(product_id = %command.product_id))]
pub async fn handle_remove_discount(
    command: &RemoveDiscount,
    clock: &dyn Clock,
    ids: &dyn IdGenerator,
    reader: &dyn RowReader,
    committer: &dyn Committer,
) -> Result<ProductCommandResult, CatalogError> {
    let mut product = load(reader, &command.product_id).await?;
    product.remove_discount(clock)?;

    let operation = command.command_type();
    commit(&mut product, Persist::Update, operation, clock, ids, committer).await
}

/// Handles the `ArchiveProduct` command. Archiving an archived product
/// succeeds without writing anything.
///
/// # Errors
///
/// Returns `CatalogError::ProductNotFound`, `CatalogError::Domain`, or a
/// storage/commit error.
#[instrument(skip_all, fields(product_id = %command.product_id))]
pub async fn handle_archive_product(
    command: &ArchiveProduct,
    clock: &dyn Clock,
    ids: &dyn IdGenerator,
    reader: &dyn RowReader,
    committer: &dyn Committer,
) -> Result<ProductCommandResult, CatalogError> {
    let mut product = load(reader, &command.product_id).await?;
    product.archive(clock)?;

    let operation = command.command_type();
    commit(&mut product, Persist::Update, operation, clock, ids, committer).await
}
