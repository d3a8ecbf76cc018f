//! Query handlers for the Product context.
//!
//! Queries read rows directly and return view DTOs; they never raise events
//! or write anything.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use catalog_core::clock::Clock;
use catalog_core::mutation::ColumnValue;
use catalog_core::row_reader::{RowReader, ScanQuery};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::CatalogError;
use crate::domain::aggregates::Product;
use crate::domain::money::Money;
use crate::persistence::ProductRepository;
use crate::persistence::product_repository::product_from_row;
use crate::persistence::tables::{PRODUCTS, products as col};

/// Page size used when the caller asks for none, or for too many.
pub const DEFAULT_PAGE_SIZE: usize = 50;
/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: i64 = 1000;

/// An exact price as a fraction in lowest terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceView {
    pub numerator: i64,
    pub denominator: i64,
}

impl From<Money> for PriceView {
    fn from(money: Money) -> Self {
        Self {
            numerator: money.numerator(),
            denominator: money.denominator(),
        }
    }
}

/// Discount details, present only while the discount is in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiscountView {
    pub percentage: i64,
    /// Epoch seconds.
    pub start_date: i64,
    /// Epoch seconds.
    pub end_date: i64,
}

/// Read-only view of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductView {
    pub product_id: String,
    pub name: String,
    pub description: String,
    pub category: String,
    pub base_price: PriceView,
    /// Price after the discount in effect at query time.
    pub effective_price: PriceView,
    pub discount: Option<DiscountView>,
    pub status: String,
    /// Epoch seconds.
    pub created_at: i64,
    /// Epoch seconds.
    pub updated_at: i64,
}

/// Filters and paging for `list_products`.
#[derive(Debug, Clone, Default)]
pub struct ListProducts {
    /// Only products with this status.
    pub status: Option<String>,
    /// Only products in this category.
    pub category: Option<String>,
    /// Requested page size; out-of-range values fall back to the default.
    pub page_size: i64,
    /// Token from a previous page.
    pub page_token: Option<String>,
}

/// One page of products, ordered by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductPage {
    pub products: Vec<ProductView>,
    /// Present when more products follow.
    pub next_page_token: Option<String>,
}

fn to_view(product: &Product, now: DateTime<Utc>) -> Result<ProductView, CatalogError> {
    let discount = product
        .discount()
        .filter(|d| d.is_active_at(now))
        .map(|d| DiscountView {
            percentage: d.percentage(),
            start_date: d.start_date().timestamp(),
            end_date: d.end_date().timestamp(),
        });

    Ok(ProductView {
        product_id: product.id().to_owned(),
        name: product.name().to_owned(),
        description: product.description().to_owned(),
        category: product.category().to_owned(),
        base_price: product.base_price().into(),
        effective_price: product.effective_price(now)?.into(),
        discount,
        status: product.status().as_str().to_owned(),
        created_at: product.created_at().timestamp(),
        updated_at: product.updated_at().timestamp(),
    })
}

fn page_size(requested: i64) -> usize {
    if requested <= 0 || requested > MAX_PAGE_SIZE {
        return DEFAULT_PAGE_SIZE;
    }
    usize::try_from(requested).unwrap_or(DEFAULT_PAGE_SIZE)
}

fn decode_page_token(token: &str) -> Result<String, CatalogError> {
    let bytes = STANDARD
        .decode(token)
        .map_err(|_| CatalogError::InvalidPageToken)?;
    String::from_utf8(bytes).map_err(|_| CatalogError::InvalidPageToken)
}

fn encode_page_token(product_id: &str) -> String {
    STANDARD.encode(product_id)
}

/// Retrieves a product by id.
///
/// # Errors
///
/// Returns `CatalogError::ProductNotFound` if no such product exists, or
/// `CatalogError::Storage` if the read fails.
pub async fn get_product(
    product_id: &str,
    clock: &dyn Clock,
    reader: &dyn RowReader,
) -> Result<ProductView, CatalogError> {
    let product = ProductRepository::new(reader)
        .find_by_id(product_id)
        .await?
        .ok_or_else(|| CatalogError::ProductNotFound(product_id.to_owned()))?;
    to_view(&product, clock.now())
}

/// Lists products in id order, one page at a time.
///
/// # Errors
///
/// Returns `CatalogError::InvalidPageToken` for a token this function did not
/// produce, or `CatalogError::Storage` if the read fails.
pub async fn list_products(
    query: &ListProducts,
    clock: &dyn Clock,
    reader: &dyn RowReader,
) -> Result<ProductPage, CatalogError> {
    let limit = page_size(query.page_size);
    let after = query
        .page_token
        .as_deref()
        .filter(|token| !token.is_empty())
        .map(decode_page_token)
        .transpose()?;

    let mut scan = ScanQuery::new(PRODUCTS, col::PRODUCT_ID, limit + 1).after(after);
    if let Some(status) = &query.status {
        scan = scan.filter(col::STATUS, ColumnValue::from(status.as_str()));
    }
    if let Some(category) = &query.category {
        scan = scan.filter(col::CATEGORY, ColumnValue::from(category.as_str()));
    }

    let mut rows = reader.scan_rows(&scan).await?;
    let has_more = rows.len() > limit;
    rows.truncate(limit);

    let now = clock.now();
    let products = rows
        .iter()
        .map(|row| to_view(&product_from_row(row)?, now))
        .collect::<Result<Vec<_>, _>>()?;

    let next_page_token = if has_more {
        products.last().map(|p| encode_page_token(&p.product_id))
    } else {
        None
    };

    Ok(ProductPage {
        products,
        next_page_token,
    })
}
