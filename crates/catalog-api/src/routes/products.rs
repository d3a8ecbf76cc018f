//! Routes for the Product context.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{info, instrument};

use catalog_product::application::command_handlers::{self, ProductCommandResult};
use catalog_product::application::query_handlers::{self, ListProducts, ProductPage, ProductView};
use catalog_product::domain::commands;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /api/v1/products.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    pub base_price_numerator: i64,
    pub base_price_denominator: i64,
}

/// Request body for PUT /api/v1/products/{id}.
#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
}

/// Request body for POST /api/v1/products/{id}/discount.
#[derive(Debug, Deserialize)]
pub struct ApplyDiscountRequest {
    /// Percentage in `[0, 100]`.
    pub percentage: i64,
    /// Window start, epoch seconds.
    pub start_date: i64,
    /// Window end, epoch seconds.
    pub end_date: i64,
}

/// Query string for GET /api/v1/products.
#[derive(Debug, Default, Deserialize)]
pub struct ListProductsParams {
    pub status: Option<String>,
    pub category: Option<String>,
    pub page_size: Option<i64>,
    pub page_token: Option<String>,
}

/// POST /api/v1/products
#[instrument(skip(state, request), fields(category = %request.category))]
async fn create_product(
    State(state): State<AppState>,
    Json(request): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductCommandResult>), ApiError> {
    let command = commands::CreateProduct {
        name: request.name,
        description: request.description,
        category: request.category,
        base_price_numerator: request.base_price_numerator,
        base_price_denominator: request.base_price_denominator,
    };

    info!("handling create_product command");

    let result = command_handlers::handle_create_product(
        &command,
        state.clock.as_ref(),
        state.ids.as_ref(),
        state.committer.as_ref(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(result)))
}

/// PUT /api/v1/products/{id}
#[instrument(skip(state, request))]
async fn update_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Json(request): Json<UpdateProductRequest>,
) -> Result<Json<ProductCommandResult>, ApiError> {
    let command = commands::UpdateProduct {
        product_id,
        name: request.name,
        description: request.description,
        category: request.category,
    };

    info!("handling update_product command");

    let result = command_handlers::handle_update_product(
        &command,
        state.clock.as_ref(),
        state.ids.as_ref(),
        state.reader.as_ref(),
        state.committer.as_ref(),
    )
    .await?;

    Ok(Json(result))
}

/// POST /api/v1/products/{id}/activate
#[instrument(skip(state))]
async fn activate_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<ProductCommandResult>, ApiError> {
    let command = commands::ActivateProduct { product_id };

    info!("handling activate_product command");

    let result = command_handlers::handle_activate_product(
        &command,
        state.clock.as_ref(),
        state.ids.as_ref(),
        state.reader.as_ref(),
        state.committer.as_ref(),
    )
    .await?;

    Ok(Json(result))
}

/// POST /api/v1/products/{id}/deactivate
#[instrument(skip(state))]
async fn deactivate_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<ProductCommandResult>, ApiError> {
    let command = commands::DeactivateProduct { product_id };

    info!("handling deactivate_product command");

    let result = command_handlers::handle_deactivate_product(
        &command,
        state.clock.as_ref(),
        state.ids.as_ref(),
        state.reader.as_ref(),
        state.committer.as_ref(),
    )
    .await?;

    Ok(Json(result))
}

/// POST /api/v1/products/{id}/archive
#[instrument(skip(state))]
async fn archive_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<ProductCommandResult>, ApiError> {
    let command = commands::ArchiveProduct { product_id };

    info!("handling archive_product command");

    let result = command_handlers::handle_archive_product(
        &command,
        state.clock.as_ref(),
        state.ids.as_ref(),
        state.reader.as_ref(),
        state.committer.as_ref(),
    )
    .await?;

    Ok(Json(result))
}

/// POST /api/v1/products/{id}/discount
#[instrument(skip(state, request), fields(percentage = request.percentage))]
async fn apply_discount(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
    Json(request): Json<ApplyDiscountRequest>,
) -> Result<Json<ProductCommandResult>, ApiError> {
    let command = commands::ApplyDiscount {
        product_id,
        percentage: request.percentage,
        start_date: request.start_date,
        end_date: request.end_date,
    };

    info!("handling apply_discount command");

    let result = command_handlers::handle_apply_discount(
        &command,
        state.clock.as_ref(),
        state.ids.as_ref(),
        state.reader.as_ref(),
        state.committer.as_ref(),
    )
    .await?;

    Ok(Json(result))
}

/// DELETE /api/v1/products/{id}/discount
#[instrument(skip(state))]
async fn remove_discount(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<ProductCommandResult>, ApiError> {
    let command = commands::RemoveDiscount { product_id };

    info!("handling remove_discount command");

    let result = command_handlers::handle_remove_discount(
        &command,
        state.clock.as_ref(),
        state.ids.as_ref(),
        state.reader.as_ref(),
        state.committer.as_ref(),
    )
    .await?;

    Ok(Json(result))
}

/// GET /api/v1/products/{id}
#[instrument(skip(state))]
async fn get_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<ProductView>, ApiError> {
    let view =
        query_handlers::get_product(&product_id, state.clock.as_ref(), state.reader.as_ref())
            .await?;
    Ok(Json(view))
}

/// GET /api/v1/products
#[instrument(skip(state))]
async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListProductsParams>,
) -> Result<Json<ProductPage>, ApiError> {
    let query = ListProducts {
        status: params.status,
        category: params.category,
        page_size: params.page_size.unwrap_or_default(),
        page_token: params.page_token,
    };
    let page =
        query_handlers::list_products(&query, state.clock.as_ref(), state.reader.as_ref()).await?;
    Ok(Json(page))
}

/// Returns the router for the Product context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/v1/products", post(create_product).get(list_products))
        .route("/api/v1/products/{id}", put(update_product).get(get_product))
        .route("/api/v1/products/{id}/activate", post(activate_product))
        .route("/api/v1/products/{id}/deactivate", post(deactivate_product))
        .route("/api/v1/products/{id}/archive", post(archive_product))
        .route(
            "/api/v1/products/{id}/discount",
            post(apply_discount).delete(remove_discount),
        )
}
