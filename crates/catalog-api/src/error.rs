//! API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use catalog_product::application::CatalogError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Startup and runtime errors for the API server.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required environment variable is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database connection or pool error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Applying migrations failed.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Network binding or I/O error.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// JSON body returned for error responses.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub error: &'static str,
    /// Human-readable error message.
    pub message: String,
}

/// HTTP-layer wrapper around `CatalogError` that implements `IntoResponse`.
#[derive(Debug)]
pub struct ApiError(pub CatalogError);

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match &self.0 {
            CatalogError::ProductNotFound(_) => (StatusCode::NOT_FOUND, "product_not_found"),
            CatalogError::Domain(err) if err.is_validation() => {
                (StatusCode::BAD_REQUEST, err.code())
            }
            CatalogError::Domain(err) => (StatusCode::CONFLICT, err.code()),
            CatalogError::ConcurrentModification(_) => {
                (StatusCode::CONFLICT, "concurrent_modification")
            }
            CatalogError::InvalidPageToken => (StatusCode::BAD_REQUEST, "invalid_page_token"),
            CatalogError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
            CatalogError::Commit { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "commit_failed"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }

        let body = ErrorBody {
            error: error_code,
            message: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
