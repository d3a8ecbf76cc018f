//! Product catalog API server entry point.

use std::sync::Arc;

use catalog_api::config::AppConfig;
use catalog_api::error::AppError;
use catalog_api::state::AppState;
use catalog_core::clock::SystemClock;
use catalog_core::id::UuidV7Generator;
use catalog_store::PgStore;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting product catalog API server");

    let config = AppConfig::from_env()?;

    // Create database connection pool.
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.store_timeout)
        .connect(&config.database_url)
        .await?;

    if config.run_migrations {
        sqlx::migrate!("../../migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    // Build application state.
    let store = PgStore::new(pool).with_timeout(config.store_timeout);
    let app_state =
        AppState::with_postgres(store, Arc::new(SystemClock), Arc::new(UuidV7Generator));

    let app = catalog_api::app(app_state);

    // Start server.
    let addr = config.listen_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
