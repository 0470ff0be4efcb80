pub mod cache;
pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod redis_client;
pub mod serializers;
pub mod services;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

// Shared state for the whole application
#[derive(Clone)]
pub struct AppState {
    pub db: database::Database,
    pub cache: cache::CacheService,
    pub config: config::Config,
}

impl AppState {
    /// Connects to Postgres, applies migrations and, when configured, connects to Redis.
    pub async fn new(config: config::Config) -> anyhow::Result<Arc<Self>> {
        let db = database::Database::new(&config.database.url, config.database.pool_size).await?;
        info!("Database connected");

        db.run_migrations().await?;

        // the API keeps working without Redis, only slower on auth
        let cache = match &config.redis.url {
            Some(url) => match redis_client::RedisClient::new(url).await {
                Ok(redis) => {
                    info!("Redis connected");
                    cache::CacheService::new(redis, config.auth.cache_ttl_seconds)
                }
                Err(e) => {
                    warn!("Redis unavailable, auth cache disabled: {}", e);
                    cache::CacheService::disabled()
                }
            },
            None => cache::CacheService::disabled(),
        };

        Ok(Arc::new(Self { db, cache, config }))
    }
}

/// Builds the full router: health endpoints plus the API under `/api/theatre`.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Theatre API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api/theatre", controllers::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
