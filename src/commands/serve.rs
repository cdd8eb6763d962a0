//! Serve command - Starts the HTTP server.

use std::sync::Arc;

use crate::api::{create_router, AppState};
use crate::cli::args::ServeArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::{
    Cache, Database, RedisUserCache, SeaTransactionManager, UserCache, UserStore,
};
use crate::services::UserManager;

/// Execute the serve command
pub async fn execute(args: ServeArgs, config: Config) -> AppResult<()> {
    tracing::info!("Starting server...");

    let db = Database::connect(&config.database_url)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;
    let db = Arc::new(db);

    let cache = connect_cache(&config).await;

    let tx = SeaTransactionManager::new(db.get_connection()).with_timeout(config.tx_timeout());
    let repo = Arc::new(UserStore::new(db.get_connection()));
    let user_cache = cache
        .clone()
        .map(|c| Arc::new(RedisUserCache::new(c)) as Arc<dyn UserCache>);
    let user_service = Arc::new(UserManager::new(Arc::new(tx), repo, user_cache));

    let app_state = AppState::new(user_service, db, cache);

    // Build router
    let app = create_router(app_state);

    // Start server
    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind to {}: {}", addr, e)))?;

    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::internal(format!("Server error: {}", e)))?;

    Ok(())
}

/// Connect to Redis if enabled. An unreachable Redis means no cache.
async fn connect_cache(config: &Config) -> Option<Cache> {
    if !config.cache_enabled {
        tracing::info!("Cache disabled by configuration");
        return None;
    }

    match Cache::try_connect(&config.redis_url).await {
        Ok(cache) => Some(cache.with_op_timeout(config.cache_op_timeout())),
        Err(e) => {
            tracing::warn!(error = %e, "Redis unavailable, running without cache");
            None
        }
    }
}
