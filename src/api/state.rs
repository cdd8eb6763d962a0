//! Application state - Dependency injection container.

use std::sync::Arc;

use crate::infra::{Cache, Database};
use crate::services::UserService;

/// Application state shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    /// User service
    pub user_service: Arc<dyn UserService>,
    /// Database connection, used for health checks
    pub database: Arc<Database>,
    /// Redis cache, `None` when running without one
    pub cache: Option<Cache>,
}

impl AppState {
    pub fn new(
        user_service: Arc<dyn UserService>,
        database: Arc<Database>,
        cache: Option<Cache>,
    ) -> Self {
        Self {
            user_service,
            database,
            cache,
        }
    }
}
