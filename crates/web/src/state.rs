//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::WebConfig;
use crate::db::{
    ItemRepository, MemoryRepository, PgItemRepository, PgUserRepository, UserRepository,
};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the configuration and the user and listing repositories.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WebConfig,
    users: Arc<dyn UserRepository>,
    items: Arc<dyn ItemRepository>,
}

impl AppState {
    /// Create a new application state from explicit repositories.
    #[must_use]
    pub fn new(
        config: WebConfig,
        users: Arc<dyn UserRepository>,
        items: Arc<dyn ItemRepository>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                users,
                items,
            }),
        }
    }

    /// State backed by a `PostgreSQL` pool.
    #[must_use]
    pub fn with_postgres(config: WebConfig, pool: PgPool) -> Self {
        Self::new(
            config,
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgItemRepository::new(pool)),
        )
    }

    /// State backed by a fresh in-memory store.
    #[must_use]
    pub fn in_memory(config: WebConfig) -> Self {
        let repo = MemoryRepository::new();
        Self::new(config, Arc::new(repo.clone()), Arc::new(repo))
    }

    /// Get a reference to the web configuration.
    #[must_use]
    pub fn config(&self) -> &WebConfig {
        &self.inner.config
    }

    /// Get the user repository.
    #[must_use]
    pub fn users(&self) -> &dyn UserRepository {
        self.inner.users.as_ref()
    }

    /// Get the listing repository.
    #[must_use]
    pub fn items(&self) -> &dyn ItemRepository {
        self.inner.items.as_ref()
    }
}
