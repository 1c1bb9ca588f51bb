//! Application state shared across handlers.

use std::sync::Arc;

use huerto_hogar_core::content::ContentStore;
use sqlx::PgPool;

use crate::api::ApiClient;
use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    api: ApiClient,
    content: ContentStore,
}

impl AppState {
    /// Build the state. The API client is created from the configured
    /// service URLs.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool, content: ContentStore) -> Self {
        let api = ApiClient::new(config.services.clone());
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                api,
                content,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Session store pool, also used by the readiness check.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Client for the user, product and order services.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Blog posts and static pages.
    #[must_use]
    pub fn content(&self) -> &ContentStore {
        &self.inner.content
    }
}
