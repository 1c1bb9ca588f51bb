//! Application state shared across handlers.

use std::sync::Arc;

use huerto_hogar_core::content::ContentStore;
use sqlx::PgPool;

use crate::api::ApiClient;
use crate::config::AdminConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    api: ApiClient,
    content: ContentStore,
}

impl AppState {
    #[must_use]
    pub fn new(config: AdminConfig, pool: PgPool, content: ContentStore) -> Self {
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
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Blog posts and pages shared with the storefront, read-only here.
    #[must_use]
    pub fn content(&self) -> &ContentStore {
        &self.inner.content
    }
}
