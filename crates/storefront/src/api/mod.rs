//! Client for the HuertoHogar REST services.
//!
//! The storefront talks to three services (users, products, orders), each
//! with its own base URL. Catalog reads are cached with `moka` for five
//! minutes; everything user-specific goes straight to the service.
//!
//! # Example
//!
//! ```rust,ignore
//! use huerto_hogar_storefront::api::ApiClient;
//!
//! let api = ApiClient::new(config.services.clone());
//! let products = api.products().await?;
//! let auth = api.login("ana@duoc.cl", "secreto123").await?;
//! ```

mod error;

pub use error::ApiError;

use std::sync::Arc;
use std::time::Duration;

use huerto_hogar_core::ProductId;
use huerto_hogar_core::models::{
    AuthResponse, Comment, LoginRequest, NewComment, NewOrder, NewUser, Order, Product, User,
};
use huerto_hogar_core::{OrderId, UserId};
use moka::future::Cache;
use reqwest::header::RETRY_AFTER;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::config::ServiceUrls;
use crate::models::BearerToken;

/// Per-request timeout for every service call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    Products,
    Product(ProductId),
    Categories,
}

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    Products(Arc<Vec<Product>>),
    Product(Box<Product>),
    Categories(Arc<Vec<String>>),
}

/// Client for the user, product and order services.
///
/// Cheap to clone; all clones share the HTTP connection pool and cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    services: ServiceUrls,
    cache: Cache<CacheKey, CacheValue>,
}

impl ApiClient {
    #[must_use]
    pub fn new(services: ServiceUrls) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                services,
                cache,
            }),
        }
    }

    fn request(
        &self,
        method: reqwest::Method,
        base: &Url,
        path: &str,
        token: Option<&BearerToken>,
    ) -> reqwest::RequestBuilder {
        let url = format!("{}{path}", base.as_str().trim_end_matches('/'));
        let builder = self
            .inner
            .client
            .request(method, url)
            .timeout(REQUEST_TIMEOUT);
        match token {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        }
    }

    /// Send a request and parse the JSON body.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());

        let body = response.text().await?;

        if !status.is_success() {
            if status.is_server_error() {
                tracing::error!(
                    status = %status,
                    body = %body.chars().take(500).collect::<String>(),
                    "Service returned server error"
                );
            } else {
                debug!(status = %status, "Service returned non-success status");
            }
            return Err(ApiError::from_response(status, &body, retry_after));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse service response"
            );
            ApiError::Parse(e)
        })
    }

    fn get(&self, base: &Url, path: &str, token: Option<&BearerToken>) -> reqwest::RequestBuilder {
        self.request(reqwest::Method::GET, base, path, token)
    }

    fn post<B: Serialize + ?Sized>(
        &self,
        base: &Url,
        path: &str,
        body: &B,
        token: Option<&BearerToken>,
    ) -> reqwest::RequestBuilder {
        self.request(reqwest::Method::POST, base, path, token)
            .json(body)
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for bad credentials, or any transport
    /// or status error from the user service.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.execute(self.post(&self.inner.services.users, "/auth/login", &body, None))
            .await
    }

    /// Register a new customer account.
    ///
    /// # Errors
    ///
    /// Returns an error if the user service rejects the registration.
    #[instrument(skip(self, user), fields(email = %user.email))]
    pub async fn register(&self, user: &NewUser) -> Result<User, ApiError> {
        self.execute(self.post(&self.inner.services.users, "/auth/register", user, None))
            .await
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Every product in the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the product service request fails.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Arc<Vec<Product>>, ApiError> {
        if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(&CacheKey::Products).await
        {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products: Arc<Vec<Product>> = Arc::new(
            self.execute(self.get(&self.inner.services.products, "/products", None))
                .await?,
        );
        self.inner
            .cache
            .insert(CacheKey::Products, CacheValue::Products(Arc::clone(&products)))
            .await;
        Ok(products)
    }

    /// A single product with its comments.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId) -> Result<Product, ApiError> {
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product: Product = self
            .execute(self.get(&self.inner.services.products, &format!("/products/{id}"), None))
            .await?;
        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// Category names offered by the product service.
    ///
    /// # Errors
    ///
    /// Returns an error if the product service request fails.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Arc<Vec<String>>, ApiError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories: Arc<Vec<String>> = Arc::new(
            self.execute(self.get(&self.inner.services.products, "/categories", None))
                .await?,
        );
        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(Arc::clone(&categories)),
            )
            .await;
        Ok(categories)
    }

    /// Reviews for a product, newest first as returned by the service.
    ///
    /// # Errors
    ///
    /// Returns an error if the product service request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn product_comments(&self, id: ProductId) -> Result<Vec<Comment>, ApiError> {
        self.execute(self.get(
            &self.inner.services.products,
            &format!("/products/{id}/comments"),
            None,
        ))
        .await
    }

    /// Post a review. Drops the cached product so the new comment shows.
    ///
    /// # Errors
    ///
    /// Returns an error if the product service rejects the comment.
    #[instrument(skip(self, comment, token), fields(product_id = %id))]
    pub async fn post_comment(
        &self,
        id: ProductId,
        comment: &NewComment,
        token: Option<&BearerToken>,
    ) -> Result<Comment, ApiError> {
        let created = self
            .execute(self.post(
                &self.inner.services.products,
                &format!("/products/{id}/comments"),
                comment,
                token,
            ))
            .await?;
        self.inner.cache.invalidate(&CacheKey::Product(id)).await;
        Ok(created)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Place an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the order service rejects the order.
    #[instrument(skip(self, order, token), fields(items = order.items.len(), total = %order.total))]
    pub async fn place_order(
        &self,
        order: &NewOrder,
        token: Option<&BearerToken>,
    ) -> Result<Order, ApiError> {
        self.execute(self.post(&self.inner.services.orders, "/orders", order, token))
            .await
    }

    /// A single order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the order does not exist.
    #[instrument(skip(self, token), fields(order_id = %id))]
    pub async fn order(&self, id: OrderId, token: &BearerToken) -> Result<Order, ApiError> {
        self.execute(self.get(
            &self.inner.services.orders,
            &format!("/orders/{id}"),
            Some(token),
        ))
        .await
    }

    /// Orders placed by a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the order service request fails.
    #[instrument(skip(self, token), fields(user_id = %user_id))]
    pub async fn orders_for_user(
        &self,
        user_id: UserId,
        token: &BearerToken,
    ) -> Result<Vec<Order>, ApiError> {
        self.execute(self.get(
            &self.inner.services.orders,
            &format!("/orders?userId={user_id}"),
            Some(token),
        ))
        .await
    }
}
