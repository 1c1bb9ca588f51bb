//! Back-office client for the HuertoHogar services.
//!
//! Every call except [`ApiClient::login`] carries the admin's bearer token.
//! Nothing is cached: after a mutation the list page re-fetches, so the
//! tables always show what the services hold.

mod error;

pub use error::ApiError;

use std::sync::Arc;
use std::time::Duration;

use huerto_hogar_core::models::{
    AuthResponse, Comment, LoginRequest, NewUser, Order, OrderStatusUpdate, Product,
    ProductInput, User, UserUpdate,
};
use huerto_hogar_core::{CommentId, OrderId, OrderStatus, ProductId, UserId};
use reqwest::{Method, RequestBuilder, header::RETRY_AFTER};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use crate::config::ServiceUrls;
use crate::models::BearerToken;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Which service a request goes to.
#[derive(Debug, Clone, Copy)]
enum Service {
    Users,
    Products,
    Orders,
}

/// Client for the user, product and order services.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    services: ServiceUrls,
}

impl ApiClient {
    #[must_use]
    pub fn new(services: ServiceUrls) -> Self {
        Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                services,
            }),
        }
    }

    fn base(&self, service: Service) -> &Url {
        match service {
            Service::Users => &self.inner.services.users,
            Service::Products => &self.inner.services.products,
            Service::Orders => &self.inner.services.orders,
        }
    }

    fn request(
        &self,
        method: Method,
        service: Service,
        path: &str,
        token: Option<&BearerToken>,
    ) -> RequestBuilder {
        let base = self.base(service).as_str().trim_end_matches('/');
        let builder = self
            .inner
            .client
            .request(method, format!("{base}{path}"))
            .timeout(REQUEST_TIMEOUT);
        match token {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        }
    }

    /// Send a request and return the body of a successful response.
    async fn send(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }
        if status.is_server_error() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Service returned server error"
            );
        } else {
            tracing::warn!(status = %status, "Service rejected request");
        }
        Err(ApiError::from_response(status, &body, retry_after))
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let body = self.send(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, "Failed to parse service response");
            ApiError::Parse(e)
        })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        service: Service,
        path: &str,
        token: &BearerToken,
    ) -> Result<T, ApiError> {
        self.fetch(self.request(Method::GET, service, path, Some(token)))
            .await
    }

    /// POST, PUT or PATCH with a JSON body. The reply body is ignored;
    /// callers re-fetch the list.
    async fn write<B: Serialize + ?Sized>(
        &self,
        method: Method,
        service: Service,
        path: &str,
        body: &B,
        token: &BearerToken,
    ) -> Result<(), ApiError> {
        self.send(self.request(method, service, path, Some(token)).json(body))
            .await
            .map(drop)
    }

    /// DELETE; any success body is ignored.
    async fn delete(&self, service: Service, path: &str, token: &BearerToken) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, service, path, Some(token)))
            .await
            .map(drop)
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Exchange credentials for a token. The caller checks the role.
    ///
    /// # Errors
    ///
    /// Returns the user service's error for bad credentials.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.fetch(
            self.request(Method::POST, Service::Users, "/auth/login", None)
                .json(&body),
        )
        .await
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the user service request fails.
    #[instrument(skip(self, token))]
    pub async fn users(&self, token: &BearerToken) -> Result<Vec<User>, ApiError> {
        self.get(Service::Users, "/users", token).await
    }

    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the user does not exist.
    #[instrument(skip(self, token), fields(user_id = %id))]
    pub async fn user(&self, id: UserId, token: &BearerToken) -> Result<User, ApiError> {
        self.get(Service::Users, &format!("/users/{id}"), token).await
    }

    /// # Errors
    ///
    /// Returns an error if the user service rejects the user.
    #[instrument(skip(self, user, token), fields(email = %user.email))]
    pub async fn create_user(&self, user: &NewUser, token: &BearerToken) -> Result<(), ApiError> {
        self.write(Method::POST, Service::Users, "/users", user, token)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the user service rejects the update.
    #[instrument(skip(self, user, token), fields(user_id = %id))]
    pub async fn update_user(
        &self,
        id: UserId,
        user: &UserUpdate,
        token: &BearerToken,
    ) -> Result<(), ApiError> {
        self.write(Method::PUT, Service::Users, &format!("/users/{id}"), user, token)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the user service refuses the delete.
    #[instrument(skip(self, token), fields(user_id = %id))]
    pub async fn delete_user(&self, id: UserId, token: &BearerToken) -> Result<(), ApiError> {
        self.delete(Service::Users, &format!("/users/{id}"), token)
            .await
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the product service request fails.
    #[instrument(skip(self, token))]
    pub async fn products(&self, token: &BearerToken) -> Result<Vec<Product>, ApiError> {
        self.get(Service::Products, "/products", token).await
    }

    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the product does not exist.
    #[instrument(skip(self, token), fields(product_id = %id))]
    pub async fn product(&self, id: ProductId, token: &BearerToken) -> Result<Product, ApiError> {
        self.get(Service::Products, &format!("/products/{id}"), token)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the product service rejects the product.
    #[instrument(skip(self, product, token), fields(name = %product.name))]
    pub async fn create_product(
        &self,
        product: &ProductInput,
        token: &BearerToken,
    ) -> Result<(), ApiError> {
        self.write(Method::POST, Service::Products, "/products", product, token)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the product service rejects the update.
    #[instrument(skip(self, product, token), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: ProductId,
        product: &ProductInput,
        token: &BearerToken,
    ) -> Result<(), ApiError> {
        self.write(
            Method::PUT,
            Service::Products,
            &format!("/products/{id}"),
            product,
            token,
        )
        .await
    }

    /// # Errors
    ///
    /// Returns an error if the product service refuses the delete.
    #[instrument(skip(self, token), fields(product_id = %id))]
    pub async fn delete_product(&self, id: ProductId, token: &BearerToken) -> Result<(), ApiError> {
        self.delete(Service::Products, &format!("/products/{id}"), token)
            .await
    }

    /// Category names for the product form.
    ///
    /// # Errors
    ///
    /// Returns an error if the product service request fails.
    #[instrument(skip(self, token))]
    pub async fn categories(&self, token: &BearerToken) -> Result<Vec<String>, ApiError> {
        self.get(Service::Products, "/categories", token).await
    }

    /// Countries of origin for the product form.
    ///
    /// # Errors
    ///
    /// Returns an error if the product service request fails.
    #[instrument(skip(self, token))]
    pub async fn countries(&self, token: &BearerToken) -> Result<Vec<String>, ApiError> {
        self.get(Service::Products, "/countries", token).await
    }

    // =========================================================================
    // Comments
    // =========================================================================

    /// Every review across the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the product service request fails.
    #[instrument(skip(self, token))]
    pub async fn comments(&self, token: &BearerToken) -> Result<Vec<Comment>, ApiError> {
        self.get(Service::Products, "/comments", token).await
    }

    /// # Errors
    ///
    /// Returns an error if the product service refuses the delete.
    #[instrument(skip(self, token), fields(comment_id = %id))]
    pub async fn delete_comment(&self, id: CommentId, token: &BearerToken) -> Result<(), ApiError> {
        self.delete(Service::Products, &format!("/comments/{id}"), token)
            .await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the order service request fails.
    #[instrument(skip(self, token))]
    pub async fn orders(&self, token: &BearerToken) -> Result<Vec<Order>, ApiError> {
        self.get(Service::Orders, "/orders", token).await
    }

    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the order does not exist.
    #[instrument(skip(self, token), fields(order_id = %id))]
    pub async fn order(&self, id: OrderId, token: &BearerToken) -> Result<Order, ApiError> {
        self.get(Service::Orders, &format!("/orders/{id}"), token)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the order service rejects the new status.
    #[instrument(skip(self, token), fields(order_id = %id, status = %status))]
    pub async fn update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
        token: &BearerToken,
    ) -> Result<(), ApiError> {
        self.write(
            Method::PATCH,
            Service::Orders,
            &format!("/orders/{id}"),
            &OrderStatusUpdate { status },
            token,
        )
        .await
    }

    /// # Errors
    ///
    /// Returns an error if the order service refuses the delete.
    #[instrument(skip(self, token), fields(order_id = %id))]
    pub async fn delete_order(&self, id: OrderId, token: &BearerToken) -> Result<(), ApiError> {
        self.delete(Service::Orders, &format!("/orders/{id}"), token)
            .await
    }
}
