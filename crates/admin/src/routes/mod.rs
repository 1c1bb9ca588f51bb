//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /auth/login                 - Login page
//! POST /auth/login                 - Login action (ADMIN role only)
//! POST /auth/logout                - Logout
//!
//! # Dashboard
//! GET  /                           - Counts, revenue, low stock, recent orders
//!
//! # Products
//! GET  /products                   - Product table
//! GET  /products/new               - New product form
//! POST /products                   - Create
//! GET  /products/{id}/edit         - Edit form
//! POST /products/{id}              - Update (PUT upstream)
//! POST /products/{id}/delete       - Delete
//!
//! # Orders
//! GET  /orders                     - Order table
//! GET  /orders/{id}                - Order detail (receipt layout)
//! POST /orders/{id}/status         - Change status (PATCH upstream)
//! POST /orders/{id}/delete         - Delete
//!
//! # Users
//! GET  /users                      - User table
//! GET  /users/new                  - New user form
//! POST /users                      - Create
//! GET  /users/{id}/edit            - Edit form
//! POST /users/{id}                 - Update (PUT upstream)
//! POST /users/{id}/delete          - Delete
//!
//! # Comments
//! GET  /comments                   - Every review
//! POST /comments/{id}/delete       - Delete
//!
//! # Content (read-only)
//! GET  /content/blog               - Blog posts
//! GET  /content/pages              - Static pages
//! ```
//!
//! HTML forms only speak GET and POST, so updates and deletes are POSTs
//! here and become PUT, PATCH or DELETE on the way to the services.

pub mod auth;
pub mod comments;
pub mod content;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod users;

use askama::Template;
use axum::{
    Router,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::api::ApiError;
use crate::middleware::clear_current_admin;
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// Build the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/new", get(products::new))
        .route("/{id}", post(products::update))
        .route("/{id}/edit", get(products::edit))
        .route("/{id}/delete", post(products::delete))
}

/// Build the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", post(orders::update_status))
        .route("/{id}/delete", post(orders::delete))
}

/// Build the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(users::index).post(users::create))
        .route("/new", get(users::new))
        .route("/{id}", post(users::update))
        .route("/{id}/edit", get(users::edit))
        .route("/{id}/delete", post(users::delete))
}

/// Create all routes for the back-office.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::dashboard))
        .merge(auth::router())
        .nest("/products", product_routes())
        .nest("/orders", order_routes())
        .nest("/users", user_routes())
        .route("/comments", get(comments::index))
        .route("/comments/{id}/delete", post(comments::delete))
        .route("/content/blog", get(content::blog))
        .route("/content/pages", get(content::pages))
}

/// Logged-in admin as shown in the header.
#[derive(Debug, Clone)]
pub struct AdminUserView {
    pub name: String,
    pub email: String,
}

impl From<&CurrentAdmin> for AdminUserView {
    fn from(admin: &CurrentAdmin) -> Self {
        Self {
            name: admin.name.clone(),
            email: admin.email.to_string(),
        }
    }
}

/// Toast messages carried in the query string after a redirect.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Flash {
    pub success: Option<String>,
    pub error: Option<String>,
}

/// Render a template, logging failures instead of leaking them.
pub(crate) fn render(template: &impl Template) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
}

/// Redirect to `path` with a toast message in the query string.
pub(crate) fn redirect_with(path: &str, key: &str, message: &str) -> Redirect {
    Redirect::to(&format!("{path}?{key}={}", urlencoding::encode(message)))
}

/// The services no longer accept the admin's token: drop the session and
/// send them back to the login form.
pub(crate) async fn session_expired(session: &Session) -> Response {
    if let Err(e) = clear_current_admin(session).await {
        tracing::warn!(error = %e, "Failed to clear expired admin session");
    }
    redirect_with(
        "/auth/login",
        "error",
        "Sesión expirada. Inicia sesión nuevamente.",
    )
    .into_response()
}

/// A list for a table page. Failures become an error toast over an empty
/// table, except an expired token, which ends the session.
pub(crate) async fn table_rows<T>(
    session: &Session,
    flash: &mut Flash,
    result: Result<Vec<T>, ApiError>,
) -> Result<Vec<T>, Response> {
    match result {
        Ok(rows) => Ok(rows),
        Err(err) if err.is_unauthorized() => Err(session_expired(session).await),
        Err(err) => {
            tracing::error!(error = %err, "Failed to load table");
            flash.error = Some(err.user_message());
            Ok(Vec::new())
        }
    }
}

/// Outcome of a create, update or delete: back to the list with a toast.
pub(crate) async fn after_mutation<T>(
    session: &Session,
    list_path: &str,
    result: Result<T, ApiError>,
    success: &str,
) -> Response {
    match result {
        Ok(_) => redirect_with(list_path, "success", success).into_response(),
        Err(err) if err.is_unauthorized() => session_expired(session).await,
        Err(err) => {
            if err.is_server_side() {
                tracing::error!(error = %err, "Mutation failed");
            } else {
                tracing::warn!(error = %err, "Mutation rejected");
            }
            redirect_with(list_path, "error", &err.user_message()).into_response()
        }
    }
}
