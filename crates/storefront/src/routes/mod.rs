//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                          - Home page
//!
//! # Catalog
//! GET  /products                  - Product listing (?category=&min=&max=&sort=&q=)
//! GET  /products/{id}             - Product detail with reviews
//! POST /products/{id}/comments    - Post a review
//!
//! # Cart
//! GET  /cart                      - Cart page
//! POST /cart/add                  - Add a product
//! POST /cart/update               - Change a line's quantity (0 removes)
//! POST /cart/remove               - Remove a line
//! POST /cart/clear                - Empty the cart
//!
//! # Checkout
//! GET  /checkout                  - Shipping form and order summary
//! POST /checkout                  - Place the order
//! GET  /boleta/{id}               - Receipt
//!
//! # Auth (rate limited)
//! GET  /auth/login                - Login page
//! POST /auth/login                - Login action
//! GET  /auth/register             - Register page
//! POST /auth/register             - Register action
//! POST /auth/logout               - Logout action
//!
//! # Account (requires auth)
//! GET  /account                   - Profile and order history
//!
//! # Content
//! GET  /blog                      - Blog index
//! GET  /blog/{slug}               - Blog post
//! GET  /pages/{slug}              - Static page
//! ```

pub mod account;
pub mod auth;
pub mod boleta;
pub mod blog;
pub mod cart;
pub mod checkout;
pub mod home;
pub mod pages;
pub mod products;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
        .layer(auth_rate_limiter())
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
        .route("/{id}/comments", post(products::comment))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create the content routes router.
pub fn blog_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(blog::index))
        .route("/{slug}", get(blog::show))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .route("/checkout", get(checkout::show).post(checkout::submit))
        .route("/boleta/{id}", get(boleta::show))
        .nest("/auth", auth_routes())
        .route("/account", get(account::index))
        .nest("/blog", blog_routes())
        .route("/pages/{slug}", get(pages::show))
}

/// An `<option>` in a form select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    /// Options whose label is their value.
    pub fn list<'a>(values: impl IntoIterator<Item = &'a str>, selected: &str) -> Vec<Self> {
        values
            .into_iter()
            .map(|value| Self {
                value: value.to_string(),
                label: value.to_string(),
                selected: value == selected,
            })
            .collect()
    }
}

/// The sixteen regions as select options.
pub(crate) fn region_options(selected: &str) -> Vec<SelectOption> {
    SelectOption::list(huerto_hogar_core::regions::REGIONS, selected)
}

/// Redirect to `path` with a banner message in the query string.
pub(crate) fn redirect_with(path: &str, key: &str, message: &str) -> Redirect {
    let separator = if path.contains('?') { '&' } else { '?' };
    Redirect::to(&format!(
        "{path}{separator}{key}={}",
        urlencoding::encode(message)
    ))
}

/// A same-site path to return to after a form post, or `fallback`.
pub(crate) fn local_path<'a>(candidate: Option<&'a str>, fallback: &'a str) -> &'a str {
    candidate
        .filter(|p| p.starts_with('/') && !p.starts_with("//") && !p.contains('\\'))
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    fn location(redirect: Redirect) -> String {
        redirect
            .into_response()
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    #[test]
    fn test_redirect_with_encodes_message() {
        assert_eq!(
            location(redirect_with("/cart", "success", "Producto agregado")),
            "/cart?success=Producto%20agregado"
        );
        assert_eq!(
            location(redirect_with("/products?category=Frutas", "error", "Sin stock")),
            "/products?category=Frutas&error=Sin%20stock"
        );
    }

    #[test]
    fn test_region_options_mark_selection() {
        let options = region_options("Región de Ñuble");
        assert_eq!(options.len(), 16);
        assert_eq!(options.iter().filter(|o| o.selected).count(), 1);
        assert!(region_options("").iter().all(|o| !o.selected));
    }

    #[test]
    fn test_local_path_rejects_offsite_targets() {
        assert_eq!(local_path(Some("/products/3"), "/cart"), "/products/3");
        assert_eq!(local_path(Some("//evil.example"), "/cart"), "/cart");
        assert_eq!(local_path(Some("https://evil.example"), "/cart"), "/cart");
        assert_eq!(local_path(None, "/cart"), "/cart");
    }
}
