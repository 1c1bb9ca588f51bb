//! Cart route handlers.
//!
//! The cart lives in the session. Every mutation is a form post that
//! redirects back with a banner.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use huerto_hogar_core::ProductId;
use huerto_hogar_core::cart::Cart;
use huerto_hogar_core::checkout::CheckoutSummary;

use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::{Flash, PageContext, load_cart, save_cart};
use crate::routes::{local_path, redirect_with};
use crate::state::AppState;

/// Add-to-cart form data.
#[derive(Debug, Deserialize)]
pub struct AddForm {
    pub product_id: ProductId,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Page to go back to; defaults to the cart.
    #[serde(default)]
    pub next: Option<String>,
}

const fn default_quantity() -> u32 {
    1
}

/// Quantity update form data.
#[derive(Debug, Deserialize)]
pub struct UpdateForm {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Remove form data.
#[derive(Debug, Deserialize)]
pub struct RemoveForm {
    pub product_id: ProductId,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartTemplate {
    pub page: PageContext,
    pub flash: Flash,
    pub cart: Cart,
    pub summary: CheckoutSummary,
}

/// Display the cart.
#[instrument(skip(session, page, flash))]
pub async fn show(
    session: Session,
    page: PageContext,
    Query(flash): Query<Flash>,
) -> Result<impl IntoResponse, AppError> {
    let cart = load_cart(&session).await?;
    Ok(CartTemplate {
        page,
        flash,
        summary: CheckoutSummary::from_cart(&cart),
        cart,
    })
}

/// Add a product to the cart.
///
/// The product is fetched so the cart line carries the current name,
/// price and image, and so out-of-stock products are refused.
#[instrument(skip(state, session, form), fields(product_id = %form.product_id, quantity = form.quantity))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddForm>,
) -> Result<Response, AppError> {
    let back = local_path(form.next.as_deref(), "/cart");

    let product = match state.api().product(form.product_id).await {
        Ok(product) => product,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load product for cart");
            return Ok(redirect_with(back, "error", &e.user_message()).into_response());
        }
    };

    let mut cart = load_cart(&session).await?;
    if let Err(e) = cart.add(&product, form.quantity) {
        return Ok(redirect_with(back, "error", &e.to_string()).into_response());
    }
    save_cart(&session, &cart).await?;

    let product_id = product.id.to_string();
    add_breadcrumb("cart", "Added to cart", Some(&[("product_id", product_id.as_str())]));

    Ok(redirect_with(
        back,
        "success",
        &format!("{} agregado al carrito", product.name),
    )
    .into_response())
}

/// Change a line's quantity. Zero removes the line.
#[instrument(skip(session))]
pub async fn update(
    session: Session,
    Form(form): Form<UpdateForm>,
) -> Result<Redirect, AppError> {
    let mut cart = load_cart(&session).await?;
    if !cart.update(form.product_id, form.quantity) {
        return Ok(redirect_with("/cart", "error", "El producto ya no está en tu carrito"));
    }
    save_cart(&session, &cart).await?;
    Ok(Redirect::to("/cart"))
}

/// Remove a line from the cart.
#[instrument(skip(session))]
pub async fn remove(
    session: Session,
    Form(form): Form<RemoveForm>,
) -> Result<Redirect, AppError> {
    let mut cart = load_cart(&session).await?;
    if cart.remove(form.product_id) {
        save_cart(&session, &cart).await?;
    }
    Ok(redirect_with("/cart", "success", "Producto eliminado del carrito"))
}

/// Empty the cart.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Redirect, AppError> {
    save_cart(&session, &Cart::new()).await?;
    Ok(redirect_with("/cart", "success", "Carrito vaciado"))
}
