//! Checkout: shipping form, order placement and hand-off to the receipt.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use huerto_hogar_core::cart::Cart;
use huerto_hogar_core::checkout::{CheckoutSummary, build_order};
use huerto_hogar_core::validation::{FieldErrors, ShippingForm, validate_shipping};

use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::{
    Flash, OptionalAuth, PageContext, load_cart, remember_order, save_cart,
};
use crate::routes::{SelectOption, region_options};
use crate::state::AppState;

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub page: PageContext,
    pub flash: Flash,
    pub cart: Cart,
    pub summary: CheckoutSummary,
    pub form: ShippingForm,
    pub errors: FieldErrors,
    pub regions: Vec<SelectOption>,
}

impl CheckoutTemplate {
    fn new(page: PageContext, cart: Cart, form: ShippingForm) -> Self {
        Self {
            page,
            flash: Flash::default(),
            summary: CheckoutSummary::from_cart(&cart),
            cart,
            regions: region_options(&form.region),
            form,
            errors: FieldErrors::new(),
        }
    }
}

/// Display the checkout form. An empty cart goes back to the cart page.
#[instrument(skip(session, page, user))]
pub async fn show(
    session: Session,
    page: PageContext,
    OptionalAuth(user): OptionalAuth,
) -> Result<Response, AppError> {
    let cart = load_cart(&session).await?;
    if cart.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    let form = user
        .map(|u| ShippingForm::from_user(&u.user))
        .unwrap_or_default();
    Ok(CheckoutTemplate::new(page, cart, form).into_response())
}

/// Validate shipping details and place the order.
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    session: Session,
    page: PageContext,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<ShippingForm>,
) -> Result<Response, AppError> {
    let mut cart = load_cart(&session).await?;

    let shipping = match validate_shipping(&form) {
        Ok(shipping) => shipping,
        Err(errors) => {
            let mut template = CheckoutTemplate::new(page, cart, form);
            template.errors = errors;
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response());
        }
    };

    let Some(order) = build_order(&cart, shipping, user.as_ref().map(|u| u.id())) else {
        return Ok(Redirect::to("/cart").into_response());
    };

    let token = user.as_ref().map(|u| &u.token);
    match state.api().place_order(&order, token).await {
        Ok(placed) => {
            let order_id = placed.id;
            tracing::info!(order_id = %order_id, total = %placed.total, "Order placed");
            let order_id_str = order_id.to_string();
            add_breadcrumb("checkout", "Order placed", Some(&[("order_id", order_id_str.as_str())]));

            remember_order(&session, placed).await?;
            cart.clear();
            save_cart(&session, &cart).await?;
            Ok(Redirect::to(&format!("/boleta/{order_id}")).into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to place order");
            let mut template = CheckoutTemplate::new(page, cart, form);
            template.flash = Flash::error(e.user_message());
            Ok(template.into_response())
        }
    }
}
