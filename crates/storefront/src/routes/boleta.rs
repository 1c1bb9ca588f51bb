//! Order receipt ("boleta").

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tower_sessions::Session;
use tracing::instrument;

use huerto_hogar_core::OrderId;
use huerto_hogar_core::checkout::CheckoutSummary;
use huerto_hogar_core::models::Order;

use crate::error::AppError;
use crate::filters;
use crate::middleware::{OptionalAuth, PageContext, session_order};
use crate::state::AppState;

/// Receipt page template.
#[derive(Template, WebTemplate)]
#[template(path = "boleta/show.html")]
pub struct BoletaTemplate {
    pub page: PageContext,
    pub order: Order,
    pub summary: CheckoutSummary,
}

/// Display the receipt for an order.
///
/// Orders placed from this session are always visible. A logged-in user
/// can also see their own orders from the order service.
#[instrument(skip(state, session, page, user))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    page: PageContext,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<OrderId>,
) -> Result<impl IntoResponse, AppError> {
    let not_found = || AppError::NotFound(format!("order {id}"));

    let order = match session_order(&session, id).await? {
        Some(order) => order,
        None => {
            let user = user.ok_or_else(not_found)?;
            let order = state.api().order(id, &user.token).await.map_err(|e| {
                if e.is_not_found() {
                    not_found()
                } else {
                    AppError::Api(e)
                }
            })?;
            // Someone else's order is reported as missing
            if order.user_id != Some(user.id()) {
                return Err(not_found());
            }
            order
        }
    };

    Ok(BoletaTemplate {
        page,
        summary: CheckoutSummary::for_order(&order),
        order,
    })
}
