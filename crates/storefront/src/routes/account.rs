//! Account page: profile and order history.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use huerto_hogar_core::models::{Order, User};

use crate::error::{AppError, clear_sentry_user};
use crate::filters;
use crate::middleware::{Flash, PageContext, RequireAuth, clear_current_user};
use crate::routes::redirect_with;
use crate::state::AppState;

/// Account page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountTemplate {
    pub page: PageContext,
    pub flash: Flash,
    pub user: User,
    pub orders: Vec<Order>,
}

/// Display the logged-in user's profile and orders, newest first.
///
/// A token the order service no longer accepts ends the session.
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    page: PageContext,
    RequireAuth(current): RequireAuth,
    Query(mut flash): Query<Flash>,
) -> Result<Response, AppError> {
    let orders = match state
        .api()
        .orders_for_user(current.id(), &current.token)
        .await
    {
        Ok(mut orders) => {
            orders.sort_by(|a, b| b.date.cmp(&a.date));
            orders
        }
        Err(e) if e.is_unauthorized() => {
            clear_current_user(&session).await?;
            clear_sentry_user();
            return Ok(redirect_with("/auth/login", "error", &e.user_message()).into_response());
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load order history");
            flash.error = Some(e.user_message());
            Vec::new()
        }
    };

    Ok(AccountTemplate {
        page,
        flash,
        user: current.user,
        orders,
    }
    .into_response())
}
