//! Order management handlers.

use askama::Template;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use huerto_hogar_core::checkout::CheckoutSummary;
use huerto_hogar_core::models::Order;
use huerto_hogar_core::{OrderId, OrderStatus};

use crate::{
    filters,
    middleware::RequireAdmin,
    routes::{AdminUserView, Flash, after_mutation, redirect_with, render, session_expired, table_rows},
    state::AppState,
};

const LIST_PATH: &str = "/orders";

/// Order table template.
#[derive(Template)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub flash: Flash,
    pub orders: Vec<Order>,
}

/// Order detail in the receipt layout, with the status form.
#[derive(Template)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub flash: Flash,
    pub order: Order,
    pub summary: CheckoutSummary,
    pub statuses: [OrderStatus; 5],
}

/// Status form data.
#[derive(Debug, Deserialize)]
pub struct StatusForm {
    #[serde(default)]
    pub status: String,
}

/// Order table, newest first.
///
/// GET /orders
#[instrument(skip(admin, state, session, flash))]
pub async fn index(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Query(mut flash): Query<Flash>,
) -> Response {
    let result = state.api().orders(&admin.token).await;
    let mut orders = match table_rows(&session, &mut flash, result).await {
        Ok(rows) => rows,
        Err(response) => return response,
    };
    orders.sort_by(|a, b| b.date.cmp(&a.date));

    render(&OrdersIndexTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: LIST_PATH.to_string(),
        flash,
        orders,
    })
    .into_response()
}

/// Order detail.
///
/// GET /orders/{id}
#[instrument(skip(admin, state, session, flash))]
pub async fn show(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<OrderId>,
    Query(flash): Query<Flash>,
) -> Response {
    let order = match state.api().order(id, &admin.token).await {
        Ok(order) => order,
        Err(err) if err.is_unauthorized() => return session_expired(&session).await,
        Err(err) => {
            tracing::warn!(error = %err, "Failed to load order");
            return redirect_with(LIST_PATH, "error", &err.user_message()).into_response();
        }
    };

    render(&OrderShowTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: LIST_PATH.to_string(),
        flash,
        summary: CheckoutSummary::for_order(&order),
        order,
        statuses: OrderStatus::ALL,
    })
    .into_response()
}

/// Change an order's status.
///
/// POST /orders/{id}/status
#[instrument(skip(admin, state, session))]
pub async fn update_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<OrderId>,
    Form(form): Form<StatusForm>,
) -> Response {
    let Ok(status) = form.status.parse::<OrderStatus>() else {
        return redirect_with(LIST_PATH, "error", "Estado de pedido inválido.").into_response();
    };

    let result = state.api().update_order_status(id, status, &admin.token).await;
    let message = format!("Pedido #{id} marcado como {}.", status.label());
    after_mutation(&session, LIST_PATH, result, &message).await
}

/// Delete an order.
///
/// POST /orders/{id}/delete
#[instrument(skip(admin, state, session))]
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<OrderId>,
) -> Response {
    let result = state.api().delete_order(id, &admin.token).await;
    after_mutation(&session, LIST_PATH, result, "Pedido eliminado.").await
}
