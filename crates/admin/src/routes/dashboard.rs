//! Dashboard route handler.

use askama::Template;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use huerto_hogar_core::Clp;
use huerto_hogar_core::models::{Order, Product, total_revenue};

use crate::{
    api::ApiError,
    filters,
    middleware::RequireAdmin,
    routes::{AdminUserView, Flash, render, session_expired},
    state::AppState,
};

/// Orders shown in the "recent orders" table.
const RECENT_ORDERS: usize = 5;

/// Headline numbers.
#[derive(Debug, Clone, Default)]
pub struct DashboardMetrics {
    pub products: usize,
    pub orders: usize,
    pub revenue: Clp,
    pub users: usize,
}

/// Dashboard template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub flash: Flash,
    pub metrics: DashboardMetrics,
    pub low_stock: Vec<Product>,
    pub recent_orders: Vec<Order>,
}

/// Products under the low-stock threshold, scarcest first.
fn low_stock(products: &[Product]) -> Vec<Product> {
    let mut low: Vec<Product> = products.iter().filter(|p| p.is_low_stock()).cloned().collect();
    low.sort_by_key(|p| p.stock);
    low
}

/// The newest orders first.
fn recent(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by(|a, b| b.date.cmp(&a.date));
    orders.truncate(RECENT_ORDERS);
    orders
}

/// Dashboard page handler.
///
/// Each service is queried in parallel; a failing one leaves its figures at
/// zero and adds an error toast.
#[instrument(skip(admin, state, session, flash))]
pub async fn dashboard(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Query(mut flash): Query<Flash>,
) -> Response {
    let api = state.api();
    let (products, orders, users) = tokio::join!(
        api.products(&admin.token),
        api.orders(&admin.token),
        api.users(&admin.token),
    );

    let mut failures: Vec<ApiError> = Vec::new();
    let products = products.unwrap_or_else(|e| {
        failures.push(e);
        Vec::new()
    });
    let orders = orders.unwrap_or_else(|e| {
        failures.push(e);
        Vec::new()
    });
    let users = users.unwrap_or_else(|e| {
        failures.push(e);
        Vec::new()
    });

    if failures.iter().any(ApiError::is_unauthorized) {
        return session_expired(&session).await;
    }
    if let Some(first) = failures.first() {
        for err in &failures {
            tracing::error!(error = %err, "Failed to load dashboard data");
        }
        flash.error = Some(first.user_message());
    }

    let metrics = DashboardMetrics {
        products: products.len(),
        orders: orders.len(),
        revenue: total_revenue(&orders),
        users: users.len(),
    };

    let template = DashboardTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/".to_string(),
        flash,
        metrics,
        low_stock: low_stock(&products),
        recent_orders: recent(orders),
    };
    render(&template).into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use huerto_hogar_core::models::ShippingInfo;
    use huerto_hogar_core::{Email, OrderId, OrderStatus, ProductId};

    fn product(id: i32, stock: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Producto {id}"),
            category: "Frutas Frescas".to_string(),
            price: Clp::new(1000),
            stock,
            description: String::new(),
            origin: "Chile".to_string(),
            image: None,
            comments: Vec::new(),
        }
    }

    fn order(id: i32, day: u32) -> Order {
        Order {
            id: OrderId::new(id),
            user_id: None,
            date: Utc.with_ymd_and_hms(2025, 3, day, 12, 0, 0).unwrap(),
            status: OrderStatus::Pending,
            items: Vec::new(),
            shipping: ShippingInfo {
                first_name: "Ana".to_string(),
                last_name: "Pérez".to_string(),
                email: Email::parse("ana@duoc.cl").unwrap(),
                phone: None,
                region: "Región Metropolitana de Santiago".to_string(),
                commune: "Santiago".to_string(),
                address: "Av. Siempre Viva 123".to_string(),
                notes: None,
            },
            subtotal: Clp::new(1000),
            shipping_cost: Clp::new(3000),
            total: Clp::new(4000),
        }
    }

    #[test]
    fn test_low_stock_sorted_scarcest_first() {
        let products = vec![product(1, 8), product(2, 50), product(3, 0), product(4, 10)];
        let ids: Vec<i32> = low_stock(&products).iter().map(|p| p.id.as_i32()).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_recent_keeps_five_newest() {
        let orders = (1..=7).map(|i| order(i, i.unsigned_abs())).collect();
        let ids: Vec<i32> = recent(orders).iter().map(|o| o.id.as_i32()).collect();
        assert_eq!(ids, vec![7, 6, 5, 4, 3]);
    }
}
