//! Session middleware configuration.
//!
//! Sessions hold the cart, the orders placed from the session and the
//! logged-in user. Production uses a `PostgreSQL` store; tests pass a
//! `MemoryStore` to [`session_layer`].

use huerto_hogar_core::OrderId;
use huerto_hogar_core::cart::Cart;
use huerto_hogar_core::models::Order;
use sqlx::PgPool;
use tower_sessions::{Expiry, Session, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::StorefrontConfig;
use crate::models::session_keys;

type SessionResult<T> = Result<T, tower_sessions::session::Error>;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "hh_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Receipts kept per session; older ones are dropped first.
pub const MAX_REMEMBERED_ORDERS: usize = 20;

/// Session layer over any store.
#[must_use]
pub fn session_layer<S: SessionStore + Clone>(store: S, secure: bool) -> SessionManagerLayer<S> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Session layer backed by `PostgreSQL`.
///
/// The sessions table is created by `hh-cli migrate storefront`.
#[must_use]
pub fn create_session_layer(
    pool: &PgPool,
    config: &StorefrontConfig,
) -> SessionManagerLayer<PostgresStore> {
    session_layer(PostgresStore::new(pool.clone()), config.is_secure())
}

/// The session's cart, empty if none was saved yet.
///
/// # Errors
///
/// Returns an error if the session store fails or the stored cart is corrupt.
pub async fn load_cart(session: &Session) -> SessionResult<Cart> {
    Ok(session
        .get::<Cart>(session_keys::CART)
        .await?
        .unwrap_or_default())
}

/// Persist the cart.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn save_cart(session: &Session, cart: &Cart) -> SessionResult<()> {
    session.insert(session_keys::CART, cart).await
}

/// Orders placed from this session, oldest first.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn session_orders(session: &Session) -> SessionResult<Vec<Order>> {
    Ok(session
        .get::<Vec<Order>>(session_keys::ORDERS)
        .await?
        .unwrap_or_default())
}

/// An order placed from this session, by id.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn session_order(session: &Session, id: OrderId) -> SessionResult<Option<Order>> {
    Ok(session_orders(session)
        .await?
        .into_iter()
        .find(|order| order.id == id))
}

/// Remember a placed order so its receipt can be shown without logging in.
///
/// Only the newest [`MAX_REMEMBERED_ORDERS`] are kept.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn remember_order(session: &Session, order: Order) -> SessionResult<()> {
    let mut orders = session_orders(session).await?;
    orders.retain(|existing| existing.id != order.id);
    orders.push(order);
    let excess = orders.len().saturating_sub(MAX_REMEMBERED_ORDERS);
    orders.drain(..excess);
    session.insert(session_keys::ORDERS, orders).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;
    use huerto_hogar_core::models::ShippingInfo;
    use huerto_hogar_core::{Clp, Email, OrderStatus};
    use tower_sessions::MemoryStore;

    use super::*;

    fn order(id: i32) -> Order {
        Order {
            id: OrderId::new(id),
            user_id: None,
            date: Utc::now(),
            status: OrderStatus::Pending,
            items: Vec::new(),
            shipping: ShippingInfo {
                first_name: "Ana".to_string(),
                last_name: "Pérez".to_string(),
                email: Email::parse("ana@duoc.cl").unwrap(),
                phone: None,
                region: "Región de Valparaíso".to_string(),
                commune: "Viña del Mar".to_string(),
                address: "Calle 1".to_string(),
                notes: None,
            },
            subtotal: Clp::new(1000),
            shipping_cost: Clp::new(3000),
            total: Clp::new(4000),
        }
    }

    #[tokio::test]
    async fn test_remembered_orders_keep_newest() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        for id in 1..=25 {
            remember_order(&session, order(id)).await.unwrap();
        }

        let orders = session_orders(&session).await.unwrap();
        assert_eq!(orders.len(), MAX_REMEMBERED_ORDERS);
        assert_eq!(orders[0].id, OrderId::new(6));
        assert_eq!(orders[19].id, OrderId::new(25));
        assert!(session_order(&session, OrderId::new(5)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remembering_same_order_twice_keeps_one() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        remember_order(&session, order(7)).await.unwrap();
        remember_order(&session, order(7)).await.unwrap();
        assert_eq!(session_orders(&session).await.unwrap().len(), 1);
    }
}
