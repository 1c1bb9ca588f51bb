//! Per-page context shared by every storefront template.

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::Deserialize;
use tower_sessions::Session;

use huerto_hogar_core::cart::Cart;

use crate::models::{CurrentUser, session_keys};

/// Header navigation state: who is logged in and how full the cart is.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    /// First name of the logged-in user.
    pub user_name: Option<String>,
    pub is_admin: bool,
    pub cart_count: u32,
    pub current_path: String,
}

impl PageContext {
    #[must_use]
    pub const fn is_logged_in(&self) -> bool {
        self.user_name.is_some()
    }

    /// `true` if `prefix` is the active navigation section.
    #[must_use]
    pub fn is_active(&self, prefix: &str) -> bool {
        if prefix == "/" {
            self.current_path == "/"
        } else {
            self.current_path.starts_with(prefix)
        }
    }
}

impl<S> FromRequestParts<S> for PageContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let current_path = parts.uri.path().to_string();
        let Some(session) = parts.extensions.get::<Session>() else {
            return Ok(Self {
                current_path,
                ..Self::default()
            });
        };

        let user = session
            .get::<CurrentUser>(session_keys::CURRENT_USER)
            .await
            .ok()
            .flatten();
        let cart_count = session
            .get::<Cart>(session_keys::CART)
            .await
            .ok()
            .flatten()
            .map_or(0, |cart| cart.item_count());

        Ok(Self {
            user_name: user.as_ref().map(|u| u.user.first_name.clone()),
            is_admin: user.is_some_and(|u| u.role().is_admin()),
            cart_count,
            current_path,
        })
    }
}

/// One-shot banner messages carried in the query string after a redirect.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Flash {
    pub success: Option<String>,
    pub error: Option<String>,
}

impl Flash {
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: None,
            error: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_active() {
        let ctx = PageContext {
            current_path: "/products/3".to_string(),
            ..PageContext::default()
        };
        assert!(ctx.is_active("/products"));
        assert!(!ctx.is_active("/"));
        assert!(!ctx.is_logged_in());
    }
}
