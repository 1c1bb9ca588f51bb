//! Session-related types.
//!
//! The session replaces browser local storage: the cart, the orders placed
//! from this session and the logged-in user all live here.

use serde::{Deserialize, Serialize};

use huerto_hogar_core::models::User;
use huerto_hogar_core::{UserId, UserRole};

/// Bearer token issued by the user service. `Debug` never prints it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BearerToken(String);

impl BearerToken {
    #[must_use]
    pub const fn new(token: String) -> Self {
        Self(token)
    }

    /// The raw token, for the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken([REDACTED])")
    }
}

/// Session-stored user identity and token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub user: User,
    pub token: BearerToken,
}

impl CurrentUser {
    #[must_use]
    pub const fn new(user: User, token: BearerToken) -> Self {
        Self { user, token }
    }

    #[must_use]
    pub const fn id(&self) -> UserId {
        self.user.id
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.user.email
    }

    #[must_use]
    pub const fn role(&self) -> UserRole {
        self.user.role
    }
}

/// Session keys.
pub mod keys {
    /// The shopping cart (`huerto_hogar_core::cart::Cart`).
    pub const CART: &str = huerto_hogar_core::cart::Cart::SESSION_KEY;

    /// Orders placed from this session, newest last.
    pub const ORDERS: &str = "huerto_orders";

    /// The logged-in user and their token.
    pub const CURRENT_USER: &str = "current_user";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_redacted_in_debug() {
        let token = BearerToken::new("eyJhbGciOiJIUzI1NiJ9.secret".to_string());
        let debug_output = format!("{token:?}");
        assert!(!debug_output.contains("secret"));
        assert_eq!(token.expose(), "eyJhbGciOiJIUzI1NiJ9.secret");
    }

    #[test]
    fn test_token_serializes_as_plain_string() {
        let token = BearerToken::new("abc".to_string());
        assert_eq!(serde_json::to_string(&token).unwrap(), "\"abc\"");
    }
}
