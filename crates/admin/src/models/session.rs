//! Session-related types for admin authentication.

use serde::{Deserialize, Serialize};

use huerto_hogar_core::models::User;
use huerto_hogar_core::UserId;

/// Bearer token issued by the user service. Never printed.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BearerToken(String);

impl BearerToken {
    #[must_use]
    pub const fn new(token: String) -> Self {
        Self(token)
    }

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

/// Session-stored admin identity.
///
/// Only users whose role is `ADMIN` ever get here; see
/// [`CurrentAdmin::from_login`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    pub id: UserId,
    pub email: String,
    /// Display name for the header.
    pub name: String,
    pub token: BearerToken,
}

impl CurrentAdmin {
    /// Admin identity for a successful login, or `None` for a non-admin.
    #[must_use]
    pub fn from_login(user: User, token: String) -> Option<Self> {
        if !user.role.is_admin() {
            return None;
        }
        Some(Self {
            id: user.id,
            name: user.full_name(),
            email: user.email,
            token: BearerToken::new(token),
        })
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";
}
