//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request spans)
//! 3. Request ID (`x-request-id` on span, Sentry scope and response)
//! 4. Security headers (CSP, frame and referrer policy)
//! 5. Session layer (tower-sessions)
//! 6. Rate limiting on `/auth` (governor)

pub mod auth;
pub mod page;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth, clear_current_user, set_current_user};
pub use page::{Flash, PageContext};
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{
    create_session_layer, load_cart, remember_order, save_cart, session_layer, session_order,
    session_orders,
};
