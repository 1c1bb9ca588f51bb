//! Unified error handling with Sentry integration.
//!
//! Handlers return `Result<T, AppError>`. Failures on our side or on a
//! service's side are captured to Sentry; clients only ever see a short
//! Spanish message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::api::ApiError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// A call to the user, product or order service failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Reading or writing the session failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    const fn is_server_error(&self) -> bool {
        match self {
            Self::Api(err) => err.is_server_side(),
            Self::Session(_) => true,
            Self::NotFound(_) => false,
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Api(ApiError::NotFound(_)) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Api(ApiError::Unauthorized(_)) => StatusCode::UNAUTHORIZED,
            Self::Api(ApiError::Forbidden(_)) => StatusCode::FORBIDDEN,
            Self::Api(ApiError::RateLimited(_)) => StatusCode::TOO_MANY_REQUESTS,
            Self::Api(_) => StatusCode::BAD_GATEWAY,
            Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Internal details stay in the logs
        let message = match &self {
            Self::Api(err) => err.user_message(),
            Self::Session(_) => "Error interno del servidor".to_string(),
            Self::NotFound(_) => "Página no encontrada".to_string(),
        };

        (self.status(), message).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Associate subsequent Sentry events with a user.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context on logout.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for a shopper action.
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "3")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    for (key, value) in data.unwrap_or_default() {
        breadcrumb.data.insert(
            (*key).to_string(),
            serde_json::Value::String((*value).to_string()),
        );
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product 3".to_string());
        assert_eq!(err.to_string(), "Not found: product 3");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(status(AppError::NotFound(String::new())), StatusCode::NOT_FOUND);
        let session = tower_sessions::session::Error::Store(
            tower_sessions::session_store::Error::Backend("db down".to_string()),
        );
        assert_eq!(status(session.into()), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_api_errors_map_to_gateway_statuses() {
        assert_eq!(
            status(ApiError::NotFound(String::new()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(ApiError::RateLimited(5).into()),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            status(
                ApiError::Server {
                    status: 503,
                    message: String::new()
                }
                .into()
            ),
            StatusCode::BAD_GATEWAY
        );
    }
}
