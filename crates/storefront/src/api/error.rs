//! Errors from the external REST services.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Longest server message kept from a non-JSON error body.
const MAX_MESSAGE_CHARS: usize = 200;

/// Errors that can occur when calling the user, product or order service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never got a response.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// 5xx from the service.
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    /// Any other non-success status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl ApiError {
    /// Classify a non-success response.
    #[must_use]
    pub fn from_response(status: StatusCode, body: &str, retry_after: Option<u64>) -> Self {
        let message = server_message(body);
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized(message),
            StatusCode::FORBIDDEN => Self::Forbidden(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited(retry_after.unwrap_or(1)),
            s if s.is_server_error() => Self::Server {
                status: s.as_u16(),
                message,
            },
            s => Self::Status {
                status: s.as_u16(),
                message,
            },
        }
    }

    /// `true` for failures on the service's side or in transit, which are
    /// worth reporting to Sentry.
    #[must_use]
    pub const fn is_server_side(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Parse(_) | Self::Server { .. })
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// Banner text for a failed request.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Http(_) => "No se pudo conectar con el servidor. Intenta nuevamente.".to_string(),
            Self::Parse(_) => "El servidor envió una respuesta inválida.".to_string(),
            Self::Unauthorized(_) => {
                "Tu sesión expiró. Vuelve a iniciar sesión.".to_string()
            }
            Self::Forbidden(_) => "No tienes permisos para realizar esta acción.".to_string(),
            Self::NotFound(_) => "El recurso solicitado no existe.".to_string(),
            Self::RateLimited(secs) => {
                format!("Demasiadas solicitudes. Intenta en {secs} segundos.")
            }
            Self::Server { message, .. } => with_detail("Error del servidor.", message),
            Self::Status { message, .. } => with_detail("No se pudo completar la solicitud.", message),
        }
    }

    /// Banner text for a failed login, tailored per status.
    #[must_use]
    pub fn login_message(&self) -> String {
        match self {
            Self::Unauthorized(_) => "Correo o contraseña incorrectos.".to_string(),
            Self::Forbidden(_) => "Tu cuenta no tiene acceso.".to_string(),
            Self::NotFound(_) => "No existe una cuenta con ese correo.".to_string(),
            Self::Server { .. } => {
                "Error del servidor. Intenta nuevamente más tarde.".to_string()
            }
            other => other.user_message(),
        }
    }
}

fn with_detail(prefix: &str, message: &str) -> String {
    if message.is_empty() {
        prefix.to_string()
    } else {
        format!("{prefix} {message}")
    }
}

/// The service's `{"message": ...}`, or the raw body truncated.
fn server_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body).map_or_else(
        |_| body.trim().chars().take(MAX_MESSAGE_CHARS).collect(),
        |parsed| parsed.message,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_response_classifies_status() {
        assert!(matches!(
            ApiError::from_response(StatusCode::UNAUTHORIZED, "", None),
            ApiError::Unauthorized(_)
        ));
        assert!(matches!(
            ApiError::from_response(StatusCode::NOT_FOUND, "", None),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from_response(StatusCode::TOO_MANY_REQUESTS, "", Some(30)),
            ApiError::RateLimited(30)
        ));
        assert!(matches!(
            ApiError::from_response(StatusCode::BAD_GATEWAY, "", None),
            ApiError::Server { status: 502, .. }
        ));
        assert!(matches!(
            ApiError::from_response(StatusCode::CONFLICT, "", None),
            ApiError::Status { status: 409, .. }
        ));
    }

    #[test]
    fn test_server_message_prefers_json_message() {
        let err = ApiError::from_response(
            StatusCode::CONFLICT,
            r#"{"message":"El correo ya está registrado"}"#,
            None,
        );
        assert_eq!(
            err.user_message(),
            "No se pudo completar la solicitud. El correo ya está registrado"
        );
    }

    #[test]
    fn test_server_message_truncates_raw_body() {
        let body = "x".repeat(1000);
        let ApiError::Server { message, .. } =
            ApiError::from_response(StatusCode::INTERNAL_SERVER_ERROR, &body, None)
        else {
            panic!("expected server error");
        };
        assert_eq!(message.len(), MAX_MESSAGE_CHARS);
    }

    #[test]
    fn test_login_messages_per_status() {
        let msg = |status| ApiError::from_response(status, "", None).login_message();
        assert_eq!(msg(StatusCode::UNAUTHORIZED), "Correo o contraseña incorrectos.");
        assert_eq!(msg(StatusCode::FORBIDDEN), "Tu cuenta no tiene acceso.");
        assert_eq!(msg(StatusCode::NOT_FOUND), "No existe una cuenta con ese correo.");
        assert_eq!(
            msg(StatusCode::INTERNAL_SERVER_ERROR),
            "Error del servidor. Intenta nuevamente más tarde."
        );
    }

    #[test]
    fn test_only_server_side_errors_are_reported() {
        assert!(ApiError::from_response(StatusCode::SERVICE_UNAVAILABLE, "", None).is_server_side());
        assert!(!ApiError::from_response(StatusCode::NOT_FOUND, "", None).is_server_side());
    }
}
