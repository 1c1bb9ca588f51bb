//! Errors from the user, product and order services.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Longest server message shown from a body that is not `{"message": ...}`.
const MAX_MESSAGE_CHARS: usize = 200;

/// Errors that can occur when calling a HuertoHogar service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The bearer token was missing, expired or wrong.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The service refused the request (validation, conflict).
    #[error("Rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// 5xx from the service.
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl ApiError {
    /// Classify a non-success response by status.
    #[must_use]
    pub fn from_response(status: StatusCode, body: &str, retry_after: Option<u64>) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body).map_or_else(
            |_| body.trim().chars().take(MAX_MESSAGE_CHARS).collect(),
            |parsed| parsed.message,
        );
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized(message),
            StatusCode::FORBIDDEN => Self::Forbidden(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited(retry_after.unwrap_or(1)),
            s if s.is_server_error() => Self::Server {
                status: s.as_u16(),
                message,
            },
            s => Self::Rejected {
                status: s.as_u16(),
                message,
            },
        }
    }

    /// Failures worth a Sentry event.
    #[must_use]
    pub const fn is_server_side(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Parse(_) | Self::Server { .. })
    }

    /// The admin's token is no longer accepted.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }

    /// Toast text for a failed call. Service messages are passed through.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Http(_) => "No se pudo conectar con el servicio.".to_string(),
            Self::Parse(_) => "Respuesta inválida del servicio.".to_string(),
            Self::Unauthorized(_) => "Sesión expirada. Inicia sesión nuevamente.".to_string(),
            Self::Forbidden(_) => "No tienes permisos para esta acción.".to_string(),
            Self::NotFound(msg) if msg.is_empty() => "Registro no encontrado.".to_string(),
            Self::RateLimited(secs) => format!("Demasiadas solicitudes. Reintenta en {secs} s."),
            Self::NotFound(msg) | Self::Rejected { message: msg, .. } => msg.clone(),
            Self::Server { status, message } if message.is_empty() => {
                format!("Error del servidor ({status}).")
            }
            Self::Server { status, message } => format!("Error del servidor ({status}): {message}"),
        }
    }

    /// Login failure text, tailored per status.
    #[must_use]
    pub fn login_message(&self) -> String {
        match self {
            Self::Unauthorized(_) => "Credenciales incorrectas.".to_string(),
            Self::Forbidden(_) => "Acceso denegado.".to_string(),
            Self::NotFound(_) => "Usuario no encontrado.".to_string(),
            Self::Server { .. } => "Error del servidor. Intenta más tarde.".to_string(),
            other => other.user_message(),
        }
    }
}
