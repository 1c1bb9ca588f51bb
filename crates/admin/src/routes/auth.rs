//! Authentication route handlers for admin.
//!
//! Credentials go to the user service; only accounts with the `ADMIN` role
//! get a back-office session.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{clear_current_admin, set_current_admin};
use crate::models::{CurrentAdmin, session_keys};
use crate::routes::{Flash, render};
use crate::state::AppState;

/// Shown when a valid login belongs to a customer account.
pub const ACCESS_DENIED: &str = "Acceso denegado: se requiere rol de administrador.";

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login page template.
#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub flash: Flash,
    pub email: String,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", get(login_page).post(login))
        .route("/auth/logout", post(logout))
}

/// Render the login page. An admin already logged in goes to the dashboard.
///
/// GET /auth/login
async fn login_page(session: Session, Query(flash): Query<Flash>) -> Response {
    let logged_in = session
        .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await
        .ok()
        .flatten()
        .is_some();
    if logged_in {
        return Redirect::to("/").into_response();
    }
    render(&LoginTemplate {
        flash,
        email: String::new(),
    })
    .into_response()
}

fn login_failed(status: StatusCode, email: String, message: String) -> Response {
    let template = LoginTemplate {
        flash: Flash {
            success: None,
            error: Some(message),
        },
        email,
    };
    (status, render(&template)).into_response()
}

/// Check credentials with the user service and reject non-admins.
///
/// POST /auth/login
#[instrument(skip(state, session, form), fields(email = %form.email))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let email = form.email.trim().to_lowercase();
    if email.is_empty() || form.password.is_empty() {
        return Ok(login_failed(
            StatusCode::UNPROCESSABLE_ENTITY,
            email,
            "Ingresa tu correo y contraseña.".to_string(),
        ));
    }

    let auth = match state.api().login(&email, &form.password).await {
        Ok(auth) => auth,
        Err(err) => {
            let status = if err.is_server_side() {
                tracing::error!(error = %err, "Admin login failed");
                StatusCode::BAD_GATEWAY
            } else {
                tracing::warn!(error = %err, "Admin login rejected");
                StatusCode::UNAUTHORIZED
            };
            return Ok(login_failed(status, email, err.login_message()));
        }
    };

    let Some(admin) = CurrentAdmin::from_login(auth.user, auth.token) else {
        tracing::warn!("Non-admin account tried to log in");
        return Ok(login_failed(
            StatusCode::FORBIDDEN,
            email,
            ACCESS_DENIED.to_string(),
        ));
    };

    set_current_admin(&session, &admin).await?;
    set_sentry_user(&admin.id, Some(admin.email.as_str()));
    tracing::info!(admin_id = %admin.id, "Admin logged in");
    Ok(Redirect::to("/").into_response())
}

/// Logout and clear session.
///
/// POST /auth/logout
async fn logout(session: Session) -> Result<Redirect, AppError> {
    clear_current_admin(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/auth/login"))
}
