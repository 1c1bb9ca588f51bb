//! Authentication route handlers.
//!
//! Credentials are checked by the user service; on success the user and
//! bearer token are stored in the session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use huerto_hogar_core::models::AuthResponse;
use huerto_hogar_core::validation::{FieldErrors, UserForm, validate_registration};

use crate::error::{AppError, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{
    Flash, OptionalAuth, PageContext, clear_current_user, set_current_user,
};
use crate::models::{BearerToken, CurrentUser};
use crate::routes::{SelectOption, redirect_with, region_options};
use crate::state::AppState;

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
    pub flash: Flash,
    pub email: String,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub page: PageContext,
    pub flash: Flash,
    pub form: UserForm,
    pub errors: FieldErrors,
    pub regions: Vec<SelectOption>,
}

impl RegisterTemplate {
    fn new(page: PageContext, form: UserForm, errors: FieldErrors) -> Self {
        Self {
            page,
            flash: Flash::default(),
            regions: region_options(&form.region),
            form,
            errors,
        }
    }
}

/// Put the logged-in user in the session and the Sentry scope.
async fn start_session(session: &Session, auth: AuthResponse) -> Result<CurrentUser, AppError> {
    let current = CurrentUser::new(auth.user, BearerToken::new(auth.token));
    set_current_user(session, &current).await?;
    set_sentry_user(&current.id(), Some(current.email()));
    Ok(current)
}

// =============================================================================
// Login
// =============================================================================

/// Display the login page.
pub async fn login_page(
    page: PageContext,
    OptionalAuth(user): OptionalAuth,
    Query(flash): Query<Flash>,
) -> Response {
    if user.is_some() {
        return Redirect::to("/account").into_response();
    }
    LoginTemplate {
        page,
        flash,
        email: String::new(),
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    page: PageContext,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let email = form.email.trim().to_lowercase();
    if email.is_empty() || form.password.is_empty() {
        return Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            LoginTemplate {
                page,
                flash: Flash::error("Ingresa tu correo y contraseña."),
                email,
            },
        )
            .into_response());
    }

    match state.api().login(&email, &form.password).await {
        Ok(auth) => {
            let user = start_session(&session, auth).await?;
            tracing::info!(user_id = %user.id(), "User logged in");
            Ok(redirect_with(
                "/account",
                "success",
                &format!("¡Hola, {}!", user.user.first_name),
            )
            .into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            Ok(LoginTemplate {
                page,
                flash: Flash::error(e.login_message()),
                email,
            }
            .into_response())
        }
    }
}

// =============================================================================
// Registration
// =============================================================================

/// Display the registration page.
pub async fn register_page(page: PageContext, OptionalAuth(user): OptionalAuth) -> Response {
    if user.is_some() {
        return Redirect::to("/account").into_response();
    }
    RegisterTemplate::new(page, UserForm::default(), FieldErrors::new()).into_response()
}

/// Handle registration form submission.
///
/// A valid form is sent to the user service, then the new account is
/// logged in with the same credentials.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    page: PageContext,
    Form(form): Form<UserForm>,
) -> Result<Response, AppError> {
    let today = chrono::Local::now().date_naive();
    let new_user = match validate_registration(&form, today) {
        Ok(user) => user,
        Err(errors) => {
            let form = UserForm {
                password: String::new(),
                password_confirm: String::new(),
                ..form
            };
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                RegisterTemplate::new(page, form, errors),
            )
                .into_response());
        }
    };

    if let Err(e) = state.api().register(&new_user).await {
        tracing::warn!(error = %e, "Registration failed");
        let form = UserForm {
            password: String::new(),
            password_confirm: String::new(),
            ..form
        };
        let mut template = RegisterTemplate::new(page, form, FieldErrors::new());
        template.flash = Flash::error(e.user_message());
        return Ok(template.into_response());
    }
    tracing::info!(email = %new_user.email, "User registered");

    match state
        .api()
        .login(new_user.email.as_str(), &new_user.password)
        .await
    {
        Ok(auth) => {
            start_session(&session, auth).await?;
            Ok(redirect_with("/account", "success", "¡Bienvenido a HuertoHogar!").into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Login after registration failed");
            Ok(redirect_with(
                "/auth/login",
                "success",
                "Cuenta creada. Inicia sesión para continuar.",
            )
            .into_response())
        }
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Log out. The cart stays in the session.
pub async fn logout(session: Session) -> Result<Redirect, AppError> {
    clear_current_user(&session).await?;
    clear_sentry_user();
    Ok(redirect_with("/", "success", "Sesión cerrada"))
}
