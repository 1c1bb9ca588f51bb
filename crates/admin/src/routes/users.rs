//! User management handlers.
//!
//! Forms validate like storefront registration; on edit a blank password
//! keeps the current one.

use askama::Template;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use huerto_hogar_core::models::User;
use huerto_hogar_core::regions::REGIONS;
use huerto_hogar_core::validation::{
    FieldErrors, UserForm, validate_new_user, validate_user_update,
};
use huerto_hogar_core::{UserId, UserRole};

use crate::{
    filters,
    middleware::RequireAdmin,
    models::CurrentAdmin,
    routes::{AdminUserView, Flash, after_mutation, redirect_with, render, session_expired, table_rows},
    state::AppState,
};

const LIST_PATH: &str = "/users";

/// An `<option>` in a select.
#[derive(Debug, Clone)]
pub struct Choice {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

fn region_choices(selected: &str) -> Vec<Choice> {
    REGIONS
        .iter()
        .map(|&region| Choice {
            value: region,
            label: region,
            selected: region == selected,
        })
        .collect()
}

fn role_choices(selected: Option<&str>) -> Vec<Choice> {
    let selected = selected
        .and_then(|s| s.parse::<UserRole>().ok())
        .unwrap_or_default();
    [(UserRole::User, "Cliente"), (UserRole::Admin, "Administrador")]
        .into_iter()
        .map(|(role, label)| Choice {
            value: role.as_str(),
            label,
            selected: role == selected,
        })
        .collect()
}

/// User table template.
#[derive(Template)]
#[template(path = "users/index.html")]
pub struct UsersIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub flash: Flash,
    pub users: Vec<User>,
    /// The logged-in admin, who may not delete themselves.
    pub self_id: UserId,
}

/// New/edit user form template.
#[derive(Template)]
#[template(path = "users/form.html")]
pub struct UserFormTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub flash: Flash,
    /// `None` while creating.
    pub user_id: Option<UserId>,
    pub form: UserForm,
    pub errors: FieldErrors,
    pub regions: Vec<Choice>,
    pub roles: Vec<Choice>,
}

impl UserFormTemplate {
    fn new(admin: &CurrentAdmin, user_id: Option<UserId>, form: UserForm, errors: FieldErrors) -> Self {
        Self {
            admin_user: AdminUserView::from(admin),
            current_path: LIST_PATH.to_string(),
            flash: Flash::default(),
            user_id,
            regions: region_choices(&form.region),
            roles: role_choices(form.role.as_deref()),
            form,
            errors,
        }
    }

    fn invalid(self) -> Response {
        (StatusCode::UNPROCESSABLE_ENTITY, render(&self)).into_response()
    }
}

/// User table.
///
/// GET /users
#[instrument(skip(admin, state, session, flash))]
pub async fn index(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Query(mut flash): Query<Flash>,
) -> Response {
    let result = state.api().users(&admin.token).await;
    let mut users = match table_rows(&session, &mut flash, result).await {
        Ok(rows) => rows,
        Err(response) => return response,
    };
    users.sort_by_key(|u| u.id);

    render(&UsersIndexTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: LIST_PATH.to_string(),
        flash,
        users,
        self_id: admin.id,
    })
    .into_response()
}

/// Empty user form.
///
/// GET /users/new
pub async fn new(RequireAdmin(admin): RequireAdmin) -> Response {
    render(&UserFormTemplate::new(&admin, None, UserForm::default(), FieldErrors::new()))
        .into_response()
}

/// Create a user.
///
/// POST /users
#[instrument(skip(admin, state, session, form), fields(email = %form.email))]
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UserForm>,
) -> Response {
    let today = chrono::Local::now().date_naive();
    let new_user = match validate_new_user(&form, today) {
        Ok(user) => user,
        Err(errors) => return UserFormTemplate::new(&admin, None, form, errors).invalid(),
    };

    let result = state.api().create_user(&new_user, &admin.token).await;
    after_mutation(&session, LIST_PATH, result, "Usuario creado.").await
}

/// Form pre-filled from the user. Passwords stay blank.
///
/// GET /users/{id}/edit
#[instrument(skip(admin, state, session))]
pub async fn edit(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<UserId>,
) -> Response {
    let user = match state.api().user(id, &admin.token).await {
        Ok(user) => user,
        Err(err) if err.is_unauthorized() => return session_expired(&session).await,
        Err(err) => {
            tracing::warn!(error = %err, "Failed to load user for editing");
            return redirect_with(LIST_PATH, "error", &err.user_message()).into_response();
        }
    };

    let form = UserForm::from_user(&user);
    render(&UserFormTemplate::new(&admin, Some(id), form, FieldErrors::new())).into_response()
}

/// Replace a user.
///
/// POST /users/{id}
#[instrument(skip(admin, state, session, form))]
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<UserId>,
    Form(form): Form<UserForm>,
) -> Response {
    let today = chrono::Local::now().date_naive();
    let update = match validate_user_update(&form, today) {
        Ok(update) => update,
        Err(errors) => return UserFormTemplate::new(&admin, Some(id), form, errors).invalid(),
    };

    let result = state.api().update_user(id, &update, &admin.token).await;
    after_mutation(&session, LIST_PATH, result, "Usuario actualizado.").await
}

/// Delete a user. An admin can't delete their own account.
///
/// POST /users/{id}/delete
#[instrument(skip(admin, state, session))]
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<UserId>,
) -> Response {
    if id == admin.id {
        return redirect_with(LIST_PATH, "error", "No puedes eliminar tu propia cuenta.")
            .into_response();
    }
    let result = state.api().delete_user(id, &admin.token).await;
    after_mutation(&session, LIST_PATH, result, "Usuario eliminado.").await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_choices_default_to_customer() {
        let roles = role_choices(None);
        assert!(roles[0].selected);
        assert_eq!(roles[0].value, "USER");

        let roles = role_choices(Some("admin"));
        assert!(roles[1].selected && !roles[0].selected);
    }

    #[test]
    fn test_region_choices_mark_one() {
        let choices = region_choices(REGIONS[3]);
        assert_eq!(choices.len(), 16);
        assert_eq!(choices.iter().filter(|c| c.selected).count(), 1);
    }
}
