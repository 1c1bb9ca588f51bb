//! Review moderation.

use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use huerto_hogar_core::CommentId;
use huerto_hogar_core::models::Comment;

use crate::{
    filters,
    middleware::RequireAdmin,
    routes::{AdminUserView, Flash, after_mutation, render, table_rows},
    state::AppState,
};

/// Comment table template.
#[derive(Template)]
#[template(path = "comments/index.html")]
pub struct CommentsIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub flash: Flash,
    pub comments: Vec<Comment>,
}

/// Every comment, newest first.
///
/// GET /comments
#[instrument(skip(admin, state, session, flash))]
pub async fn index(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Query(mut flash): Query<Flash>,
) -> Response {
    let result = state.api().comments(&admin.token).await;
    let mut comments = match table_rows(&session, &mut flash, result).await {
        Ok(rows) => rows,
        Err(response) => return response,
    };
    comments.sort_by(|a, b| b.date.cmp(&a.date));

    render(&CommentsIndexTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/comments".to_string(),
        flash,
        comments,
    })
    .into_response()
}

/// Delete a comment.
///
/// POST /comments/{id}/delete
#[instrument(skip(admin, state, session))]
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<CommentId>,
) -> Response {
    let result = state.api().delete_comment(id, &admin.token).await;
    after_mutation(&session, "/comments", result, "Comentario eliminado.").await
}
