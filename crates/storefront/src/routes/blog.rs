//! Blog route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::instrument;

use huerto_hogar_core::content::Post;

use crate::error::AppError;
use crate::filters;
use crate::middleware::PageContext;
use crate::state::AppState;

/// "Más artículos" links under a post.
const MORE_POSTS: usize = 3;

/// Blog index page template.
#[derive(Template, WebTemplate)]
#[template(path = "blog/index.html")]
pub struct BlogIndexTemplate {
    pub page: PageContext,
    pub posts: Vec<Post>,
}

/// Blog post page template.
#[derive(Template, WebTemplate)]
#[template(path = "blog/show.html")]
pub struct BlogPostTemplate {
    pub page: PageContext,
    pub post: Post,
    pub more: Vec<Post>,
}

/// Published posts, newest first.
#[instrument(skip_all)]
pub async fn index(State(state): State<AppState>, page: PageContext) -> impl IntoResponse {
    BlogIndexTemplate {
        page,
        posts: state.content().published_posts().cloned().collect(),
    }
}

/// A single post. Drafts are not found.
#[instrument(skip(state, page))]
pub async fn show(
    State(state): State<AppState>,
    page: PageContext,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let content = state.content();
    let post = content
        .published_post(&slug)
        .ok_or_else(|| AppError::NotFound(format!("post {slug}")))?;

    Ok(BlogPostTemplate {
        page,
        post: post.clone(),
        more: content
            .recent_posts(MORE_POSTS, Some(&slug))
            .into_iter()
            .cloned()
            .collect(),
    })
}
