//! Static content pages ("Nosotros", "Preguntas frecuentes", ...).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::instrument;

use huerto_hogar_core::content::Page;

use crate::error::AppError;
use crate::filters;
use crate::middleware::PageContext;
use crate::state::AppState;

/// Content page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/show.html")]
pub struct ContentPageTemplate {
    pub page: PageContext,
    pub content: Page,
}

/// Serve a markdown page by slug.
///
/// # Errors
///
/// Returns 404 if no page has that slug.
#[instrument(skip(state, page))]
pub async fn show(
    State(state): State<AppState>,
    page: PageContext,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let content = state
        .content()
        .page(&slug)
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("page {slug}")))?;
    Ok(ContentPageTemplate { page, content })
}
