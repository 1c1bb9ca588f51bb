//! Read-only views of the markdown content the storefront serves.

use askama::Template;
use axum::{extract::State, response::Html};

use huerto_hogar_core::content::{Page, Post};

use crate::{
    filters,
    middleware::RequireAdmin,
    routes::{AdminUserView, Flash, render},
    state::AppState,
};

/// Blog post table template.
#[derive(Template)]
#[template(path = "content/blog.html")]
pub struct BlogTemplate<'a> {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub flash: Flash,
    pub posts: &'a [Post],
}

/// Static page table template.
#[derive(Template)]
#[template(path = "content/pages.html")]
pub struct PagesTemplate<'a> {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub flash: Flash,
    pub pages: Vec<&'a Page>,
}

/// Every post, drafts included, newest first.
///
/// GET /content/blog
pub async fn blog(RequireAdmin(admin): RequireAdmin, State(state): State<AppState>) -> Html<String> {
    render(&BlogTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/content/blog".to_string(),
        flash: Flash::default(),
        posts: state.content().all_posts(),
    })
}

/// GET /content/pages
pub async fn pages(RequireAdmin(admin): RequireAdmin, State(state): State<AppState>) -> Html<String> {
    render(&PagesTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: "/content/pages".to_string(),
        flash: Flash::default(),
        pages: state.content().pages(),
    })
}
