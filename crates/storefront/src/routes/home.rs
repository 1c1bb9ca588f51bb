//! Home page route handler.

use std::sync::Arc;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use tracing::instrument;

use huerto_hogar_core::catalog;
use huerto_hogar_core::content::Post;
use huerto_hogar_core::models::Product;

use crate::filters;
use crate::middleware::{Flash, PageContext};
use crate::state::AppState;

/// Products shown in the featured grid.
const FEATURED_PRODUCTS: usize = 8;

/// Posts shown under "Del blog".
const RECENT_POSTS: usize = 3;

#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub page: PageContext,
    pub flash: Flash,
    pub featured: Vec<Product>,
    pub categories: Vec<String>,
    pub posts: Vec<Post>,
}

/// Featured in-stock products and the latest posts.
#[instrument(skip(state, page))]
pub async fn home(
    State(state): State<AppState>,
    page: PageContext,
    Query(mut flash): Query<Flash>,
) -> impl IntoResponse {
    let products = match state.api().products().await {
        Ok(products) => products,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load featured products");
            if flash.error.is_none() {
                flash.error = Some(e.user_message());
            }
            Arc::default()
        }
    };

    let featured = products
        .iter()
        .filter(|p| p.in_stock())
        .take(FEATURED_PRODUCTS)
        .cloned()
        .collect();

    HomeTemplate {
        page,
        flash,
        featured,
        categories: catalog::categories(&products),
        posts: state
            .content()
            .recent_posts(RECENT_POSTS, None)
            .into_iter()
            .cloned()
            .collect(),
    }
}
