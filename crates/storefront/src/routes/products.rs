//! Product listing, product detail and reviews.

use std::sync::Arc;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use huerto_hogar_core::catalog::{self, ALL_CATEGORIES, ProductFilter, SortOrder};
use huerto_hogar_core::models::{Comment, Product, average_rating};
use huerto_hogar_core::validation::{CommentForm, FieldErrors, validate_comment};
use huerto_hogar_core::{Clp, ProductId};

use crate::error::{AppError, add_breadcrumb};
use crate::filters;
use crate::middleware::{Flash, OptionalAuth, PageContext};
use crate::routes::{SelectOption, redirect_with};
use crate::state::AppState;

/// Related products shown under the detail page.
const RELATED_PRODUCTS: usize = 4;

/// Listing query string.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub category: Option<String>,
    pub min: Option<String>,
    pub max: Option<String>,
    pub sort: Option<String>,
    pub q: Option<String>,
}

impl ListingQuery {
    fn filter(&self) -> ProductFilter {
        ProductFilter::from_query(
            self.category.as_deref(),
            self.min.as_deref(),
            self.max.as_deref(),
            self.q.as_deref(),
            self.sort.as_deref(),
        )
    }
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub page: PageContext,
    pub flash: Flash,
    pub products: Vec<Product>,
    pub total: usize,
    pub categories: Vec<SelectOption>,
    pub sort_options: Vec<SelectOption>,
    pub min: String,
    pub max: String,
    pub q: String,
    pub price_floor: Clp,
    pub price_ceiling: Clp,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub page: PageContext,
    pub flash: Flash,
    pub product: Product,
    pub comments: Vec<Comment>,
    pub average: Option<String>,
    pub related: Vec<Product>,
    pub form: CommentForm,
    pub errors: FieldErrors,
}

/// Display the product listing.
#[instrument(skip(state, page, flash))]
pub async fn index(
    State(state): State<AppState>,
    page: PageContext,
    Query(query): Query<ListingQuery>,
    Query(mut flash): Query<Flash>,
) -> impl IntoResponse {
    let products = match state.api().products().await {
        Ok(products) => products,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load products");
            flash.error = Some(e.user_message());
            Arc::default()
        }
    };

    let categories = match state.api().categories().await {
        Ok(categories) => categories.as_ref().clone(),
        Err(e) => {
            tracing::debug!(error = %e, "Falling back to categories present in the catalog");
            catalog::categories(&products)
        }
    };

    let filter = query.filter();
    let selected_category = filter.category.as_deref().unwrap_or(ALL_CATEGORIES);
    let mut category_options = vec![SelectOption {
        value: ALL_CATEGORIES.to_string(),
        label: "Todas".to_string(),
        selected: filter.category.is_none(),
    }];
    category_options.extend(SelectOption::list(
        categories.iter().map(String::as_str),
        selected_category,
    ));

    let sort_options = SortOrder::ALL
        .into_iter()
        .map(|order| SelectOption {
            value: order.as_str().to_string(),
            label: order.label().to_string(),
            selected: order == filter.sort,
        })
        .collect();

    let (price_floor, price_ceiling) = catalog::price_bounds(&products);

    ProductsIndexTemplate {
        page,
        flash,
        products: filter.apply(&products).into_iter().cloned().collect(),
        total: products.len(),
        categories: category_options,
        sort_options,
        min: filter
            .min_price
            .map(|p| p.pesos().to_string())
            .unwrap_or_default(),
        max: filter
            .max_price
            .map(|p| p.pesos().to_string())
            .unwrap_or_default(),
        q: query.q.unwrap_or_default(),
        price_floor,
        price_ceiling,
    }
}

/// Display a product with its reviews.
#[instrument(skip(state, page, flash, user))]
pub async fn show(
    State(state): State<AppState>,
    page: PageContext,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<ProductId>,
    Query(flash): Query<Flash>,
) -> Result<Response, AppError> {
    let form = CommentForm {
        author: user.map(|u| u.user.full_name()).unwrap_or_default(),
        ..CommentForm::default()
    };
    render_show(&state, page, id, flash, form, FieldErrors::new(), StatusCode::OK).await
}

/// Post a review on a product.
#[instrument(skip(state, page, user, form))]
pub async fn comment(
    State(state): State<AppState>,
    page: PageContext,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<ProductId>,
    Form(form): Form<CommentForm>,
) -> Result<Response, AppError> {
    let comment = match validate_comment(&form) {
        Ok(comment) => comment,
        Err(errors) => {
            return render_show(
                &state,
                page,
                id,
                Flash::default(),
                form,
                errors,
                StatusCode::UNPROCESSABLE_ENTITY,
            )
            .await;
        }
    };

    let token = user.as_ref().map(|u| &u.token);
    match state.api().post_comment(id, &comment, token).await {
        Ok(_) => {
            let product_id = id.to_string();
            add_breadcrumb("review", "Posted review", Some(&[("product_id", product_id.as_str())]));
            Ok(redirect_with(
                &format!("/products/{id}"),
                "success",
                "¡Gracias! Tu comentario fue publicado.",
            )
            .into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to post review");
            render_show(
                &state,
                page,
                id,
                Flash::error(e.user_message()),
                form,
                FieldErrors::new(),
                StatusCode::OK,
            )
            .await
        }
    }
}

async fn render_show(
    state: &AppState,
    page: PageContext,
    id: ProductId,
    flash: Flash,
    form: CommentForm,
    errors: FieldErrors,
    status: StatusCode,
) -> Result<Response, AppError> {
    let product = state.api().product(id).await.map_err(|e| {
        if e.is_not_found() {
            AppError::NotFound(format!("product {id}"))
        } else {
            AppError::Api(e)
        }
    })?;

    let comments = match state.api().product_comments(id).await {
        Ok(comments) => comments,
        Err(e) => {
            tracing::debug!(error = %e, "Using comments embedded in the product");
            product.comments.clone()
        }
    };

    let related = state
        .api()
        .products()
        .await
        .map(|all| related_products(&all, &product))
        .unwrap_or_default();

    let template = ProductShowTemplate {
        page,
        flash,
        average: average_rating(&comments).map(|avg| format!("{avg:.1}")),
        comments,
        related,
        product,
        form,
        errors,
    };
    Ok((status, template).into_response())
}

/// Other in-stock products from the same category.
fn related_products(all: &[Product], product: &Product) -> Vec<Product> {
    all.iter()
        .filter(|p| p.id != product.id && p.category == product.category && p.in_stock())
        .take(RELATED_PRODUCTS)
        .cloned()
        .collect()
}
