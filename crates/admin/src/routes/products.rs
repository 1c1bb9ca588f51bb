//! Product management handlers.

use askama::Template;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use huerto_hogar_core::ProductId;
use huerto_hogar_core::models::Product;
use huerto_hogar_core::validation::{FieldErrors, ProductForm, validate_product};

use crate::{
    filters,
    middleware::RequireAdmin,
    models::CurrentAdmin,
    routes::{AdminUserView, Flash, after_mutation, redirect_with, render, session_expired, table_rows},
    state::AppState,
};

const LIST_PATH: &str = "/products";

/// Product table template.
#[derive(Template)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub flash: Flash,
    pub products: Vec<Product>,
}

/// New/edit product form template.
#[derive(Template)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub admin_user: AdminUserView,
    pub current_path: String,
    pub flash: Flash,
    /// `None` while creating.
    pub product_id: Option<ProductId>,
    pub form: ProductForm,
    pub errors: FieldErrors,
    pub categories: Vec<String>,
    pub countries: Vec<String>,
}

impl ProductFormTemplate {
    /// Form page with the category and country suggestions loaded.
    ///
    /// The lists only feed `<datalist>` suggestions, so a failure to load
    /// them is logged and otherwise ignored.
    async fn build(
        state: &AppState,
        admin: &CurrentAdmin,
        product_id: Option<ProductId>,
        form: ProductForm,
        errors: FieldErrors,
    ) -> Self {
        let (categories, countries) = tokio::join!(
            state.api().categories(&admin.token),
            state.api().countries(&admin.token),
        );
        let categories = categories.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load categories");
            Vec::new()
        });
        let countries = countries.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to load countries");
            Vec::new()
        });

        Self {
            admin_user: AdminUserView::from(admin),
            current_path: LIST_PATH.to_string(),
            flash: Flash::default(),
            product_id,
            form,
            errors,
            categories,
            countries,
        }
    }
}

/// Product table.
///
/// GET /products
#[instrument(skip(admin, state, session, flash))]
pub async fn index(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Query(mut flash): Query<Flash>,
) -> Response {
    let result = state.api().products(&admin.token).await;
    let mut products = match table_rows(&session, &mut flash, result).await {
        Ok(rows) => rows,
        Err(response) => return response,
    };
    products.sort_by_key(|p| p.id);

    render(&ProductsIndexTemplate {
        admin_user: AdminUserView::from(&admin),
        current_path: LIST_PATH.to_string(),
        flash,
        products,
    })
    .into_response()
}

/// Empty product form.
///
/// GET /products/new
#[instrument(skip(admin, state))]
pub async fn new(RequireAdmin(admin): RequireAdmin, State(state): State<AppState>) -> Response {
    let template =
        ProductFormTemplate::build(&state, &admin, None, ProductForm::default(), FieldErrors::new())
            .await;
    render(&template).into_response()
}

/// Create a product.
///
/// POST /products
#[instrument(skip(admin, state, session, form), fields(name = %form.name))]
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ProductForm>,
) -> Response {
    let input = match validate_product(&form) {
        Ok(input) => input,
        Err(errors) => {
            let template = ProductFormTemplate::build(&state, &admin, None, form, errors).await;
            return (StatusCode::UNPROCESSABLE_ENTITY, render(&template)).into_response();
        }
    };

    let result = state.api().create_product(&input, &admin.token).await;
    after_mutation(&session, LIST_PATH, result, "Producto creado.").await
}

/// Form pre-filled from the product.
///
/// GET /products/{id}/edit
#[instrument(skip(admin, state, session))]
pub async fn edit(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
) -> Response {
    let product = match state.api().product(id, &admin.token).await {
        Ok(product) => product,
        Err(err) if err.is_unauthorized() => return session_expired(&session).await,
        Err(err) => {
            tracing::warn!(error = %err, "Failed to load product for editing");
            return redirect_with(LIST_PATH, "error", &err.user_message()).into_response();
        }
    };

    let form = ProductForm::from_product(&product);
    let template =
        ProductFormTemplate::build(&state, &admin, Some(id), form, FieldErrors::new()).await;
    render(&template).into_response()
}

/// Replace a product.
///
/// POST /products/{id}
#[instrument(skip(admin, state, session, form))]
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
    Form(form): Form<ProductForm>,
) -> Response {
    let input = match validate_product(&form) {
        Ok(input) => input,
        Err(errors) => {
            let template = ProductFormTemplate::build(&state, &admin, Some(id), form, errors).await;
            return (StatusCode::UNPROCESSABLE_ENTITY, render(&template)).into_response();
        }
    };

    let result = state.api().update_product(id, &input, &admin.token).await;
    after_mutation(&session, LIST_PATH, result, "Producto actualizado.").await
}

/// Delete a product.
///
/// POST /products/{id}/delete
#[instrument(skip(admin, state, session))]
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<ProductId>,
) -> Response {
    let result = state.api().delete_product(id, &admin.token).await;
    after_mutation(&session, LIST_PATH, result, "Producto eliminado.").await
}
