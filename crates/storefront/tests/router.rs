//! Router tests against an in-process stub of the user, product and order
//! services.
//!
//! Sessions live in a `MemoryStore`; the Postgres pool is lazy and never
//! connects.

#![allow(clippy::unwrap_used)]

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::NaiveDate;
use huerto_hogar_core::content::ContentStore;
use huerto_hogar_core::models::{Product, User};
use huerto_hogar_core::{Clp, ProductId, UserId, UserRole};
use huerto_hogar_storefront::config::{ServiceUrls, StorefrontConfig};
use huerto_hogar_storefront::middleware::session_layer;
use huerto_hogar_storefront::state::AppState;
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use tower_sessions::MemoryStore;
use url::Url;

const SHOPPER_EMAIL: &str = "ana@duoc.cl";
const SHOPPER_PASSWORD: &str = "huerto2025";

/// Shipping form accepted by checkout; `first_name` is filled in per test.
const SHIPPING: &str = "last_name=P%C3%A9rez&email=ana%40duoc.cl\
    &region=Regi%C3%B3n+Metropolitana+de+Santiago&commune=Santiago\
    &address=Av.+Providencia+1234";

fn product(id: i32, name: &str, category: &str, price: i64, stock: u32) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        category: category.to_string(),
        price: Clp::new(price),
        stock,
        description: format!("{name} fresco del campo"),
        origin: "Chile".to_string(),
        image: None,
        comments: Vec::new(),
    }
}

fn catalog() -> Vec<Product> {
    vec![
        product(1, "Manzanas Fuji", "Frutas Frescas", 1200, 150),
        product(2, "Zanahorias Orgánicas", "Verduras Orgánicas", 900, 100),
        product(3, "Miel Orgánica", "Productos Orgánicos", 5000, 0),
    ]
}

fn shopper(email: &str) -> User {
    User {
        id: UserId::new(5),
        first_name: "Ana".to_string(),
        last_name: "Pérez".to_string(),
        rut: "12.345.678-5".to_string(),
        birth_date: NaiveDate::from_ymd_opt(1990, 5, 1).unwrap(),
        region: "Región de Valparaíso".to_string(),
        commune: "Viña del Mar".to_string(),
        address: "Av. Libertad 100".to_string(),
        email: email.to_string(),
        phone: None,
        role: UserRole::User,
    }
}

/// State shared by the stub services.
struct Stub {
    products: Vec<Product>,
    comments: Mutex<Vec<Value>>,
}

type Services = Arc<Stub>;

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}

async fn list_products(State(stub): State<Services>) -> Json<Vec<Product>> {
    Json(stub.products.clone())
}

async fn get_product(State(stub): State<Services>, Path(id): Path<i32>) -> Response {
    stub.products
        .iter()
        .find(|p| p.id == ProductId::new(id))
        .map_or_else(
            || message(StatusCode::NOT_FOUND, "Producto no encontrado"),
            |p| Json(p.clone()).into_response(),
        )
}

async fn list_comments(State(stub): State<Services>) -> Json<Vec<Value>> {
    Json(stub.comments.lock().unwrap().clone())
}

async fn post_comment(
    State(stub): State<Services>,
    Path(id): Path<i32>,
    Json(body): Json<Value>,
) -> Response {
    let mut comments = stub.comments.lock().unwrap();
    let comment = json!({
        "id": comments.len() + 1,
        "productId": id,
        "author": body["author"],
        "body": body["body"],
        "rating": body["rating"],
        "date": "2025-03-01T12:00:00Z",
    });
    comments.push(comment.clone());
    (StatusCode::CREATED, Json(comment)).into_response()
}

async fn list_categories(State(stub): State<Services>) -> Json<Vec<String>> {
    let mut categories: Vec<String> = stub.products.iter().map(|p| p.category.clone()).collect();
    categories.sort();
    categories.dedup();
    Json(categories)
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["email"] == SHOPPER_EMAIL && body["password"] == SHOPPER_PASSWORD {
        Json(json!({ "token": "tok-ana", "user": shopper(SHOPPER_EMAIL) })).into_response()
    } else {
        message(StatusCode::UNAUTHORIZED, "Credenciales inválidas")
    }
}

async fn register(Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    (StatusCode::CREATED, Json(shopper(email))).into_response()
}

/// Echo the order back with an id, or refuse it when the buyer is named
/// "Rechazo".
async fn place_order(Json(mut body): Json<Value>) -> Response {
    if body["shipping"]["firstName"] == "Rechazo" {
        return message(StatusCode::CONFLICT, "Stock insuficiente para Manzanas Fuji");
    }
    body["id"] = json!(77);
    body["date"] = json!("2025-03-01T12:00:00Z");
    (StatusCode::CREATED, Json(body)).into_response()
}

/// Serve fake user, product and order services on one ephemeral port.
async fn spawn_services() -> Url {
    let stub = Arc::new(Stub {
        products: catalog(),
        comments: Mutex::new(Vec::new()),
    });
    let app = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/products", get(list_products))
        .route("/products/{id}", get(get_product))
        .route("/products/{id}/comments", get(list_comments).post(post_comment))
        .route("/categories", get(list_categories))
        .route(
            "/orders",
            get(|| async { Json(Vec::<Value>::new()) }).post(place_order),
        )
        .with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Url::parse(&format!("http://{addr}")).unwrap()
}

fn content() -> (tempfile::TempDir, ContentStore) {
    let root = tempfile::tempdir().unwrap();
    let pages = root.path().join("pages");
    let blog = root.path().join("blog");
    std::fs::create_dir_all(&pages).unwrap();
    std::fs::create_dir_all(&blog).unwrap();
    std::fs::write(
        pages.join("nosotros.md"),
        "---\ntitle: Nosotros\n---\nDel campo a tu mesa.\n",
    )
    .unwrap();
    std::fs::write(
        blog.join("2025-03-01-huerta.md"),
        "---\ntitle: Huerta en casa\npublished_at: 2025-03-01\n---\nRiega temprano.\n",
    )
    .unwrap();
    std::fs::write(
        blog.join("2025-04-01-borrador.md"),
        "---\ntitle: Borrador\npublished_at: 2025-04-01\ndraft: true\n---\nPronto.\n",
    )
    .unwrap();
    let store = ContentStore::load(root.path()).unwrap();
    (root, store)
}

async fn test_app(services: Url) -> (tempfile::TempDir, Router) {
    let config = StorefrontConfig {
        database_url: SecretString::from("postgres://localhost/unused"),
        host: "127.0.0.1".parse().unwrap(),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        services: ServiceUrls {
            users: services.clone(),
            products: services.clone(),
            orders: services,
        },
        content_dir: PathBuf::from("unused"),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    };
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/unused")
        .unwrap();
    let (dir, content) = content();
    let state = AppState::new(config, pool, content);
    let app = huerto_hogar_storefront::app(state, session_layer(MemoryStore::default(), false));
    (dir, app)
}

fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .uri(uri)
        .header("x-forwarded-for", "203.0.113.7");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header("x-forwarded-for", "203.0.113.7");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(response: &Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

/// `name=value` part of the session `Set-Cookie` header.
fn session_cookie(response: &Response) -> String {
    let raw = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    raw.split(';').next().unwrap().to_string()
}

/// The re-issued session cookie, or `current` if none was sent.
fn next_cookie(response: &Response, current: &str) -> String {
    if response.headers().contains_key(header::SET_COOKIE) {
        session_cookie(response)
    } else {
        current.to_string()
    }
}

/// Put two boxes of Manzanas Fuji in a fresh cart.
async fn cart_cookie(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(post_form("/cart/add", "product_id=1&quantity=2", None))
        .await
        .unwrap();
    session_cookie(&response)
}

#[tokio::test]
async fn test_health() {
    let (_dir, app) = test_app(spawn_services().await).await;
    let response = app.oneshot(get_request("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn test_responses_carry_request_id_and_security_headers() {
    let (_dir, app) = test_app(spawn_services().await).await;
    let response = app.oneshot(get_request("/health", None)).await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
    assert!(response.headers().contains_key("content-security-policy"));
}

#[tokio::test]
async fn test_home_lists_catalog() {
    let (_dir, app) = test_app(spawn_services().await).await;
    let response = app.oneshot(get_request("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Manzanas Fuji"));
    assert!(body.contains("Huerta en casa"));
    assert!(!body.contains("Miel Orgánica"));
}

#[tokio::test]
async fn test_product_listing_filters_by_category() {
    let (_dir, app) = test_app(spawn_services().await).await;
    let response = app
        .oneshot(get_request("/products?category=Frutas%20Frescas", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Manzanas Fuji"));
    assert!(!body.contains("Zanahorias Orgánicas"));
}

#[tokio::test]
async fn test_product_detail_and_missing_product() {
    let services = spawn_services().await;
    let (_dir, app) = test_app(services).await;

    let response = app
        .clone()
        .oneshot(get_request("/products/1", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Manzanas Fuji"));
    assert!(body.contains("$1.200"));

    let response = app.oneshot(get_request("/products/99", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_to_cart_then_view_cart() {
    let (_dir, app) = test_app(spawn_services().await).await;

    let response = app
        .clone()
        .oneshot(post_form("/cart/add", "product_id=1&quantity=2", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/cart?success="));
    let cookie = session_cookie(&response);

    let response = app
        .oneshot(get_request("/cart", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Manzanas Fuji"));
    // 2 x $1.200 plus $3.000 shipping
    assert!(body.contains("$2.400"));
    assert!(body.contains("$5.400"));
}

#[tokio::test]
async fn test_out_of_stock_product_is_refused() {
    let (_dir, app) = test_app(spawn_services().await).await;
    let response = app
        .oneshot(post_form(
            "/cart/add",
            "product_id=3&quantity=1&next=%2Fproducts%2F3",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/products/3?error="));
}

#[tokio::test]
async fn test_update_to_zero_empties_cart() {
    let (_dir, app) = test_app(spawn_services().await).await;

    let response = app
        .clone()
        .oneshot(post_form("/cart/add", "product_id=2&quantity=1", None))
        .await
        .unwrap();
    let cookie = session_cookie(&response);

    let response = app
        .clone()
        .oneshot(post_form("/cart/update", "product_id=2&quantity=0", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/cart");

    let response = app
        .oneshot(get_request("/checkout", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(location(&response), "/cart");
}

#[tokio::test]
async fn test_checkout_with_empty_cart_redirects_to_cart() {
    let (_dir, app) = test_app(spawn_services().await).await;
    let response = app.oneshot(get_request("/checkout", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/cart");
}

#[tokio::test]
async fn test_checkout_shows_form_when_cart_has_items() {
    let (_dir, app) = test_app(spawn_services().await).await;
    let response = app
        .clone()
        .oneshot(post_form("/cart/add", "product_id=1&quantity=1", None))
        .await
        .unwrap();
    let cookie = session_cookie(&response);

    let response = app
        .oneshot(get_request("/checkout", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Región Metropolitana de Santiago"));
    assert!(body.contains("$4.200"));
}

#[tokio::test]
async fn test_checkout_validation_errors_rerender_form() {
    let (_dir, app) = test_app(spawn_services().await).await;
    let response = app
        .clone()
        .oneshot(post_form("/cart/add", "product_id=1&quantity=1", None))
        .await
        .unwrap();
    let cookie = session_cookie(&response);

    let response = app
        .oneshot(post_form("/checkout", "first_name=&email=malo", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = body_text(response).await;
    assert!(body.contains("field-error"));
}

#[tokio::test]
async fn test_account_requires_login() {
    let (_dir, app) = test_app(spawn_services().await).await;
    let response = app.oneshot(get_request("/account", None)).await.unwrap();
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/auth/login");
}

#[tokio::test]
async fn test_unknown_receipt_is_not_found() {
    let (_dir, app) = test_app(spawn_services().await).await;
    let response = app.oneshot(get_request("/boleta/42", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_login_page_renders() {
    let (_dir, app) = test_app(spawn_services().await).await;
    let response = app.oneshot(get_request("/auth/login", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Iniciar sesión"));
}

#[tokio::test]
async fn test_content_pages_and_posts() {
    let (_dir, app) = test_app(spawn_services().await).await;

    let response = app
        .clone()
        .oneshot(get_request("/pages/nosotros", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Del campo a tu mesa."));

    let response = app
        .clone()
        .oneshot(get_request("/pages/no-existe", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .clone()
        .oneshot(get_request("/blog/huerta", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get_request("/blog/borrador", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_checkout_places_order_and_shows_receipt() {
    let (_dir, app) = test_app(spawn_services().await).await;
    let cookie = cart_cookie(&app).await;

    let response = app
        .clone()
        .oneshot(post_form(
            "/checkout",
            &format!("first_name=Ana&{SHIPPING}"),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/boleta/77");
    let cookie = next_cookie(&response, &cookie);

    let response = app
        .clone()
        .oneshot(get_request("/boleta/77", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Manzanas Fuji"));
    // $2.400 subtotal carries $456 IVA on $1.944 net, plus $3.000 shipping
    assert!(body.contains("IVA (19%)"));
    assert!(body.contains("$456"));
    assert!(body.contains("$1.944"));
    assert!(body.contains("$5.400"));

    let response = app
        .oneshot(get_request("/checkout", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(location(&response), "/cart");
}

#[tokio::test]
async fn test_rejected_order_keeps_cart_and_shows_reason() {
    let (_dir, app) = test_app(spawn_services().await).await;
    let cookie = cart_cookie(&app).await;

    let response = app
        .clone()
        .oneshot(post_form(
            "/checkout",
            &format!("first_name=Rechazo&{SHIPPING}"),
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Finalizar compra"));
    assert!(body.contains("Stock insuficiente para Manzanas Fuji"));

    let response = app
        .oneshot(get_request("/checkout", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_then_logout_keeps_cart() {
    let (_dir, app) = test_app(spawn_services().await).await;
    let cookie = cart_cookie(&app).await;

    let response = app
        .clone()
        .oneshot(post_form(
            "/auth/login",
            "email=+Ana%40Duoc.CL&password=huerto2025",
            Some(&cookie),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/account?success="));
    let cookie = next_cookie(&response, &cookie);

    let response = app
        .clone()
        .oneshot(get_request("/account", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains(SHOPPER_EMAIL));

    let response = app
        .clone()
        .oneshot(post_form("/auth/logout", "", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cookie = next_cookie(&response, &cookie);

    let response = app
        .clone()
        .oneshot(get_request("/account", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(location(&response), "/auth/login");

    let response = app
        .oneshot(get_request("/cart", Some(&cookie)))
        .await
        .unwrap();
    assert!(body_text(response).await.contains("Manzanas Fuji"));
}

#[tokio::test]
async fn test_wrong_password_stays_on_login() {
    let (_dir, app) = test_app(spawn_services().await).await;
    let response = app
        .oneshot(post_form(
            "/auth/login",
            "email=ana%40duoc.cl&password=otra",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Correo o contraseña incorrectos."));
}

#[tokio::test]
async fn test_registration_logs_new_account_in() {
    let (_dir, app) = test_app(spawn_services().await).await;
    let response = app
        .clone()
        .oneshot(post_form(
            "/auth/register",
            "first_name=Ana&last_name=P%C3%A9rez&rut=12.345.678-5&email=ana%40duoc.cl\
             &birth_date=1990-05-01&region=Regi%C3%B3n+de+Valpara%C3%ADso\
             &commune=Vi%C3%B1a+del+Mar&address=Av.+Libertad+100\
             &password=huerto2025&password_confirm=huerto2025",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/account?success="));
    let cookie = session_cookie(&response);

    let response = app
        .oneshot(get_request("/account", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_review_is_posted_and_listed() {
    let (_dir, app) = test_app(spawn_services().await).await;

    let response = app
        .clone()
        .oneshot(post_form(
            "/products/1/comments",
            "author=Ana+P%C3%A9rez&rating=4&body=Muy+jugosas",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(location(&response).starts_with("/products/1?success="));

    let response = app
        .oneshot(get_request("/products/1", None))
        .await
        .unwrap();
    let body = body_text(response).await;
    assert!(body.contains("Muy jugosas"));
    assert!(body.contains("★★★★☆"));
}

#[tokio::test]
async fn test_invalid_review_rerenders_with_errors() {
    let (_dir, app) = test_app(spawn_services().await).await;
    let response = app
        .oneshot(post_form(
            "/products/1/comments",
            "author=Ana&rating=9&body=",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(response).await.contains("field-error"));
}
