//! End-to-end storefront flows.
//!
//! These tests require:
//! - The storefront running (`cargo run -p huerto-hogar-storefront`)
//! - The user, product and order services it points at, with at least one
//!   product in stock
//!
//! Run with: cargo test -p huerto-hogar-integration-tests -- --ignored

#![allow(clippy::unwrap_used, clippy::expect_used)]

use huerto_hogar_core::models::Product;
use huerto_hogar_integration_tests::{session_client, storefront_base_url};
use reqwest::{StatusCode, header};
use serde_json::Value;

/// First product with stock, read from the product service the storefront uses.
async fn product_in_stock() -> Product {
    let api = std::env::var("HUERTO_PRODUCTS_API_URL").expect("HUERTO_PRODUCTS_API_URL not set");
    let products: Vec<Product> = reqwest::get(format!("{}/products", api.trim_end_matches('/')))
        .await
        .expect("Failed to reach product service")
        .json()
        .await
        .expect("Failed to parse products");
    products
        .into_iter()
        .find(|p| p.stock > 0)
        .expect("No product in stock")
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_health() {
    let resp = reqwest::get(format!("{}/health", storefront_base_url()))
        .await
        .expect("Failed to reach storefront");
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
}

#[tokio::test]
#[ignore = "Requires running storefront and product service"]
async fn test_catalog_filters() {
    let client = session_client();
    let base_url = storefront_base_url();

    let resp = client
        .get(format!("{base_url}/products?category=Frutas+Frescas&sort=price_asc"))
        .send()
        .await
        .expect("Failed to get products");
    assert_eq!(resp.status(), StatusCode::OK);

    // Inverted price range still renders
    let resp = client
        .get(format!("{base_url}/products?min=5000&max=100"))
        .send()
        .await
        .expect("Failed to get products");
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront and all services"]
async fn test_guest_checkout_reaches_boleta() {
    let client = session_client();
    let base_url = storefront_base_url();
    let product = product_in_stock().await;

    let resp = client
        .post(format!("{base_url}/cart/add"))
        .form(&[("product_id", product.id.to_string()), ("quantity", "1".to_string())])
        .send()
        .await
        .expect("Failed to add to cart");
    assert!(resp.status().is_redirection());

    let resp = client
        .get(format!("{base_url}/cart"))
        .send()
        .await
        .expect("Failed to get cart");
    assert!(resp.text().await.unwrap().contains(&product.name));

    let email = format!("it-{}@duoc.cl", uuid::Uuid::new_v4().simple());
    let resp = client
        .post(format!("{base_url}/checkout"))
        .form(&[
            ("first_name", "Prueba"),
            ("last_name", "Integración"),
            ("email", email.as_str()),
            ("region", "Región Metropolitana de Santiago"),
            ("commune", "Santiago"),
            ("address", "Av. Libertador 123"),
        ])
        .send()
        .await
        .expect("Failed to submit checkout");
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let location = resp.headers()[header::LOCATION].to_str().unwrap().to_string();
    assert!(location.starts_with("/boleta/"));

    let resp = client
        .get(format!("{base_url}{location}"))
        .send()
        .await
        .expect("Failed to get boleta");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("IVA"));

    // Cart is emptied once the order is placed
    let resp = client
        .get(format!("{base_url}/checkout"))
        .send()
        .await
        .expect("Failed to get checkout");
    assert!(resp.status().is_redirection());
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_account_requires_login() {
    let resp = session_client()
        .get(format!("{}/account", storefront_base_url()))
        .send()
        .await
        .expect("Failed to get account");
    assert!(resp.status().is_redirection());
}

#[tokio::test]
#[ignore = "Requires running product service"]
async fn test_product_service_shape() {
    let api = std::env::var("HUERTO_PRODUCTS_API_URL").expect("HUERTO_PRODUCTS_API_URL not set");
    let value: Value = reqwest::get(format!("{}/products", api.trim_end_matches('/')))
        .await
        .expect("Failed to reach product service")
        .json()
        .await
        .expect("Failed to parse products");
    let first = &value.as_array().expect("products is an array")[0];
    for key in ["id", "name", "category", "price", "stock"] {
        assert!(first.get(key).is_some(), "missing {key}");
    }
}
