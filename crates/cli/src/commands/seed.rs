//! Seed the product service with the built-in demo catalog.
//!
//! Products whose name already exists in the service are skipped, so the
//! command can be re-run after a partial failure.
//!
//! # Environment Variables
//!
//! - `HUERTO_PRODUCTS_API_URL` - Base URL of the product service
//! - `HUERTO_API_TOKEN` - Bearer token of an `ADMIN` account

use std::collections::HashSet;

use huerto_hogar_core::models::Product;
use huerto_hogar_core::seed::demo_catalog;
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, warn};
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid HUERTO_PRODUCTS_API_URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Product service error: {0}")]
    Http(#[from] reqwest::Error),
}

fn env(var: &'static str) -> Result<String, SeedError> {
    std::env::var(var).map_err(|_| SeedError::MissingEnvVar(var))
}

/// POST every demo product that the service does not have yet.
///
/// # Errors
///
/// Returns an error if configuration is missing or the listing fails.
/// Individual create failures are logged and counted.
pub async fn products(dry_run: bool) -> Result<(), SeedError> {
    dotenvy::dotenv().ok();

    let catalog = demo_catalog();
    if dry_run {
        for product in &catalog {
            info!(name = %product.name, category = %product.category, price = %product.price, "Would create");
        }
        info!(count = catalog.len(), "Dry run complete");
        return Ok(());
    }

    let base = Url::parse(&env("HUERTO_PRODUCTS_API_URL")?)?;
    let token = SecretString::from(env("HUERTO_API_TOKEN")?);
    let endpoint = Url::parse(&format!("{}/products", base.as_str().trim_end_matches('/')))?;
    let client = reqwest::Client::new();

    let existing: HashSet<String> = client
        .get(endpoint.clone())
        .bearer_auth(token.expose_secret())
        .send()
        .await?
        .error_for_status()?
        .json::<Vec<Product>>()
        .await?
        .into_iter()
        .map(|p| p.name)
        .collect();

    let (mut created, mut skipped, mut failed) = (0_usize, 0_usize, 0_usize);
    for product in &catalog {
        if existing.contains(&product.name) {
            skipped += 1;
            continue;
        }

        let result = client
            .post(endpoint.clone())
            .bearer_auth(token.expose_secret())
            .json(product)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status);

        match result {
            Ok(_) => {
                created += 1;
                info!(name = %product.name, "Created");
            }
            Err(e) => {
                failed += 1;
                warn!(name = %product.name, error = %e, "Create failed");
            }
        }
    }

    info!(created, skipped, failed, "Seeding complete");
    Ok(())
}
