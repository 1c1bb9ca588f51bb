//! Integration tests for HuertoHogar.
//!
//! Every test here is `#[ignore]`d: they drive the real binaries over HTTP
//! and need the external user, product and order services behind them.
//!
//! # Running Tests
//!
//! ```bash
//! hh-cli migrate all
//! cargo run -p huerto-hogar-storefront &
//! cargo run -p huerto-hogar-admin &
//! cargo test -p huerto-hogar-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_BASE_URL` (default: `http://localhost:3000`)
//! - `ADMIN_BASE_URL` (default: `http://localhost:3001`)
//! - `HH_TEST_ADMIN_EMAIL` / `HH_TEST_ADMIN_PASSWORD` - an `ADMIN` account

use reqwest::{Client, redirect::Policy};

#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// A cookie-keeping client that does not follow redirects, so tests can
/// assert on `Location`.
///
/// # Panics
///
/// Panics if the TLS backend cannot be initialized.
#[must_use]
#[allow(clippy::expect_used)]
pub fn session_client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// Log in to the back-office with `HH_TEST_ADMIN_EMAIL`/`HH_TEST_ADMIN_PASSWORD`.
///
/// # Panics
///
/// Panics if the credentials are not set or the login is refused.
#[allow(clippy::expect_used)]
pub async fn admin_client() -> Client {
    let email = std::env::var("HH_TEST_ADMIN_EMAIL").expect("HH_TEST_ADMIN_EMAIL not set");
    let password = std::env::var("HH_TEST_ADMIN_PASSWORD").expect("HH_TEST_ADMIN_PASSWORD not set");

    let client = session_client();
    let resp = client
        .post(format!("{}/auth/login", admin_base_url()))
        .form(&[("email", email.as_str()), ("password", password.as_str())])
        .send()
        .await
        .expect("Failed to reach admin");
    assert!(
        resp.status().is_redirection(),
        "Admin login refused: {}",
        resp.status()
    );
    client
}
