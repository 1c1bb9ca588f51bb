//! Session table migrations.
//!
//! Both binaries keep only their sessions in `PostgreSQL`; everything else
//! lives behind the external services.
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - storefront session database
//! - `ADMIN_DATABASE_URL` - admin session database
//! - `DATABASE_URL` - fallback for either

use secrecy::SecretString;
use tower_sessions_sqlx_store::PostgresStore;

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

fn database_url(var: &'static str) -> Result<SecretString, MigrationError> {
    dotenvy::dotenv().ok();
    std::env::var(var)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MigrationError::MissingEnvVar(var))
}

/// Create `tower_sessions.session`.
///
/// # Errors
///
/// Returns an error if the URL is missing or the database rejects the DDL.
pub async fn storefront() -> Result<(), MigrationError> {
    let url = database_url("STOREFRONT_DATABASE_URL")?;

    tracing::info!("Connecting to storefront database...");
    let pool = huerto_hogar_storefront::db::create_pool(&url).await?;

    PostgresStore::new(pool).migrate().await?;
    tracing::info!("Storefront session table ready");
    Ok(())
}

/// Create `admin.session`.
///
/// # Errors
///
/// Returns an error if the URL is missing or the database rejects the DDL.
pub async fn admin() -> Result<(), MigrationError> {
    let url = database_url("ADMIN_DATABASE_URL")?;

    tracing::info!("Connecting to admin database...");
    let pool = huerto_hogar_admin::db::create_pool(&url).await?;

    huerto_hogar_admin::middleware::postgres_store(&pool)
        .migrate()
        .await?;
    tracing::info!("Admin session table ready");
    Ok(())
}
