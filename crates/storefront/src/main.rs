//! HuertoHogar storefront - public grocery store.
//!
//! Serves the shop on port 3000 by default.
//!
//! # Architecture
//!
//! - Axum web framework, Askama templates rendered server-side
//! - Products, users and orders live in external REST services
//! - Cart, placed orders and the logged-in user are kept in the session
//! - `PostgreSQL` only backs the session store

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::net::SocketAddr;

use huerto_hogar_core::content::ContentStore;
use huerto_hogar_storefront::config::StorefrontConfig;
use huerto_hogar_storefront::state::AppState;
use huerto_hogar_storefront::{app, db, middleware, telemetry};

#[tokio::main]
async fn main() {
    let config = StorefrontConfig::from_env().expect("Failed to load configuration");
    let sentry = telemetry::init(&config);

    if let Err(e) = serve(config).await {
        tracing::error!(error = %e, "Storefront stopped");
        drop(sentry);
        std::process::exit(1);
    }
}

async fn serve(config: StorefrontConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Session tables come from `hh-cli migrate storefront`, not from startup
    let pool = db::create_pool(&config.database_url).await?;
    let content = ContentStore::load(&config.content_dir)?;
    tracing::info!(
        posts = content.all_posts().len(),
        pages = content.pages().len(),
        "Content loaded"
    );

    let sessions = middleware::create_session_layer(&pool, &config);
    let addr = config.socket_addr();
    let router = app(AppState::new(config, pool, content), sessions)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Storefront listening");

    // Client IPs feed the login rate limiter
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM. A handler that can't be installed just
/// never fires.
async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => {},
        () = terminate => {},
    }

    tracing::info!("Shutting down, draining in-flight requests");
}
