//! HuertoHogar admin - back-office for the store.
//!
//! Serves the admin panel on port 3001 by default, bound to localhost.
//! Put it behind a VPN or an authenticating proxy in production.

#![cfg_attr(not(test), forbid(unsafe_code))]

use huerto_hogar_admin::config::AdminConfig;
use huerto_hogar_admin::state::AppState;
use huerto_hogar_admin::{app, db, middleware, telemetry};
use huerto_hogar_core::content::ContentStore;

#[tokio::main]
async fn main() {
    let config = AdminConfig::from_env().expect("Failed to load configuration");
    let sentry = telemetry::init(&config);

    if let Err(e) = serve(config).await {
        tracing::error!(error = %e, "Admin stopped");
        drop(sentry);
        std::process::exit(1);
    }
}

async fn serve(config: AdminConfig) -> Result<(), Box<dyn std::error::Error>> {
    // NOTE: the admin.session table is created by `hh-cli migrate admin`
    let pool = db::create_pool(&config.database_url).await?;
    let content = ContentStore::load(&config.content_dir)?;

    let sessions = middleware::create_session_layer(&pool, &config);
    let addr = config.socket_addr();
    let router = app(AppState::new(config, pool, content), sessions)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Admin listening");

    axum::serve(listener, router)
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
