//! Sentry and `tracing` setup.
//!
//! `LOG_FORMAT=json` switches the console output to one JSON object per
//! line. `RUST_LOG` overrides the default filter.

use std::borrow::Cow;

use sentry::integrations::tracing::{self as sentry_tracing, EventFilter};
use tracing::Level;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AdminConfig;

const DEFAULT_FILTER: &str = "huerto_hogar_admin=info,tower_http=debug";

/// Console log encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// Read `LOG_FORMAT`; anything but `json` means text.
    #[must_use]
    pub fn from_env() -> Self {
        match std::env::var("LOG_FORMAT") {
            Ok(v) if v.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Text,
        }
    }
}

/// WARN and ERROR become Sentry events; INFO and DEBUG ride along as
/// breadcrumbs.
fn sentry_filter(metadata: &tracing::Metadata<'_>) -> EventFilter {
    match *metadata.level() {
        Level::ERROR | Level::WARN => EventFilter::Event,
        Level::INFO | Level::DEBUG => EventFilter::Breadcrumb,
        _ => EventFilter::Ignore,
    }
}

/// Start Sentry (when a DSN is configured) and install the subscriber.
///
/// Sentry comes first so the tracing layer finds a bound client. Keep the
/// returned guard alive for the life of the process.
pub fn init(config: &AdminConfig) -> Option<sentry::ClientInitGuard> {
    let guard = config.sentry_dsn.as_deref().map(|dsn| {
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                environment: config.sentry_environment.clone().map(Cow::Owned),
                sample_rate: config.sentry_sample_rate,
                traces_sample_rate: config.sentry_traces_sample_rate,
                attach_stacktrace: true,
                send_default_pii: true, // Admin events may carry the admin's email
                ..Default::default()
            },
        ))
    });

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let format = LogFormat::from_env();

    tracing_subscriber::registry()
        .with(filter)
        .with(
            (format == LogFormat::Json)
                .then(|| tracing_subscriber::fmt::layer().json().flatten_event(true)),
        )
        .with((format == LogFormat::Text).then(tracing_subscriber::fmt::layer))
        .with(sentry_tracing::layer().event_filter(sentry_filter))
        .init();

    if guard.is_some() {
        tracing::info!("Sentry initialized");
    }
    guard
}
