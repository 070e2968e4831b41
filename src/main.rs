//! Feed mixer: binary entrypoint.
//! Loads settings, then boots the Axum HTTP server with the mix endpoint.

use std::sync::Arc;

use anyhow::Context;
use feed_mixer::{api, config::Settings, metrics::Metrics, HttpFeedFetcher};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Compact logs by default; `LOG_FORMAT=json` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("feed_mixer=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when the file is absent.
    let _ = dotenvy::dotenv();

    init_tracing();

    // Invalid settings (e.g. ADS_FREQUENCY of 0) stop the process before it binds.
    let settings = Settings::load_default().context("loading configuration")?;
    info!(
        frequency = settings.frequency.get(),
        path = %settings.request_path,
        content_feed = %settings.content_url,
        ads_feed = %settings.ads_url,
        "configuration loaded"
    );

    let fetcher = HttpFeedFetcher::new().context("building HTTP client")?;
    let bind = settings.bind.clone();
    let metrics = if settings.metrics_enabled {
        Some(Metrics::init().context("installing Prometheus recorder")?)
    } else {
        None
    };

    let state = api::AppState::new(settings, Arc::new(fetcher));
    let app = api::create_router_with_metrics(state, metrics.as_ref());

    // Hostnames are resolved here, so `localhost:8080` works as well as an IP.
    let listener = tokio::net::TcpListener::bind(bind.as_str())
        .await
        .with_context(|| format!("binding {bind}"))?;
    let local = listener.local_addr().context("reading bound address")?;
    info!(addr = %local, "listening");

    axum::serve(listener, app).await.context("serving HTTP")?;
    Ok(())
}
