use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{any, get},
    Router,
};
use metrics::counter;
use tower_http::cors::CorsLayer;

use crate::config::Settings;
use crate::feed::fetch::FeedFetcher;
use crate::loader::load_feeds;
use crate::metrics::Metrics;
use crate::response::build_response;

#[derive(Clone)]
pub struct AppState {
    settings: Arc<Settings>,
    fetcher: Arc<dyn FeedFetcher>,
}

impl AppState {
    pub fn new(settings: Settings, fetcher: Arc<dyn FeedFetcher>) -> Self {
        Self {
            settings: Arc::new(settings),
            fetcher,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}

pub fn create_router(state: AppState) -> Router {
    create_router_with_metrics(state, None)
}

/// Like `create_router`, additionally exposing `/metrics` when a recorder is given.
///
/// A mix endpoint configured at `/metrics` keeps the path; the exporter is then skipped.
/// The default path `/` catches every request not taken by another route, so
/// `/anything` is served by the mix endpoint as well.
pub fn create_router_with_metrics(state: AppState, metrics: Option<&Metrics>) -> Router {
    let path = state.settings.request_path.clone();

    // The mix endpoint may itself be configured at "/health" and then takes it over.
    let mut router = if path == "/health" {
        Router::new()
    } else {
        Router::new().route("/health", get(|| async { "ok" }))
    };

    router = if path == "/" {
        router.fallback(mixed_feed)
    } else {
        router.route(&path, any(mixed_feed))
    };

    let mut router = router
        .layer(CorsLayer::very_permissive())
        .with_state(state);

    match metrics {
        Some(_) if path == "/metrics" => {
            tracing::warn!("METRICS_ENABLED ignored: the mix endpoint is mounted at /metrics");
        }
        Some(m) => router = router.merge(m.router()),
        None => {}
    }
    router
}

/// Alias so callers can write `feed_mixer::router(state)`.
pub fn router(state: AppState) -> Router {
    create_router(state)
}

/// Always answers 200; success or failure lives in the JSON envelope.
async fn mixed_feed(State(state): State<AppState>) -> impl IntoResponse {
    counter!("mixer_requests_total").increment(1);

    let loaded = load_feeds(Arc::clone(&state.fetcher), &state.settings).await;
    if !loaded.is_ok() {
        counter!("mixer_error_responses_total").increment(1);
    }
    let body = build_response(loaded, &state.settings);

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
}
