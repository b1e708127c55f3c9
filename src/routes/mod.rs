//! Router assembly: quiz API, dataset images, frontend assets, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - JSON API under `/api/...`
/// - Dataset images at `{static_url_prefix}/{cars_mount_name}`
/// - Frontend assets at `{static_url_prefix}/assets`, with `index.html` fallback
/// - CORS (allow any origin/method/headers), adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    let settings = &state.settings;
    let prefix = settings.static_url_prefix.trim_end_matches('/');
    let cars_path = format!("{}/{}", prefix, settings.cars_mount_name);
    let assets_path = format!("{}/assets", prefix);

    let cars_service = ServeDir::new(state.dataset.root());
    let assets_service = ServeDir::new(&settings.static_dir);
    let index_service = ServeFile::new(settings.static_dir.join("index.html"));

    Router::new()
        .route("/api/health", get(http::http_health))
        .route("/api/question", get(http::http_get_question))
        .route("/api/answer", post(http::http_post_answer))
        .route("/api/leaderboard", get(http::http_get_leaderboard))
        .route("/api/leaderboard/reset", post(http::http_post_leaderboard_reset))
        .nest_service(&cars_path, cars_service)
        .nest_service(&assets_path, assets_service)
        // State + CORS + HTTP tracing
        .with_state(state.clone())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(index_service)
}
