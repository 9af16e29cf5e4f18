use std::sync::Arc;

use axum::{extract::DefaultBodyLimit, routing::{get, post}, Extension, Router};
use gateway_core::context::AppContext;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

use crate::handlers;
use crate::health;

/// Builds the full HTTP surface: one POST per operation plus the always-200
/// liveness endpoint, gated by the per-op concurrency semaphores inside
/// each handler rather than by router-level middleware.
pub fn build_router(ctx: Arc<AppContext>) -> Router {
    let api_routes = Router::new()
        .route("/api/albums/embedding", post(handlers::embedding_handler))
        .route("/api/albums/categories", post(handlers::categories_handler))
        .route("/api/albums/duplicates", post(handlers::duplicates_handler))
        .route("/api/albums/quality", post(handlers::quality_handler))
        .route("/api/albums/score", post(handlers::score_handler))
        .route("/api/albums/people", post(handlers::people_handler))
        .layer(Extension(ctx));

    Router::new()
        .route("/health/info", get(health::health_info))
        .merge(api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default().include_headers(true)))
        .layer(DefaultBodyLimit::max(25 * 1024 * 1024))
}
