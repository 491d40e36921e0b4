//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Records
        .route("/records", post(handlers::ingest_records))
        .route("/records/meta", get(handlers::records_meta))
        // Density and adaptive coordinates
        .route("/adaptive/global", get(handlers::global_maps))
        .route("/adaptive/maps", post(handlers::density_maps))
        .route("/adaptive/y", post(handlers::adaptive_y))
        .route("/confidence", post(handlers::confidence))
        // Suggestions
        .route("/suggestions", get(handlers::list_suggestions))
        .route("/suggestions/generate", post(handlers::generate_suggestions))
        .route("/suggestions/schedule", post(handlers::schedule_suggestions))
        .route("/suggestions/{id}", axum::routing::put(handlers::modify_suggestion))
        .route("/suggestions/{id}/accept", post(handlers::accept_suggestion))
        .route("/suggestions/{id}/reject", post(handlers::reject_suggestion))
        // Slice editing
        .route("/slices/adjust", post(handlers::adjust_slice))
        .route("/slices/neighbors", post(handlers::neighbor_candidates))
        .route("/bursts", post(handlers::bursts));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        // Record batches can be large.
        .layer(DefaultBodyLimit::max(50 * 1024 * 1024))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
