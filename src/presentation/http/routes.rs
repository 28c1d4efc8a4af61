//! Route Configuration
//!
//! Configures all HTTP routes for the API.

use axum::{
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Router,
};

use super::handlers;
use crate::infrastructure::metrics;
use crate::presentation::middleware::{auth_middleware, track_metrics};
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/chat/room", chat_routes(state.clone()))
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        .route_layer(middleware::from_fn(track_metrics))
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    let metrics = metrics::gather_metrics();
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics,
    )
}

/// Chat routes (protected)
fn chat_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(handlers::chat::create_chat)
                .get(handlers::chat::get_chat)
                .put(handlers::chat::update_chat)
                .delete(handlers::chat::delete_chat),
        )
        .route(
            "/users",
            put(handlers::chat::add_users).delete(handlers::chat::delete_users),
        )
        .route(
            "/admins",
            put(handlers::chat::add_admins).delete(handlers::chat::remove_admins),
        )
        .route(
            "/readers",
            put(handlers::chat::make_readers).delete(handlers::chat::make_members),
        )
        .route("/{join_link}", post(handlers::chat::join_chat))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
