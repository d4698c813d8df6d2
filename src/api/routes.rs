//! API Routes
//!
//! Configures the Axum router with all cache server endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    delete_handler, get_handler, health_handler, set_handler, stats_handler, tagrm_handler,
    AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT /:namespace/set` - Store a value with optional expiry and tags
/// - `GET /:namespace/get/:key` - Retrieve a value by key
/// - `DELETE /:namespace/del/:key` - Delete a key
/// - `POST /:namespace/tagrm` - Invalidate a tag (or the whole namespace)
/// - `GET /stats` - Backend and per-namespace statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .route("/:namespace/set", put(set_handler))
        .route("/:namespace/get/:key", get(get_handler))
        .route("/:namespace/del/:key", delete(delete_handler))
        .route("/:namespace/tagrm", post(tagrm_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
