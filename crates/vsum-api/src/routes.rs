//! API routes.

use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::health;
use crate::handlers::summaries::{cancel_summary, create_summary, get_summary};
use crate::middleware::{cors_layer, request_id, request_logging, security_headers};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let summary_routes = Router::new()
        .route("/summaries", post(create_summary))
        .route("/summaries/:job_id", get(get_summary))
        .route("/summaries/:job_id", delete(cancel_summary));

    Router::new()
        .nest("/api/v1", summary_routes)
        .route("/health", get(health))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
