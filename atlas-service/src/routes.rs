//! Route table for the atlas service.

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/connect", post(handlers::connect))
        .route("/api/connection_status", get(handlers::connection_status))
        .route("/api/search", get(handlers::search_concepts))
        .route("/api/concept/{concept_id}", get(handlers::concept_details))
        .route("/api/brain-search", get(handlers::search_structures))
        .route(
            "/api/brain-structure/{structure_id}",
            get(handlers::structure_details),
        )
        .route("/api/hierarchy-models", get(handlers::hierarchy_models))
        .route("/api/health", get(handlers::health_check))
}
